//! Event source connection seam.
//!
//! # Responsibilities
//! - Define the boundary the supervisor drives a connection through
//! - Keep protocol details (handshake, subscription, dispatch) out of
//!   the core; implementations live behind these traits
//!
//! # Design Decisions
//! - One connection per supervisor generation; the supervisor opens it,
//!   hands over the component set, and drops it on the way out
//! - Readiness is a cheap flag the supervisor can poll at an interval
//! - `run` resolves when the remote side goes away, which is what ends a
//!   generation

pub mod tcp;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::binder::ComponentInstance;

pub use tcp::TcpConnectionFactory;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("could not reach event source: {0}")]
    Unreachable(String),

    #[error("connection lost: {0}")]
    Lost(String),
}

/// One live session against the external event source.
#[async_trait]
pub trait EventSourceConnection: Send + Sync {
    /// Readiness flag, polled by the supervisor at a fixed interval.
    fn is_ready(&self) -> bool;

    /// Hand the generation's component set over for activation.
    async fn activate(
        &mut self,
        components: Vec<ComponentInstance>,
    ) -> Result<(), ConnectionError>;

    /// Run until normal disconnect, remote close, or failure.
    async fn run(&mut self) -> Result<(), ConnectionError>;
}

/// Opens one connection per supervisor generation.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn EventSourceConnection>, ConnectionError>;
}
