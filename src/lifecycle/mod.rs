//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load settings → Ensure apps directory → Start supervisor
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Supervisor ends the current generation → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - One broadcast channel; every suspension point races against it
//! - Cancellation is terminal and never reported as an error

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
