//! Connection supervision subsystem.
//!
//! # Data Flow
//! ```text
//! Disconnected ──backoff──▶ Connecting ──ready──▶ Connected
//!      ▲                        │                     │
//!      └──── not ready / error ─┴──── disconnect ─────┘
//!                     (cancellation from any state → Stopped)
//!
//! Per generation while Connected:
//!     rebuild registry if provider generation moved
//!     → manager load pass → component set
//!     → event source activation → run until disconnect
//! ```
//!
//! # Design Decisions
//! - Generations own their resources; nothing survives a reconnect
//! - Cancellation wins at every suspension point within one bounded wait
//! - Non-cancellation failures are recoverable by construction

pub mod runner;
pub mod session;

pub use runner::Supervisor;
pub use session::{ConnectionSession, SessionState};
