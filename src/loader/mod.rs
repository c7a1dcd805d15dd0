//! Component loading subsystem.
//!
//! # Data Flow
//! ```text
//! apps directory
//!     → manager.rs (discover files, parse, bind each top-level entry)
//!     → LoadReport (instance set + collected per-file errors)
//!     → handed to the event source by the supervisor
//!
//! On file change:
//!     watcher.rs detects change
//!     → reload signal to the supervisor
//!     → current generation ends, next one reloads everything
//! ```
//!
//! # Design Decisions
//! - Fail-fast per file, isolation across files: one broken file never
//!   blocks its siblings, and all failures surface in one report
//! - Discovery order is sorted for determinism but carries no semantics
//! - A directory without configs is a warning, never a crash

pub mod manager;
pub mod watcher;

pub use manager::{ComponentInstanceManager, LoadError, LoadReport};
pub use watcher::AppsWatcher;
