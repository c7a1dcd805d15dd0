//! Component class registration subsystem.
//!
//! # Data Flow
//! ```text
//! module provider (exports component classes)
//!     → schema.rs (TypeSchema: name + typed attribute set + constructor)
//!     → registry.rs (build once per generation, case-insensitive resolve)
//!     → shared via ArcSwap; rebuilt wholesale on a new provider generation
//! ```
//!
//! # Design Decisions
//! - Schemas are explicit build-time data, never runtime introspection
//! - The registry is a value owned by the supervisor for one generation;
//!   binder code only ever sees an immutable reference
//! - Reload is a generation bump plus an atomic pointer swap, not an
//!   in-place patch

pub mod provider;
#[allow(clippy::module_inception)]
pub mod registry;
pub mod schema;

pub use provider::{ModuleProvider, StaticModuleProvider};
pub use registry::ComponentTypeRegistry;
pub use schema::{AttrKind, AttrMap, AttrSchema, AttrValue, AutomationApp, ScalarKind, TypeSchema};
