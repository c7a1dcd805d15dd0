//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! app config file (YAML)
//!     → document.rs (parse to untyped ConfigNode tree, tags preserved)
//!     → binder.rs (schema-driven recursive bind, secrets resolved)
//!     → ComponentInstance (typed, generation-owned)
//!
//! process settings (TOML + env + add-on JSON)
//!     → settings.rs (load, override, validate)
//!     → HostSettings (immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - Documents stay untyped until a class schema is known; all coercion
//!   happens in one place, the binder
//! - Secrets are file-scoped: each directory's `secrets.yaml` only serves
//!   references from files in that directory
//! - Binding is side-effect free apart from secrets table lookups

pub mod binder;
pub mod document;
pub mod secrets;
pub mod settings;

pub use binder::{BindError, ComponentInstance};
pub use document::{ConfigNode, ConfigParseError};
pub use secrets::{SecretsStore, SecretsTable};
pub use settings::HostSettings;
