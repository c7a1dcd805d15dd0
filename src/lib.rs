//! Automation Host Daemon
//!
//! Loads user-authored automation components from declarative YAML files,
//! binds each to a registered component class through a schema-driven
//! binder, and supervises a persistent connection to an external event
//! source, rebuilding the component set on every reconnect.
//!
//! # Architecture Overview
//!
//! ```text
//!   apps/*.yaml ──▶ config::document ──▶ loader::manager ──▶ component set
//!                        │                    │                   │
//!   secrets.yaml ──▶ config::secrets ──▶ config::binder           ▼
//!                                             ▲            supervisor::runner
//!   module provider ──▶ registry (classes) ───┘                   │
//!                                                                 ▼
//!                                                    connection (event source)
//! ```
//!
//! Cross-cutting: `lifecycle` (shutdown, signals), process settings in
//! `config::settings`, reload-on-change in `loader::watcher`.

// Core subsystems
pub mod config;
pub mod loader;
pub mod registry;

// Connection handling
pub mod connection;
pub mod supervisor;

// Cross-cutting concerns
pub mod lifecycle;

pub use config::binder::ComponentInstance;
pub use config::settings::HostSettings;
pub use lifecycle::Shutdown;
pub use loader::ComponentInstanceManager;
pub use registry::ComponentTypeRegistry;
pub use supervisor::Supervisor;
