//! Module provider boundary.
//!
//! Whatever turns user source text into loadable component classes sits
//! behind this trait. A reload is represented as a new generation number;
//! the supervisor rebuilds the registry wholesale when it observes a
//! generation it has not seen, never patching one in place.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::registry::schema::TypeSchema;

pub trait ModuleProvider: Send + Sync {
    /// Full set of component classes exported by the current generation.
    fn exported_types(&self) -> Vec<TypeSchema>;

    /// Monotonic generation counter; bumps when exported types change.
    fn generation(&self) -> u64;
}

/// Provider over a fixed class list, for hosts that compile their
/// components in statically. `bump_generation` lets an embedder force a
/// registry rebuild after swapping the list source out-of-band.
pub struct StaticModuleProvider {
    types: Vec<TypeSchema>,
    generation: AtomicU64,
}

impl StaticModuleProvider {
    pub fn new(types: Vec<TypeSchema>) -> Self {
        Self {
            types,
            generation: AtomicU64::new(1),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl ModuleProvider for StaticModuleProvider {
    fn exported_types(&self) -> Vec<TypeSchema> {
        self.types.clone()
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
