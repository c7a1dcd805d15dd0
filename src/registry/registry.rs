//! Component type registry.
//!
//! Maps a declared class name to its schema. Built once per generation
//! from the module provider's full export set and read-only afterwards;
//! the supervisor publishes a rebuilt registry through an atomic pointer
//! swap, so a binding pass never observes one half-updated.

use std::collections::HashMap;

use crate::registry::provider::ModuleProvider;
use crate::registry::schema::TypeSchema;

#[derive(Debug)]
pub struct ComponentTypeRegistry {
    /// Keys are lowercased; class names match case-insensitively.
    types: HashMap<String, TypeSchema>,
    generation: u64,
}

impl ComponentTypeRegistry {
    /// Build from the provider's full export set.
    ///
    /// A class name exported twice is last-write-wins, surfaced as a
    /// warning so the collision is visible.
    pub fn build(provider: &dyn ModuleProvider) -> Self {
        let generation = provider.generation();
        let mut types = HashMap::new();
        for schema in provider.exported_types() {
            let key = schema.class_name().to_lowercase();
            if let Some(previous) = types.insert(key, schema) {
                tracing::warn!(
                    class = previous.class_name(),
                    "Duplicate component class export, keeping the later one"
                );
            }
        }
        tracing::debug!(
            generation,
            classes = types.len(),
            "Component type registry built"
        );
        Self { types, generation }
    }

    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
            generation: 0,
        }
    }

    /// Pure read; `None` when the class name is not registered.
    pub fn resolve(&self, class_name: &str) -> Option<&TypeSchema> {
        self.types.get(&class_name.to_lowercase())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::provider::StaticModuleProvider;
    use crate::registry::schema::{AttrKind, AttrSchema};

    fn schema(name: &str) -> TypeSchema {
        TypeSchema::new(name, AttrSchema::new().with("x", AttrKind::integer()))
    }

    #[test]
    fn resolves_case_insensitively() {
        let provider = StaticModuleProvider::new(vec![schema("LightAutomation")]);
        let registry = ComponentTypeRegistry::build(&provider);

        assert!(registry.resolve("lightautomation").is_some());
        assert!(registry.resolve("LIGHTAUTOMATION").is_some());
        assert!(registry.resolve("Unknown").is_none());
    }

    #[test]
    fn duplicate_class_is_last_write_wins() {
        let first = TypeSchema::new("Dup", AttrSchema::new().with("a", AttrKind::integer()));
        let second = TypeSchema::new("Dup", AttrSchema::new().with("b", AttrKind::integer()));
        let provider = StaticModuleProvider::new(vec![first, second]);
        let registry = ComponentTypeRegistry::build(&provider);

        assert_eq!(registry.len(), 1);
        let resolved = registry.resolve("dup").unwrap();
        assert!(resolved.attrs().get("b").is_some());
        assert!(resolved.attrs().get("a").is_none());
    }

    #[test]
    fn carries_the_provider_generation() {
        let provider = StaticModuleProvider::new(vec![schema("A")]);
        assert_eq!(ComponentTypeRegistry::build(&provider).generation(), 1);
        provider.bump_generation();
        assert_eq!(ComponentTypeRegistry::build(&provider).generation(), 2);
    }
}
