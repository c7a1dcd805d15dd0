//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use automationd::config::binder::ComponentInstance;
use automationd::connection::{ConnectionError, ConnectionFactory, EventSourceConnection};
use automationd::registry::schema::TypeSchema;
use automationd::registry::ModuleProvider;
use automationd::registry::{AttrKind, AttrSchema};

/// Scripted event source shared between a test and its mock connections.
#[derive(Default)]
pub struct Script {
    /// Readiness flag every session reports.
    pub ready: AtomicBool,
    /// When set, `open` fails as unreachable.
    pub fail_open: AtomicBool,
    /// Number of `open` calls observed.
    pub opens: AtomicUsize,
    /// `(id, class)` pairs of each activated component set, per generation.
    pub activations: Mutex<Vec<Vec<(String, String)>>>,
    /// Each permit lets one running session end with a normal disconnect.
    pub disconnect: Notify,
}

impl Script {
    pub fn ready() -> Arc<Self> {
        let script = Arc::new(Self::default());
        script.ready.store(true, Ordering::SeqCst);
        script
    }

    pub fn activation_count(&self) -> usize {
        self.activations.lock().unwrap().len()
    }
}

pub struct MockFactory {
    pub script: Arc<Script>,
}

#[async_trait]
impl ConnectionFactory for MockFactory {
    async fn open(&self) -> Result<Box<dyn EventSourceConnection>, ConnectionError> {
        self.script.opens.fetch_add(1, Ordering::SeqCst);
        if self.script.fail_open.load(Ordering::SeqCst) {
            return Err(ConnectionError::Unreachable("scripted failure".to_string()));
        }
        Ok(Box::new(MockConnection {
            script: Arc::clone(&self.script),
        }))
    }
}

struct MockConnection {
    script: Arc<Script>,
}

#[async_trait]
impl EventSourceConnection for MockConnection {
    fn is_ready(&self) -> bool {
        self.script.ready.load(Ordering::SeqCst)
    }

    async fn activate(
        &mut self,
        components: Vec<ComponentInstance>,
    ) -> Result<(), ConnectionError> {
        let set = components
            .iter()
            .map(|c| (c.id.clone(), c.class_name.clone()))
            .collect();
        self.script.activations.lock().unwrap().push(set);
        Ok(())
    }

    async fn run(&mut self) -> Result<(), ConnectionError> {
        self.script.disconnect.notified().await;
        Ok(())
    }
}

/// Module provider whose export set can be swapped between generations.
pub struct SwappableProvider {
    types: Mutex<Vec<TypeSchema>>,
    generation: AtomicU64,
}

impl SwappableProvider {
    pub fn new(types: Vec<TypeSchema>) -> Self {
        Self {
            types: Mutex::new(types),
            generation: AtomicU64::new(1),
        }
    }

    pub fn swap(&self, types: Vec<TypeSchema>) {
        *self.types.lock().unwrap() = types;
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl ModuleProvider for SwappableProvider {
    fn exported_types(&self) -> Vec<TypeSchema> {
        self.types.lock().unwrap().clone()
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

/// Schema matching the documentation's `LightAutomation` example.
pub fn light_schema() -> TypeSchema {
    TypeSchema::new(
        "LightAutomation",
        AttrSchema::new()
            .with("brightness", AttrKind::integer())
            .with("zones", AttrKind::sequence_of(AttrKind::string())),
    )
}

pub const LIGHT_APP_YAML: &str =
    "light_app:\n  class: LightAutomation\n  brightness: 50\n  zones:\n    - kitchen\n    - hall\n";
