//! Connection supervisor loop.
//!
//! # Responsibilities
//! - Own the connect / load / run / backoff cycle, one generation at a time
//! - Rebuild the component set via the instance manager on every connect
//! - Keep the registry current with the module provider's generation
//! - Honor cancellation at every suspension point
//!
//! # Design Decisions
//! - Single cooperative flow; registry rebuild and load passes are
//!   sequenced by this loop, never concurrent, so no locks are needed
//! - Every failure short of cancellation is recoverable: log, back off,
//!   try again with a fresh generation
//! - Backoff is one fixed interval from settings (exponential backoff
//!   would be a reasonable hardening, not needed for correctness)

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::{broadcast, mpsc};
use tokio::time;

use crate::config::settings::SupervisorSettings;
use crate::connection::{ConnectionFactory, EventSourceConnection};
use crate::loader::ComponentInstanceManager;
use crate::registry::{ComponentTypeRegistry, ModuleProvider};
use crate::supervisor::session::{ConnectionSession, SessionState};

enum Readiness {
    Ready,
    NotReady,
    Cancelled,
}

/// Owns the component set's lifecycle across connect/disconnect cycles.
pub struct Supervisor {
    settings: SupervisorSettings,
    manager: ComponentInstanceManager,
    provider: Arc<dyn ModuleProvider>,
    factory: Arc<dyn ConnectionFactory>,
    registry: ArcSwap<ComponentTypeRegistry>,
    reload_rx: Option<mpsc::UnboundedReceiver<()>>,
}

impl Supervisor {
    pub fn new(
        settings: SupervisorSettings,
        manager: ComponentInstanceManager,
        provider: Arc<dyn ModuleProvider>,
        factory: Arc<dyn ConnectionFactory>,
    ) -> Self {
        let registry = ComponentTypeRegistry::build(provider.as_ref());
        if registry.is_empty() {
            tracing::warn!("Module provider exported no component classes");
        }
        Self {
            settings,
            manager,
            provider,
            factory,
            registry: ArcSwap::from_pointee(registry),
            reload_rx: None,
        }
    }

    /// Attach a reload signal; each signal ends the current generation so
    /// the next one picks up changed configuration or rebuilt types.
    pub fn with_reload(mut self, reload_rx: mpsc::UnboundedReceiver<()>) -> Self {
        self.reload_rx = Some(reload_rx);
        self
    }

    /// Run generations until the shutdown signal fires.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        let mut generation: u64 = 0;

        loop {
            if generation > 0 {
                // Every iteration after the first waits one fixed interval.
                tracing::info!(
                    secs = self.settings.reconnect_interval_secs,
                    "Waiting before reconnecting"
                );
                tokio::select! {
                    _ = time::sleep(self.settings.reconnect_interval()) => {}
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown during backoff, supervisor stopping");
                        break;
                    }
                }
            }

            generation += 1;
            let mut session = ConnectionSession::new(generation);
            session.transition(SessionState::Connecting);

            let mut conn = match self.factory.open().await {
                Ok(conn) => conn,
                Err(error) => {
                    tracing::warn!(generation, error = %error, "Could not open event source connection");
                    session.transition(SessionState::Disconnected);
                    continue;
                }
            };

            match self.wait_for_ready(conn.as_ref(), &mut shutdown).await {
                Readiness::Ready => {}
                Readiness::NotReady => {
                    tracing::warn!(generation, "Event source still unavailable, will retry");
                    session.transition(SessionState::Disconnected);
                    continue;
                }
                Readiness::Cancelled => {
                    session.transition(SessionState::Stopped);
                    break;
                }
            }
            session.transition(SessionState::Connected);

            // A provider generation bump means new compiled types: rebuild
            // wholesale before the load pass, never during one.
            self.rebuild_registry_if_stale();
            let registry = self.registry.load_full();
            let report = self.manager.load_all(&registry);
            if report.has_errors() {
                tracing::error!(
                    generation,
                    failed_files = report.errors.len(),
                    "Some configuration files failed to load"
                );
            }
            tracing::info!(generation, count = report.count(), "Activating component set");

            if let Err(error) = conn.activate(report.instances).await {
                tracing::warn!(generation, error = %error, "Component activation failed");
                session.transition(SessionState::Disconnected);
                continue;
            }

            tokio::select! {
                result = conn.run() => {
                    session.transition(SessionState::Disconnected);
                    match result {
                        Ok(()) => tracing::warn!(generation, "Event source disconnected"),
                        Err(error) => tracing::warn!(generation, error = %error, "Connection failed"),
                    }
                }
                _ = shutdown.recv() => {
                    session.transition(SessionState::Stopped);
                    break;
                }
                _ = reload_signal(&mut self.reload_rx) => {
                    tracing::info!(generation, "Configuration changed, restarting generation");
                    session.transition(SessionState::Disconnected);
                }
            }
            // The generation's connection and instances drop here.
        }

        tracing::info!("Supervisor exited");
    }

    /// Bounded readiness poll at a fixed interval.
    async fn wait_for_ready(
        &self,
        conn: &dyn EventSourceConnection,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Readiness {
        for attempt in 0..self.settings.ready_poll_attempts {
            if conn.is_ready() {
                return Readiness::Ready;
            }
            tracing::debug!(attempt, "Event source not ready yet");
            tokio::select! {
                _ = time::sleep(self.settings.ready_poll_interval()) => {}
                _ = shutdown.recv() => return Readiness::Cancelled,
            }
        }
        if conn.is_ready() {
            Readiness::Ready
        } else {
            Readiness::NotReady
        }
    }

    fn rebuild_registry_if_stale(&self) {
        let current = self.registry.load();
        let target = self.provider.generation();
        if current.generation() != target {
            tracing::info!(
                from = current.generation(),
                to = target,
                "Rebuilding component type registry"
            );
            self.registry
                .store(Arc::new(ComponentTypeRegistry::build(self.provider.as_ref())));
        }
    }
}

/// Pends forever when no reload channel is attached or it has closed, so
/// the select arm simply never fires.
async fn reload_signal(rx: &mut Option<mpsc::UnboundedReceiver<()>>) {
    match rx {
        Some(rx) => {
            if rx.recv().await.is_none() {
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}
