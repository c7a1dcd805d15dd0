//! Supervisor lifecycle: generations, reconnects, cancellation.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use automationd::config::settings::SupervisorSettings;
use automationd::lifecycle::Shutdown;
use automationd::loader::ComponentInstanceManager;
use automationd::registry::StaticModuleProvider;
use automationd::supervisor::Supervisor;
use common::{light_schema, MockFactory, Script, SwappableProvider, LIGHT_APP_YAML};

fn fast_settings() -> SupervisorSettings {
    SupervisorSettings {
        reconnect_interval_secs: 1,
        ready_poll_interval_ms: 20,
        ready_poll_attempts: 3,
    }
}

async fn wait_until(deadline: Duration, mut check: impl FnMut() -> bool) -> bool {
    let result = timeout(deadline, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    result.is_ok()
}

fn supervisor_over(
    dir: &std::path::Path,
    script: &Arc<Script>,
    provider: Arc<dyn automationd::registry::ModuleProvider>,
) -> Supervisor {
    Supervisor::new(
        fast_settings(),
        ComponentInstanceManager::new(dir),
        provider,
        Arc::new(MockFactory {
            script: Arc::clone(script),
        }),
    )
}

#[tokio::test]
async fn activates_the_component_set_once_connected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("apps.yaml"), LIGHT_APP_YAML).unwrap();

    let script = Script::ready();
    let provider = Arc::new(StaticModuleProvider::new(vec![light_schema()]));
    let supervisor = supervisor_over(dir.path(), &script, provider);

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(supervisor.run(shutdown.subscribe()));

    assert!(wait_until(Duration::from_secs(2), || script.activation_count() == 1).await);
    {
        let activations = script.activations.lock().unwrap();
        assert_eq!(
            activations[0],
            vec![("light_app".to_string(), "LightAutomation".to_string())]
        );
    }

    shutdown.trigger();
    timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn rebuilds_the_component_set_on_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("apps.yaml"), LIGHT_APP_YAML).unwrap();

    let script = Script::ready();
    let provider = Arc::new(StaticModuleProvider::new(vec![light_schema()]));
    let supervisor = supervisor_over(dir.path(), &script, provider);

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(supervisor.run(shutdown.subscribe()));

    assert!(wait_until(Duration::from_secs(2), || script.activation_count() == 1).await);

    // Remote close ends the generation; after one backoff interval the
    // supervisor reconnects and rebuilds the whole set.
    script.disconnect.notify_one();
    assert!(wait_until(Duration::from_secs(4), || script.activation_count() == 2).await);

    {
        let activations = script.activations.lock().unwrap();
        assert_eq!(activations[0], activations[1]);
    }
    assert_eq!(script.opens.load(Ordering::SeqCst), 2);

    shutdown.trigger();
    timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn provider_generation_bump_swaps_the_registry_between_generations() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("apps.yaml"), LIGHT_APP_YAML).unwrap();

    let script = Script::ready();
    // First generation exports nothing, so the entry is skipped.
    let provider = Arc::new(SwappableProvider::new(vec![]));
    let supervisor = supervisor_over(dir.path(), &script, Arc::clone(&provider) as _);

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(supervisor.run(shutdown.subscribe()));

    assert!(wait_until(Duration::from_secs(2), || script.activation_count() == 1).await);
    assert!(script.activations.lock().unwrap()[0].is_empty());

    // New compiled types arrive; the next generation resolves the class.
    provider.swap(vec![light_schema()]);
    script.disconnect.notify_one();
    assert!(wait_until(Duration::from_secs(4), || script.activation_count() == 2).await);
    assert_eq!(
        script.activations.lock().unwrap()[1],
        vec![("light_app".to_string(), "LightAutomation".to_string())]
    );

    shutdown.trigger();
    timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn open_failure_is_recoverable() {
    let dir = tempfile::tempdir().unwrap();
    let script = Script::ready();
    script.fail_open.store(true, Ordering::SeqCst);

    let provider = Arc::new(StaticModuleProvider::new(vec![light_schema()]));
    let supervisor = supervisor_over(dir.path(), &script, provider);

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(supervisor.run(shutdown.subscribe()));

    // First attempt fails, the loop backs off; let it succeed afterwards.
    assert!(wait_until(Duration::from_secs(2), || {
        script.opens.load(Ordering::SeqCst) == 1
    })
    .await);
    script.fail_open.store(false, Ordering::SeqCst);
    assert!(wait_until(Duration::from_secs(4), || script.activation_count() == 1).await);

    shutdown.trigger();
    timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn cancellation_during_backoff_exits_within_one_interval() {
    let dir = tempfile::tempdir().unwrap();
    let script = Script::ready();
    let provider = Arc::new(StaticModuleProvider::new(vec![light_schema()]));
    let supervisor = supervisor_over(dir.path(), &script, provider);

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(supervisor.run(shutdown.subscribe()));

    assert!(wait_until(Duration::from_secs(2), || script.activation_count() == 1).await);
    // End the generation; the supervisor is now inside the backoff wait.
    script.disconnect.notify_one();
    tokio::time::sleep(Duration::from_millis(100)).await;

    shutdown.trigger();
    timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn cancellation_during_readiness_poll_exits_promptly() {
    let dir = tempfile::tempdir().unwrap();
    let script = Arc::new(Script::default()); // never ready
    let provider = Arc::new(StaticModuleProvider::new(vec![light_schema()]));

    let mut settings = fast_settings();
    settings.ready_poll_attempts = 1000;
    let supervisor = Supervisor::new(
        settings,
        ComponentInstanceManager::new(dir.path()),
        provider,
        Arc::new(MockFactory {
            script: Arc::clone(&script),
        }),
    );

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(supervisor.run(shutdown.subscribe()));

    assert!(wait_until(Duration::from_secs(2), || {
        script.opens.load(Ordering::SeqCst) == 1
    })
    .await);
    tokio::time::sleep(Duration::from_millis(50)).await;

    shutdown.trigger();
    timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn cancellation_during_connected_run_exits_promptly() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("apps.yaml"), LIGHT_APP_YAML).unwrap();

    let script = Script::ready();
    let provider = Arc::new(StaticModuleProvider::new(vec![light_schema()]));
    let supervisor = supervisor_over(dir.path(), &script, provider);

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(supervisor.run(shutdown.subscribe()));

    assert!(wait_until(Duration::from_secs(2), || script.activation_count() == 1).await);

    // The connection is blocked in run(); cancellation must still win.
    shutdown.trigger();
    timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn never_ready_event_source_falls_through_to_backoff() {
    let dir = tempfile::tempdir().unwrap();
    let script = Arc::new(Script::default()); // never ready
    let provider = Arc::new(StaticModuleProvider::new(vec![light_schema()]));
    let supervisor = supervisor_over(dir.path(), &script, provider);

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(supervisor.run(shutdown.subscribe()));

    // Two opens prove the first attempt gave up on readiness, backed off,
    // and the loop tried again rather than treating it as fatal.
    assert!(wait_until(Duration::from_secs(4), || {
        script.opens.load(Ordering::SeqCst) >= 2
    })
    .await);
    assert_eq!(script.activation_count(), 0);

    shutdown.trigger();
    timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
}
