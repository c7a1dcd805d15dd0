//! automationd entry point.
//!
//! Wires the host: tracing, settings, shutdown coordination, the apps
//! watcher, and the connection supervisor. Automation component classes
//! come from a module provider; the default binary carries none, so
//! embedders supply their own provider and event source client.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use automationd::config::settings::{apply_addon_options, load_settings};
use automationd::connection::TcpConnectionFactory;
use automationd::lifecycle::{signals, Shutdown};
use automationd::loader::{AppsWatcher, ComponentInstanceManager};
use automationd::registry::StaticModuleProvider;
use automationd::supervisor::Supervisor;

/// Options file written by a managing supervisor, when present.
const ADDON_OPTIONS_PATH: &str = "/data/options.json";

#[derive(Parser, Debug)]
#[command(name = "automationd", version, about = "Automation host daemon")]
struct Cli {
    /// Path to the TOML settings file.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// App configuration directory (overrides `<source_folder>/apps`).
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "automationd=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("automationd v0.1.0 starting");

    let cli = Cli::parse();
    let mut settings = match load_settings(cli.settings.as_deref()) {
        Ok(settings) => settings,
        Err(error) => {
            tracing::error!(error = %error, "Could not load settings, exiting");
            return Ok(());
        }
    };
    if let Err(error) = apply_addon_options(&mut settings, Path::new(ADDON_OPTIONS_PATH)) {
        tracing::error!(error = %error, "Malformed add-on options, exiting");
        return Ok(());
    }

    let config_dir = cli.config_dir.unwrap_or_else(|| settings.apps_folder());
    if let Err(error) = std::fs::create_dir_all(&config_dir) {
        tracing::error!(dir = %config_dir.display(), error = %error, "Could not create apps directory, exiting");
        return Ok(());
    }

    tracing::info!(
        config_dir = %config_dir.display(),
        host = %settings.event_source.host,
        port = settings.event_source.port,
        reconnect_interval_secs = settings.supervisor.reconnect_interval_secs,
        generate_entities = settings.generate_entities,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_listener(&shutdown);

    // Keep the watcher handle alive for the process lifetime.
    let (watcher, reload_rx) = AppsWatcher::new(&config_dir);
    let _watcher_guard = match watcher.run() {
        Ok(guard) => Some(guard),
        Err(error) => {
            tracing::warn!(error = %error, "Apps watcher unavailable, reload-on-change disabled");
            None
        }
    };

    let provider = Arc::new(StaticModuleProvider::empty());
    let factory = Arc::new(TcpConnectionFactory::new(settings.event_source.clone()));
    let manager = ComponentInstanceManager::new(&config_dir);

    let supervisor =
        Supervisor::new(settings.supervisor.clone(), manager, provider, factory).with_reload(reload_rx);
    supervisor.run(shutdown.subscribe()).await;

    tracing::info!("automationd exited");
    Ok(())
}
