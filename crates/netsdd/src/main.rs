// # netsdd - Switch Discovery Daemon
//
// The netsdd daemon is responsible for:
// 1. Reading configuration (YAML file plus environment overrides)
// 2. Initializing logging and the runtime
// 3. Registering inventory sources and target sinks
// 4. Starting the discovery engine
//
// ## Configuration
//
// One optional flag selects the config file:
//
// ```bash
// netsdd --config /etc/netsd/config.yml   # default: config.yml
// ```
//
// Environment variables:
//
// - `region`: Deployment region (required; lower-cased on read)
// - `OS_PROM_CONFIGMAP_NAME`: Target ConfigMap name (required for the
//   config_map sink)
// - `REFRESH_INTERVAL`: Override of the refresh interval in seconds
// - `APP_ENV`: `production` logs at INFO, anything else at DEBUG
//
// ## Exit codes
//
// - 0: Clean shutdown (SIGTERM/SIGINT)
// - 1: Configuration, validation, or sink-startup error
// - 2: Unexpected runtime error

mod config;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

use netsd_core::{
    DiscoveryConfig, DiscoveryEngine, DiscoveryRegistry, EngineEvent, InventorySource, Region,
    TargetSink,
};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions.
#[derive(Debug, Clone, Copy)]
enum NetsdExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<NetsdExitCode> for ExitCode {
    fn from(code: NetsdExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Publishes NetBox access-switch scrape targets on a fixed interval
#[derive(Debug, Parser)]
#[command(name = "netsdd", version)]
struct Cli {
    /// Path of the YAML configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.yml")]
    config: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("Failed to set tracing subscriber: {e}");
        return NetsdExitCode::ConfigError.into();
    }

    let config = match config::load(&cli.config, |key| env::var(key).ok()) {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {e:#}");
            return NetsdExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {e}");
            return NetsdExitCode::RuntimeError.into();
        }
    };

    let outcome = rt.block_on(async {
        let (engine, event_rx) = match startup(config).await {
            Ok(parts) => parts,
            Err(e) => {
                error!("startup error: {e}");
                return NetsdExitCode::ConfigError;
            }
        };

        // Surface engine events in the logs.
        tokio::spawn(drain_events(event_rx));

        info!("starting discovery engine");
        match engine.run().await {
            Ok(()) => {
                info!("daemon stopped");
                NetsdExitCode::CleanShutdown
            }
            Err(e) => {
                error!("daemon error: {e}");
                NetsdExitCode::RuntimeError
            }
        }
    });

    outcome.into()
}

/// Initialize tracing with the verbosity selected by APP_ENV.
fn init_tracing() -> Result<()> {
    let app_env = env::var("APP_ENV")
        .unwrap_or_else(|_| "production".to_string())
        .to_lowercase();

    let level = if app_env == "production" {
        Level::INFO
    } else {
        Level::DEBUG
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Validate the region, wire up components, and probe the sink.
///
/// Everything that can fail here is a startup error: the caller exits
/// with a non-zero status and nothing has been published.
async fn startup(
    config: DiscoveryConfig,
) -> netsd_core::Result<(DiscoveryEngine, mpsc::Receiver<EngineEvent>)> {
    // Fail on a bad region before anything touches the network.
    let region = Region::parse(&config.region)?;
    info!(%region, "region validated");

    let registry = DiscoveryRegistry::new();

    #[cfg(feature = "netbox")]
    netsd_inventory_netbox::register(&registry);

    #[cfg(feature = "file")]
    netsd_sink_file::register(&registry);

    #[cfg(feature = "configmap")]
    netsd_sink_configmap::register(&registry);

    let source = registry.create_source(&config.inventory)?;
    let sink = registry.create_sink(&config.sink)?;

    info!(
        source = source.source_name(),
        sink = sink.sink_name(),
        "components created"
    );

    // The destination must pre-exist and be reachable; anything else is fatal.
    sink.ensure_ready().await?;

    DiscoveryEngine::new(source, sink, config)
}

/// Log engine events as they arrive.
async fn drain_events(mut events: mpsc::Receiver<EngineEvent>) {
    while let Some(event) = events.recv().await {
        debug!(?event, "engine event");
    }
}
