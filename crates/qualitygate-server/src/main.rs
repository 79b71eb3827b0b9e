use std::env;

use qualitygate_server::config::loader::{DEFAULT_CONFIG_FILE, load_config};
use qualitygate_server::{observability, startup};

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From QUALITYGATE_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (qualitygate.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (QUALITYGATE_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist - it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    // Initialize tracing early with the default level
    observability::init_tracing();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("GIT_COMMIT"),
        "Starting qualitygate-server"
    );

    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        backend = %cfg.storage.backend,
        "Configuration loaded"
    );

    observability::apply_logging_level(&cfg.logging.level);

    let store = match startup::create_store(&cfg.storage).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Storage initialization failed: {e}");
            std::process::exit(2);
        }
    };

    match startup::run(store, &cfg.bootstrap).await {
        Ok(report) => {
            tracing::info!(
                gate_id = report.quality_gates.gate_id,
                metrics_inserted = report.metrics.map(|m| m.inserted).unwrap_or(0),
                unchanged = report.quality_gates.is_unchanged(),
                "Startup completed"
            );
        }
        Err(e) => {
            eprintln!("Startup failed: {e}");
            std::process::exit(2);
        }
    }
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: QUALITYGATE_CONFIG
/// 3. Default: qualitygate.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config"
            && let Some(path) = args.next()
        {
            return (path, ConfigSource::CliArgument);
        }
    }

    if let Ok(path) = env::var("QUALITYGATE_CONFIG")
        && !path.is_empty()
    {
        return (path, ConfigSource::EnvironmentVariable);
    }

    (DEFAULT_CONFIG_FILE.to_string(), ConfigSource::Default)
}
