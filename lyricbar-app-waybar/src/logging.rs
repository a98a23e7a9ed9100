use lyricbar_core::{Config, LoggingConfig};
use serde::Deserialize;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where file logs should go, if anywhere.
///
/// Read before the full config load so that config errors are logged too.
pub fn file_log_path(cli_path: Option<&Path>, config_path: &Path) -> Option<PathBuf> {
    // Only the [logging] table matters here; the rest is validated later
    #[derive(Deserialize)]
    struct PartialConfig {
        #[serde(default)]
        logging: LoggingConfig,
    }

    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    let content = fs::read_to_string(config_path).ok()?;
    let logging = toml::from_str::<PartialConfig>(&content).ok()?.logging;
    logging.enabled.then(|| logging.log_path())
}

/// Initialize tracing: console output on stderr unless `quiet`, and
/// optionally a plain-text file.
pub fn init_tracing(verbose: bool, quiet: bool, file_path: Option<&Path>) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},zbus=warn")));

    // stdout carries the Waybar protocol
    let console_layer = (!quiet).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let mut file_error = None;
    let file_layer = file_path.and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false),
            ),
            Err(e) => {
                file_error = Some(format!("Failed to open log file at {}: {e}", path.display()));
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(message) = file_error {
        tracing::error!("{message}");
    }
}

/// Config path from the command line or the default location.
pub fn config_path(cli_path: Option<&Path>) -> PathBuf {
    cli_path.map_or_else(Config::config_path, Path::to_path_buf)
}
