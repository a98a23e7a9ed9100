mod args;
mod cli;
mod control;
mod error;
mod logging;
mod snippet;
mod watch;

use crate::cli::{Cli, Command};
use crate::error::AppError;
use clap::Parser;
use lyricbar_core::{Config, CoreError};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

fn main() -> ExitCode {
    let Cli {
        config: config_arg,
        verbose,
        quiet,
        log_file,
        output,
        command,
    } = Cli::parse();

    // Logging comes first so that config problems are reported
    let config_path = logging::config_path(config_arg.as_deref());
    let log_path = logging::file_log_path(log_file.as_deref(), &config_path);
    logging::init_tracing(verbose, quiet, log_path.as_deref());

    let mut config = match Config::load_or_create_at(&config_path) {
        Ok(config) => config,
        Err(CoreError::ConfigParseError(parse_error)) => {
            error!("Failed to parse {}: {}", config_path.display(), parse_error);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    output.apply(&mut config);
    if let Err(e) = config.validate() {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    match run(config, command.unwrap_or(Command::Watch)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config, command: Command) -> Result<(), AppError> {
    let runtime = tokio::runtime::Runtime::new().map_err(AppError::Runtime)?;

    runtime.block_on(async {
        match command {
            Command::Watch => watch::watch(config, shutdown_token()).await,
            Command::PlayPause => control::play_pause().await,
            Command::Volume { volume } => control::volume(volume).await,
            Command::Position { lyric, position } => {
                control::position(&config, lyric, &position).await
            }
            Command::Seek { lyric, offset } => control::seek(&config, lyric, &offset).await,
            Command::Init => {
                snippet::print(config.output.max_length);
                Ok(())
            }
        }
    })
}

/// Cancellation token fired on Ctrl+C or SIGTERM
fn shutdown_token() -> CancellationToken {
    let cancel_token = CancellationToken::new();
    let ctrlc_token = cancel_token.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received termination signal, shutting down");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    cancel_token
}
