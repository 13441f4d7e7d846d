use std::fs;
use std::path::Path;

use chrono::Local;
use fern::Dispatch;
use log::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;

use crate::api::config_dto::{LogBackend, LoggingConfigDto};
use crate::error::{Error, Result};

fn level_from_env() -> LevelFilter {
    std::env::var("RUST_LOG").ok().and_then(|level| level.parse::<LevelFilter>().ok()).unwrap_or(LevelFilter::Info)
}

/// Installs the backend selected in the configuration.
///
/// The returned guard belongs to the `tracing` backend and must live until the
/// program exits, otherwise buffered file output is lost.
pub fn init_from_config(config: &LoggingConfigDto) -> Option<WorkerGuard> {
    match config.backend {
        LogBackend::Fern => {
            init(&config.directory, &config.file);
            None
        }
        LogBackend::Tracing => match init_tracing(&config.directory, &config.file) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Failed to initialize tracing, falling back to fern: {}", e);
                init(&config.directory, &config.file);
                None
            }
        },
    }
}

/// Initializes the global `log` logger: colored stderr plus `directory/file`.
///
/// Level comes from `RUST_LOG` (e.g. `RUST_LOG=debug`), defaulting to `info`.
/// Analytics events emitted through `tracing` end up here as well.
pub fn init(directory: &str, file: &str) {
    if let Err(e) = fs::create_dir_all(directory) {
        eprintln!("Failed to create log directory at '{}': {}", directory, e);
    }

    let log_file_path = Path::new(directory).join(file);

    let base_config = Dispatch::new()
        .level(level_from_env())
        .level_for("hyper", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("mio", LevelFilter::Warn);

    let console_config = Dispatch::new()
        .format(|out, message, record| {
            let colors = fern::colors::ColoredLevelConfig::new()
                .error(fern::colors::Color::Red)
                .warn(fern::colors::Color::Yellow)
                .info(fern::colors::Color::Green)
                .debug(fern::colors::Color::Blue)
                .trace(fern::colors::Color::BrightBlack);

            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    let mut dispatch = base_config.chain(console_config);

    match fern::log_file(&log_file_path) {
        Ok(log_file) => {
            let file_config = Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!("[{} {} {}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), record.level(), record.target(), message))
                })
                .chain(log_file);
            dispatch = dispatch.chain(file_config);
        }
        Err(e) => eprintln!("Failed to open log file '{}': {}", log_file_path.display(), e),
    }

    if let Err(e) = dispatch.apply() {
        eprintln!("Failed to apply logger configuration: {}", e);
        return;
    }

    log::info!("Logger initialized. Logging to console and '{}'.", log_file_path.display());
}

/// Structured alternative: `tracing` subscriber with a daily rolling file.
///
/// `log` records are bridged into it, so the rest of the crate does not care which backend runs.
pub fn init_tracing(directory: &str, file: &str) -> Result<WorkerGuard> {
    fs::create_dir_all(directory)?;

    let (file_writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(directory, file));
    let timer = LocalTime::new(time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_timer(timer.clone()).with_target(true).with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_timer(timer).with_ansi(false).with_writer(file_writer));

    tracing_log::LogTracer::init().map_err(|e| Error::LoggerError(e.to_string()))?;
    tracing::subscriber::set_global_default(subscriber).map_err(|e| Error::LoggerError(e.to_string()))?;

    log::info!("Tracing initialized. Logging to console and '{}' (rotated daily).", Path::new(directory).join(file).display());
    Ok(guard)
}
