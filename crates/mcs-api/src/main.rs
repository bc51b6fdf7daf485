use std::path::PathBuf;

use mcs_api::app::{build_router, AppState};
use mcs_core::services::config_loader::{self, DEFAULT_CONFIG_FILENAME};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args: Vec<String> = std::env::args().collect();
    let config_path = flag_value(&args, "--config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));
    let log_file = flag_value(&args, "--log-file").map(PathBuf::from);

    let _guard = setup_logging(log_file);

    let config = config_loader::load(&config_path)?;
    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %config.bind_address, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to stderr, or to `log_file` through a non-blocking writer. The returned
/// guard must live until exit so buffered lines are flushed.
fn setup_logging(
    log_file: Option<PathBuf>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let Some(path) = log_file else {
        tracing_subscriber::fmt().with_env_filter(env_filter()).init();
        return None;
    };

    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "mcs-api.log".to_string());
    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter())
        .with_ansi(false)
        .init();

    Some(guard)
}
