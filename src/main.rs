use anyhow::{Context, Result};
use task_ledger::config::Config;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::discover()?;

    let log_file = std::fs::File::create(&config.logging.file)
        .with_context(|| format!("Failed to create log file: {}", config.logging.file.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    tracing::info!(
        input = %config.files.input.display(),
        output = %config.files.output.display(),
        annotate_loaded = config.finalize.annotate_loaded,
        "task ledger starting"
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let result = task_ledger::run(&config, stdin.lock(), stdout.lock());
    if let Err(e) = &result {
        tracing::error!("task ledger failed: {:#}", e);
    }
    result.map(|_| ())
}
