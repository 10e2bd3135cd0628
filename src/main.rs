use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

use r9s::app::App;
use r9s::config::Config;

#[derive(Parser, Debug)]
#[command(name = "r9s")]
#[command(about = "A terminal UI for the Residia back-office, inspired by k9s")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/r9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Override the API base URL from the config
  #[arg(short, long)]
  base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = init_tracing()?;

  // Load configuration
  let mut config = Config::load(args.config.as_deref())?;

  // Override base URL if specified on command line
  if let Some(base_url) = args.base_url {
    config.api.base_url = base_url;
  }

  // Initialize and run the app
  let mut app = App::new(config)?;
  app.run().await?;

  Ok(())
}

/// Set up file logging when RUST_LOG is present. The terminal belongs to
/// the UI, so logs never go to stdout.
fn init_tracing() -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
  if std::env::var("RUST_LOG").is_err() {
    return Ok(None);
  }

  let log_dir = dirs::data_dir()
    .unwrap_or_else(|| PathBuf::from("."))
    .join("r9s");
  std::fs::create_dir_all(&log_dir)?;

  let appender = tracing_appender::rolling::never(log_dir, "r9s.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(Some(guard))
}
