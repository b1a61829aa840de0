//! # Stockroom
//!
//! Console inventory and ordering tool.
//!
//! ## Usage
//!
//! ```bash
//! # Optional overrides
//! export STOCKROOM_DATA_FILE=products.json
//! export STOCKROOM_CURRENCY=UAH
//!
//! # Run the console
//! stockroom --data-file shop.json
//! ```

use clap::Parser;
use std::path::PathBuf;
use stock_cli::{AppConfig, LogFormat, Menus, TerminalConsole};
use stock_core::{JsonFilePersistence, ProductCatalog};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Stockroom - console inventory and ordering
#[derive(Debug, Parser)]
#[command(name = "stockroom")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./stockroom.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Catalog JSON file
    #[arg(short, long)]
    data_file: Option<PathBuf>,

    /// Currency label shown after prices
    #[arg(long)]
    currency: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.data_file {
        config = config.with_data_file(path);
    }
    if let Some(currency) = cli.currency {
        config = config.with_currency(currency);
    }

    init_logging(&config)?;

    print_banner();

    let mut catalog = ProductCatalog::open(JsonFilePersistence::new(&config.data_file));
    info!(
        data_file = %config.data_file.display(),
        products = catalog.len(),
        "Stockroom starting"
    );

    let mut console = TerminalConsole::stdio();
    Menus::new(&mut console, &mut catalog, config.currency.clone()).run()?;

    info!("Stockroom stopped");
    Ok(())
}

/// Logs go to stderr so they never mix with menu output
fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(config.level_filter()?.into())
        .from_env_lossy();

    let (pretty, json) = match config.log_format {
        LogFormat::Pretty => (Some(fmt::layer().with_writer(std::io::stderr)), None),
        LogFormat::Json => (None, Some(fmt::layer().json().with_writer(std::io::stderr))),
    };

    tracing_subscriber::registry()
        .with(pretty)
        .with(json)
        .with(filter)
        .init();
    Ok(())
}

fn print_banner() {
    println!(
        r#"
  Stockroom
  ━━━━━━━━━━━━━━━━━━━━━━━
  Inventory and ordering
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
