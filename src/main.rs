//! icequery - A terminal SQL console for Iceberg catalogs.

use std::sync::Arc;

use icequery::batch;
use icequery::cli::Cli;
use icequery::config::Config;
use icequery::connection::ConnectionManager;
use icequery::console::Console;
use icequery::error::Result;
use icequery::{engine, logging, tui};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    let batch_mode = cli.is_batch();

    // Logs go to a file while the TUI owns the terminal
    if batch_mode {
        logging::init_stderr_logging();
    } else {
        logging::init_file_logging();
    }

    if let Err(e) = run(cli).await {
        let report = e.report();
        error!("{report}");
        if !batch_mode {
            eprintln!("{report}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    // Precedence: CLI flags > environment > config file
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_overrides();
    cli.apply_to(&mut config);

    let factory = engine::factory(cli.mock_engine)?;
    let manager = Arc::new(ConnectionManager::new(factory, config.connection_settings()));
    info!(engine = manager.engine_name(), "Using engine");

    if let Some(sql) = cli.batch_sql()? {
        let mut stdout = std::io::stdout().lock();
        return batch::run(manager, &sql, cli.output, &mut stdout).await;
    }

    let console = Console::new(manager, config.console.default_query.clone());
    tui::run(console).await
}
