mod cli;
mod engine;
mod store;
mod timefmt;
mod types;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli_opts = cli::Cli::parse();
    let db_path = store::default_db_path();
    let db = store::SqliteStore::open(&db_path)?;

    let mut engine = engine::TimerEngine::load(db);
    let command = cli_opts
        .command
        .unwrap_or(cli::Command::List { archived: false });
    cli::run(command, &mut engine)
}
