//! Netlog application shell.
//!
//! Wires configuration, logging, the check-in database and the registry
//! resolver together and runs the interactive check-in loop. Core logic lives
//! in the `crates/` directory.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod args;
pub mod logging;
pub mod session;
pub mod state;

pub use args::Args;

use anyhow::Context;
use logging::{init_tracing, DatabaseLogLayer};
use netlog_core::AppConfig;
use netlog_db::Database;
use netlog_lookup::OperatorResolver;
use session::{read_repeater, run_checkins, Console};
use state::AppState;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// Input ended and every check-in finished
    Completed,
    /// Ctrl-C abandoned the check-ins still in flight
    Interrupted,
}

/// Run one interactive session.
pub async fn run(args: Args) -> anyhow::Result<Shutdown> {
    let (database_layer, log_queue) = DatabaseLogLayer::new();
    init_tracing(args.debug, database_layer);

    info!("Starting netlog v{}", env!("CARGO_PKG_VERSION"));

    let mut config =
        AppConfig::load_with_env(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_to(&mut config);

    let database_path = config
        .database_path()
        .context("Failed to determine database location")?;
    let database = Database::open(&database_path)
        .await
        .with_context(|| format!("Failed to open database {}", database_path.display()))?;
    let log_writer = log_queue.start(database.clone());

    let resolver = OperatorResolver::from_config(&config.lookup)
        .context("Failed to set up registry lookups")?;

    let console = Console::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let repeater = read_repeater(
        &mut lines,
        &console,
        &config.net.default_repeater,
        config.net.accept_defaults,
    )
    .await?;

    let state = Arc::new(AppState::new(resolver, database.clone(), repeater));

    let shutdown = tokio::select! {
        summary = run_checkins(state, &mut lines, &console) => {
            summary?;
            Shutdown::Completed
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, abandoning in-flight check-ins");
            Shutdown::Interrupted
        }
    };

    log_writer.shutdown().await;
    database.close().await;
    Ok(shutdown)
}
