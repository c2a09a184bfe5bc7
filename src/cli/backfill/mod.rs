//! Backfill command - one-shot coordinate repair over the job table

use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::backfill::{BackfillJob, PostgresJobStore};
use crate::infrastructure::logging;

#[derive(Args)]
pub struct BackfillArgs {
    /// Write repairs to the database. Without this flag the run is a
    /// dry-run that only reports what it would change.
    #[arg(long)]
    pub apply: bool,

    /// Maximum number of recent job rows to scan
    #[arg(long, default_value_t = 500)]
    pub limit: i64,

    /// Number of rows geocoded concurrently
    #[arg(long, default_value_t = 3)]
    pub concurrency: usize,
}

/// Run the backfill and print a JSON summary to stdout. Setup failures
/// (missing database, unreachable database) print a JSON error to stderr
/// and exit non-zero; per-row failures are part of the summary.
pub async fn run(args: BackfillArgs) -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    match execute(&config, args).await {
        Ok(summary) => {
            println!("{summary}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", json!({ "error": e.to_string() }));
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn execute(config: &AppConfig, args: BackfillArgs) -> anyhow::Result<String> {
    let url = config
        .database
        .url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("backfill requires a configured database url"))?;

    let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
    let store = Arc::new(PostgresJobStore::new(pool));

    let client = crate::http_client(config.geocoding.timeout_secs);
    let providers = crate::build_geocode_providers(config, &client);

    let job = BackfillJob::new(store, providers, args.concurrency, !args.apply);
    info!(
        limit = args.limit,
        concurrency = args.concurrency,
        apply = args.apply,
        "running coordinate backfill"
    );

    let summary = job.run(args.limit).await?;
    Ok(serde_json::to_string_pretty(&summary)?)
}
