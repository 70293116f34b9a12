use clap::Parser;
use journalflow::{Cli, Commands};
use journalflow_database::{
    establish_pool, run_migrations, PostgresConfigStore, PostgresEntityStore, PostgresUsageLedger,
};
use journalflow_models::{create_transcriber, OpenAiChatClient};
use journalflow_pipeline::{ActionDispatcher, CodeActionRegistry, PipelineDriver};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_filter = match &cli.command {
        Commands::Run { verbose: true, .. } => "debug",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Commands::Run {
            entity_type,
            watch,
            interval,
            transcriber,
            verbose: _,
        } => {
            run_pipeline(entity_type, watch, interval, transcriber).await?;
        }
        Commands::Migrate => {
            migrate()?;
        }
    }

    Ok(())
}

async fn run_pipeline(
    entity_type: String,
    watch: bool,
    interval: u64,
    transcriber_engine: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = establish_pool()?;
    let config = Arc::new(PostgresConfigStore::new(pool.clone()));
    let entities = Arc::new(PostgresEntityStore::new(pool.clone()));
    let ledger = Arc::new(PostgresUsageLedger::new(pool));

    // Code-action handlers register here; the config table's
    // (module_reference, entry_point) pairs resolve against this table.
    let registry = Arc::new(CodeActionRegistry::new());

    let dispatcher = ActionDispatcher::new(config.clone(), entities.clone(), ledger, registry)
        .with_driver("openai", Arc::new(OpenAiChatClient::new()?));
    let transcriber = create_transcriber(&transcriber_engine)?;
    let driver = PipelineDriver::new(config, entities, transcriber, dispatcher, entity_type);

    if watch {
        tracing::info!(interval_secs = interval, "Watching for new entities");
        let mut ticker = tokio::time::interval(Duration::from_secs(interval));
        loop {
            ticker.tick().await;
            // A failed cycle is logged and retried on the next tick.
            if let Err(e) = driver.run_cycle().await {
                tracing::error!(error = %e, "Poll cycle failed");
            }
        }
    } else {
        let report = driver.run_cycle().await?;
        println!(
            "Cycle complete: {} transcribed, {} advanced, {} failed, {} skipped",
            report.transcribed(),
            report.advanced(),
            report.failed(),
            report.skipped()
        );
        Ok(())
    }
}

fn migrate() -> Result<(), Box<dyn std::error::Error>> {
    let pool = establish_pool()?;
    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;
    println!("Migrations applied");
    Ok(())
}
