use std::sync::Arc;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nextread_api::{
    config::{Config, RecordSourceConfig},
    db::{create_pool, create_redis_client, run_migrations, Cache, CacheWriterHandle, PgStore},
    routes::{create_router, AppState},
    services::{
        providers::{CandidatePoolFile, CandidateProvider, GoogleBooksProvider, StaticCandidatePool},
        sources::{GoogleSheetsSource, JsonFileSource, RecordSource},
        RecommendationPipeline, ScoringEngine,
    },
};

#[derive(Debug, Parser)]
#[command(name = "nextread", version, about = "Daily next-book recommendations from a reading log")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Serve the HTTP API (default)")]
    Serve,
    #[command(about = "Run the pipeline once and store the pick")]
    Run {
        #[arg(long, help = "Date to store the pick under (YYYY-MM-DD, defaults to today UTC)")]
        date: Option<NaiveDate>,
        #[arg(long, help = "Print the report without writing to the database")]
        dry_run: bool,
    },
    #[command(about = "Apply pending database migrations")]
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("nextread_api=info,nextread=info,tower_http=info")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()
        .inspect_err(|e| tracing::error!(error = %e, "Failed to load configuration"))?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => {
            let pool = create_pool(&config.database_url).await?;
            run_migrations(&pool).await?;
        }
        Command::Run { date, dry_run } => {
            let (pipeline, cache_handle) = build_pipeline(&config)?;
            let date = date.unwrap_or_else(|| Utc::now().date_naive());

            let report = if dry_run {
                pipeline.run(date).await?.report
            } else {
                let pool = create_pool(&config.database_url).await?;
                run_migrations(&pool).await?;
                pipeline.run_and_store(&PgStore::new(pool), date).await?
            };

            println!("{}", serde_json::to_string_pretty(&report)?);
            shutdown_cache(cache_handle).await;
        }
        Command::Serve => {
            let pool = create_pool(&config.database_url).await?;
            run_migrations(&pool).await?;
            let (pipeline, cache_handle) = build_pipeline(&config)?;

            let state = AppState::new(Arc::new(PgStore::new(pool)), pipeline);
            let app = create_router(state);

            let addr = format!("{}:{}", config.host, config.port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Listening on http://{}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            shutdown_cache(cache_handle).await;
        }
    }

    Ok(())
}

/// Wires the configured collaborators into a pipeline
///
/// The cache writer handle is returned when metadata enrichment is enabled.
fn build_pipeline(
    config: &Config,
) -> anyhow::Result<(RecommendationPipeline, Option<CacheWriterHandle>)> {
    let engine = ScoringEngine::new(config.scoring_weights()?);

    let records: Arc<dyn RecordSource> = match config.record_source()? {
        RecordSourceConfig::GoogleSheets {
            sheet_id,
            range,
            api_key,
        } => Arc::new(GoogleSheetsSource::new(
            config.sheets_api_url.clone(),
            api_key,
            sheet_id,
            range,
        )),
        RecordSourceConfig::JsonFile(path) => Arc::new(JsonFileSource::new(path)),
    };

    let candidates: Arc<dyn CandidateProvider> = match &config.candidate_pool_path {
        Some(path) => Arc::new(CandidatePoolFile::new(path)),
        None => Arc::new(StaticCandidatePool::curated()),
    };

    let pipeline = RecommendationPipeline::new(records, candidates, engine);

    if !config.enrich_metadata {
        return Ok((pipeline, None));
    }

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, handle) = Cache::new(redis_client);
    let books = GoogleBooksProvider::new(
        cache,
        config.google_api_key.clone(),
        config.books_api_url.clone(),
    );

    Ok((pipeline.with_metadata(Arc::new(books)), Some(handle)))
}

async fn shutdown_cache(handle: Option<CacheWriterHandle>) {
    if let Some(handle) = handle {
        handle.shutdown().await;
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
