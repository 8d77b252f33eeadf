//! Event Engine Binary
//!
//! Starts the market-event reconciliation engine and its HTTP surface.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p event-engine
//! ```
//!
//! # Environment Variables
//!
//! - `EVENT_ENGINE_CONFIG`: Config file path (default: config.yaml, optional)
//! - `MARKET_DATA_API_KEY`: Live feed API key (interpolated into config)
//! - `RUST_LOG`: Log filter (default: configured logging level)

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

use event_engine::application::use_cases::{
    ApplyOverlayUseCase, IngestEventsUseCase, QueryEventsUseCase,
};
use event_engine::config::{Config, ConfigError, load_config};
use event_engine::infrastructure::calendar::CsvMacroCalendar;
use event_engine::infrastructure::http::{AppState, create_router};
use event_engine::infrastructure::marketdata::{
    ApiCorporateActionsSource, ApiInstrumentDirectory, ApiMacroCalendar, MarketDataHttpClient,
};
use event_engine::infrastructure::persistence::SqliteEventStore;
use event_engine::telemetry;

/// Concrete type alias for the ingestion use case.
type ConcreteIngestUseCase = IngestEventsUseCase<
    ApiInstrumentDirectory,
    ApiMacroCalendar,
    CsvMacroCalendar,
    ApiCorporateActionsSource,
    SqliteEventStore,
>;

/// Concrete type alias for the query use case.
type ConcreteQueryUseCase = QueryEventsUseCase<
    ApiInstrumentDirectory,
    ApiMacroCalendar,
    CsvMacroCalendar,
    ApiCorporateActionsSource,
    SqliteEventStore,
>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config = load_engine_config()?;
    telemetry::init_tracing(&config.observability.logging);

    tracing::info!("Starting event engine");
    log_config(&config);

    let store = Arc::new(SqliteEventStore::connect(&config.persistence.database_url).await?);
    let (ingest, query, overlay) = create_use_cases(&config, Arc::clone(&store))?;

    let state = AppState {
        query_events: query,
        ingest_events: ingest,
        apply_overlay: overlay,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let router = create_router(state);

    let addr: SocketAddr =
        format!("{}:{}", config.server.bind_address, config.server.http_port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(address = %addr, "event engine ready");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("event engine stopped");
    Ok(())
}

/// Load .env from the working directory, if present.
fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Load configuration.
///
/// An explicit `EVENT_ENGINE_CONFIG` path must load; an absent default
/// `config.yaml` silently falls back to built-in defaults.
fn load_engine_config() -> Result<Config, ConfigError> {
    if let Ok(path) = std::env::var("EVENT_ENGINE_CONFIG") {
        return load_config(Some(&path));
    }
    if std::path::Path::new("config.yaml").exists() {
        return load_config(None);
    }
    Ok(Config::default())
}

/// Log the effective (non-secret) configuration.
fn log_config(config: &Config) {
    tracing::info!(
        http_port = config.server.http_port,
        database_url = %config.persistence.database_url,
        universe = config.feeds.universe.len(),
        max_concurrent_instruments = config.feeds.max_concurrent_instruments,
        calendar_extract = config.calendar.path.as_deref().unwrap_or("<none>"),
        "configuration loaded"
    );

    if config.feeds.api_key.is_empty() {
        tracing::warn!(
            "no market-data API key configured; live feeds will degrade to empty results"
        );
    }
}

/// Wire adapters into the application use cases.
#[allow(clippy::type_complexity)]
fn create_use_cases(
    config: &Config,
    store: Arc<SqliteEventStore>,
) -> anyhow::Result<(
    Arc<ConcreteIngestUseCase>,
    Arc<ConcreteQueryUseCase>,
    Arc<ApplyOverlayUseCase<SqliteEventStore>>,
)> {
    let client = Arc::new(MarketDataHttpClient::new(&config.feeds)?);

    let directory = Arc::new(ApiInstrumentDirectory::new(
        Arc::clone(&client),
        &config.feeds.universe,
    ));
    let macro_live = Arc::new(ApiMacroCalendar::new(Arc::clone(&client)));
    let macro_fallback = config
        .calendar
        .path
        .as_ref()
        .map(|path| Arc::new(CsvMacroCalendar::new(path)));
    let corporate_actions = Arc::new(ApiCorporateActionsSource::new(client));

    let ingest = Arc::new(IngestEventsUseCase::new(
        directory,
        macro_live,
        macro_fallback,
        corporate_actions,
        Arc::clone(&store),
        config.feeds.max_concurrent_instruments,
    ));
    let query = Arc::new(QueryEventsUseCase::new(
        Arc::clone(&store),
        Arc::clone(&ingest),
    ));
    let overlay = Arc::new(ApplyOverlayUseCase::new(store));

    Ok((ingest, query, overlay))
}

/// Resolve when the process receives a shutdown signal.
async fn shutdown_signal() {
    if let Err(error) = signal::ctrl_c().await {
        tracing::warn!(error = %error, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
