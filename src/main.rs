//! Promptwise server binary.
//!
//! Wires configuration, the generation provider, the optional prompt log and
//! the dialogue engine into the HTTP chat API.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::EnvFilter;

use promptwise::adapters::ai::{OpenAIConfig, OpenAIProvider, RetryPolicy, RetryingProvider};
use promptwise::adapters::http::{app_router, ChatAppState};
use promptwise::adapters::postgres::PostgresPromptLog;
use promptwise::application::{DialogueEngine, GenerationSettings};
use promptwise::config::{AiConfig, AppConfig, LogConfig, LogFormat};
use promptwise::ports::{AIProvider, PromptLog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.server.log);
    config.validate()?;

    tracing::info!(
        log_format = ?config.server.log.format,
        model = %config.ai.model,
        persistence = config.database.is_enabled(),
        "Starting promptwise"
    );

    let catalog = Arc::new(config.catalog.load()?);
    tracing::info!(modes = catalog.len(), "Mode catalog loaded");

    let provider = build_provider(&config.ai)?;
    let settings = GenerationSettings {
        temperature: None,
        max_tokens: config.ai.max_tokens,
    };

    let mut engine = DialogueEngine::new(provider, catalog)
        .with_delivery_policy(config.delivery.policy()?)
        .with_stream_deadline(config.ai.stream_deadline())
        .with_generation_settings(settings)
        .with_idle_timeout(config.sessions.idle_timeout());

    if let Some(log) = build_prompt_log(&config).await? {
        engine = engine.with_prompt_log(log);
    }

    let engine = Arc::new(engine);
    spawn_idle_sweeper(engine.clone());

    let app = app_router(ChatAppState::new(engine))
        .layer(TimeoutLayer::new(config.server.request_timeout()));

    let addr = config.server.bind;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// `RUST_LOG` overrides the configured filter.
fn init_tracing(log: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));

    match log.format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Sweeps abandoned conversations once per idle period.
fn spawn_idle_sweeper(engine: Arc<DialogueEngine>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(engine.idle_timeout());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            engine.evict_idle_sessions().await;
        }
    });
}

fn build_provider(ai: &AiConfig) -> anyhow::Result<Arc<dyn AIProvider>> {
    let mut openai = OpenAIConfig::new(ai.api_key.clone().unwrap_or_default())
        .with_model(ai.model.clone())
        .with_base_url(ai.base_url.clone())
        .with_timeout(ai.timeout());
    if let Some(temperature) = ai.temperature {
        openai = openai.with_temperature(temperature);
    }

    let policy = RetryPolicy::new(ai.max_retries, ai.retry_base_delay());
    let provider = RetryingProvider::new(OpenAIProvider::new(openai)?).with_policy(policy);
    Ok(Arc::new(provider))
}

async fn build_prompt_log(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn PromptLog>>> {
    let Some(url) = config.database.url() else {
        tracing::warn!("No database configured, conversations will not be recorded");
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(url)
        .await?;

    let log = PostgresPromptLog::new(pool);
    if config.database.run_migrations {
        log.migrate().await?;
        tracing::info!("Database migrations applied");
    }

    Ok(Some(Arc::new(log)))
}
