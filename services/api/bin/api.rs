//! Main Entrypoint for the Spotter API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing the SQLite pool and running migrations.
//! 3. Wiring the coaching capabilities for the configured provider.
//! 4. Constructing the coach service and the Axum router.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use sqlx::SqlitePool;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use spotter_api::{
    config::{Config, Provider},
    db::Db,
    router::create_router,
    state::AppState,
};
use spotter_core::{
    Capabilities, CoachService,
    analysis::CannedVisionAnalyzer,
    llm::OpenAiResponder,
    responder::{CannedResponder, CoachResponder},
    speech::SimulatedTranscriber,
    workout::TemplateWorkoutPlanner,
};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Settings Storage ---
    let pool = SqlitePool::connect(&config.database_url)
        .await
        .context("Failed to open settings database")?;
    let db = Arc::new(Db::new(pool));
    db.run_migrations().await?;
    info!("Settings database ready and migrations are up-to-date.");

    // --- 4. Wire Capabilities and Build the Service ---
    let responder: Arc<dyn CoachResponder> = match &config.provider {
        Provider::Canned => {
            info!("Using canned coaching responder.");
            Arc::new(CannedResponder::new())
        }
        Provider::OpenAi => {
            info!("Using OpenAI coaching responder.");
            let api_key = config
                .openai_api_key
                .as_ref()
                .context("OPENAI_API_KEY must be set for 'openai' provider")?;
            let openai_config = OpenAIConfig::new().with_api_key(api_key);
            Arc::new(OpenAiResponder::new(openai_config, config.chat_model.clone()))
        }
    };

    let service = Arc::new(CoachService::new(
        Capabilities {
            kv: db.clone(),
            responder,
            analyzer: Arc::new(CannedVisionAnalyzer),
            planner: Arc::new(TemplateWorkoutPlanner),
            transcriber: Arc::new(SimulatedTranscriber::new()),
        },
        config.max_sessions,
    ));
    service
        .initialize()
        .await
        .context("Failed to initialize coach service")?;

    let app_state = AppState {
        service: service.clone(),
        config: Arc::new(config.clone()),
    };

    // --- 5. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 6. Start Server ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        bind_address = %config.bind_address,
        max_sessions = config.max_sessions,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    let ended = service.cleanup().await;
    info!(sessions_ended = ended, "Server has shut down.");
    Ok(())
}
