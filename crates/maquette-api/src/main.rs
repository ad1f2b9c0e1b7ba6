use std::sync::Arc;

use maquette_engine::{AgentRegistry, MockupEngine};
use maquette_types::AgentDefinition;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use maquette_api::{app::build_router, config::Config, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Maquette API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);
    if !config.auth.required {
        tracing::warn!("Auth disabled: requests will not require a bearer token");
    }

    let agents = build_agents();
    tracing::info!("Registered {} agent(s)", agents.len());

    let state = Arc::new(AppState::new(config.clone(), agents));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_agents() -> AgentRegistry {
    AgentRegistry::new().register(
        AgentDefinition::new(
            "mockup",
            "Mockup Studio",
            "Extracts a project brief from your description and drafts a static website mockup",
            "You are a website mockup assistant. Extract the project brief, then render a static \
             HTML/CSS mockup and summarize what you built.",
        ),
        Arc::new(MockupEngine::new()),
    )
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
