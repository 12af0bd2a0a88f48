//! pagelift-api — server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagelift_api::config::ApiConfig;
use pagelift_api::state::{lead_capture_limiter, AppState, OAuthStateStore};
use pagelift_connect::{
    Ga4DataClient, GoogleOAuthClient, GoogleOAuthConfig, LinkedInClient, LinkedInConfig,
    SearchConsoleClient, WordPressClient, WordPressConfig,
};
use pagelift_db::{create_pool_with_config, Database, FilesystemBackend, PoolConfig};

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // File logging is opt-in via PAGELIFT_LOG_DIR; stdout is always on.
    match std::env::var("PAGELIFT_LOG_DIR") {
        Ok(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "pagelift-api.log");
            registry
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(file_appender),
                )
                .init();
        }
        Err(_) => {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::from_env()?;

    let pool = create_pool_with_config(&config.database_url, PoolConfig::default()).await?;
    let db = Database::new(pool).with_filesystem_storage(&config.upload_dir);

    // Catch storage problems at boot, not on the first upload.
    let storage_check = FilesystemBackend::new(&config.upload_dir).validate().await;
    if let Err(e) = storage_check {
        anyhow::bail!("upload storage validation failed: {}", e);
    }

    let google = GoogleOAuthConfig::from_env().map(|c| Arc::new(GoogleOAuthClient::new(c)));
    let linkedin = LinkedInConfig::from_env().map(|c| Arc::new(LinkedInClient::new(c)));
    let wordpress = WordPressConfig::from_env().map(|c| Arc::new(WordPressClient::new(c)));

    info!(
        subsystem = "api",
        component = "server",
        op = "startup",
        google_configured = google.is_some(),
        linkedin_configured = linkedin.is_some(),
        wordpress_configured = wordpress.is_some(),
        "Integrations configured"
    );

    let bind_addr = config.bind_addr;
    let state = AppState {
        db: Arc::new(db),
        config: Arc::new(config),
        google,
        search_console: Arc::new(SearchConsoleClient::new()),
        ga4: Arc::new(Ga4DataClient::new()),
        linkedin,
        wordpress,
        oauth_states: OAuthStateStore::new(),
        lead_limiter: Some(lead_capture_limiter()),
    };

    let app = pagelift_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(
        subsystem = "api",
        component = "server",
        op = "listen",
        addr = %bind_addr,
        "pagelift API listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!(
        subsystem = "api",
        component = "server",
        op = "shutdown",
        "Shutdown signal received"
    );
}
