use std::sync::Arc;

use aira::{
    config::AppConfig,
    credentials::CredentialStore,
    dispatch::PromptDispatcher,
    http::{self, AppState},
    static_files::StaticFiles,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// One request at a time: the dispatcher only holds read-only state.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    let credentials = CredentialStore::load(&config.credentials_path)?;
    if credentials.is_empty() {
        warn!(path = %config.credentials_path.display(), "credential file has no entries");
    } else {
        info!(providers = ?credentials.names(), "loaded API credentials");
    }

    let dispatcher = build_dispatcher(&config, &credentials)?;
    let static_files =
        StaticFiles::new(config.project_root.clone()).hide(&config.credentials_path);

    let app = http::router(AppState {
        dispatcher: Arc::new(dispatcher),
        static_files: Arc::new(static_files),
    });
    let listener = TcpListener::bind(config.http_bind).await?;
    info!("aira listening on {}", config.http_bind);
    info!(root = %config.project_root.display(), "serving static files");

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();
}

fn build_dispatcher(
    config: &AppConfig,
    credentials: &CredentialStore,
) -> anyhow::Result<PromptDispatcher> {
    match config.model_provider.to_lowercase().as_str() {
        "mock" => {
            warn!("MODEL_PROVIDER=mock; every provider answers with the mock echo");
            Ok(PromptDispatcher::mock())
        }
        "live" => PromptDispatcher::from_credentials(credentials, config),
        other => {
            warn!(
                provider = %other,
                "unknown MODEL_PROVIDER value; valid values are live|mock; falling back to live"
            );
            PromptDispatcher::from_credentials(credentials, config)
        }
    }
}
