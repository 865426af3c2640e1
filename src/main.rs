use loganything::{
    ai::{GeminiBackend, GenerativeBackend},
    auth::TokenConfig,
    build_router,
    logs::{
        repository::{InMemoryLogRepository, LogRepository, PostgresLogRepository},
        upload::UploadStore,
    },
    user::repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository},
    AppConfig, AppState,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Repositories = (
    Arc<dyn UserRepository + Send + Sync>,
    Arc<dyn LogRepository + Send + Sync>,
);

async fn repositories(database_url: Option<&str>) -> Result<Repositories, Box<dyn std::error::Error>> {
    match database_url {
        Some(url) => {
            let pool = sqlx::PgPool::connect(url).await?;
            sqlx::migrate!().run(&pool).await?;
            info!("Connected to PostgreSQL and applied migrations");
            let users: Arc<dyn UserRepository + Send + Sync> =
                Arc::new(PostgresUserRepository::new(pool.clone()));
            let logs: Arc<dyn LogRepository + Send + Sync> =
                Arc::new(PostgresLogRepository::new(pool));
            Ok((users, logs))
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory repositories");
            let users: Arc<dyn UserRepository + Send + Sync> =
                Arc::new(InMemoryUserRepository::new());
            let logs: Arc<dyn LogRepository + Send + Sync> = Arc::new(InMemoryLogRepository::new());
            Ok((users, logs))
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    let (user_repository, log_repository) = repositories(config.database_url.as_deref()).await?;

    let uploads = UploadStore::new(config.upload_dir.clone());
    uploads.ensure_dir().await?;

    let ai_backend: Option<Arc<dyn GenerativeBackend + Send + Sync>> = match &config.gemini {
        Some(gemini) => {
            info!(model = %gemini.model, "AI chat enabled");
            Some(Arc::new(GeminiBackend::new(gemini)?))
        }
        None => {
            warn!("GEMINI_API_KEY not set, /ai/chat will report it as unconfigured");
            None
        }
    };

    let app_state = AppState::new(
        user_repository,
        log_repository,
        TokenConfig::new(config.jwt_secret.clone(), config.token_ttl_minutes),
        uploads,
        ai_backend,
    );
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Server running on http://localhost:{}", config.port);
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // A missing .env is fine; real environment variables still apply
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loganything=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting LogAnything API server");

    if let Err(e) = run().await {
        error!(error = %e, "Server stopped");
        std::process::exit(1);
    }
}
