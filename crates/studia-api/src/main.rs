//! studia-api server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use studia_api::{router, AppState, ServerConfig};
use studia_core::{defaults, logging, ExtractionConfig, ObjectStorage};
use studia_db::{
    connect_service_writer, Database, FilesystemBackend, PoolConfig, SupabaseStorageBackend,
};
use studia_extract::{ExtractionRegistry, ExtractionService};
use studia_inference::{OpenAIBackend, SupabaseAuth};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init("studia_api=debug,studia_extract=debug,tower_http=debug");

    let server = ServerConfig::from_env();
    let extraction_config = ExtractionConfig::from_env();

    // Caller-scoped pool: ownership reads only
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| defaults::DATABASE_URL.to_string());
    info!(subsystem = "database", "Connecting to database");
    let db = Database::connect_with_config(&database_url, PoolConfig::from_env()).await?;
    db.migrate().await?;

    // Service-privileged pool: content writes only
    let service_url = match std::env::var("SERVICE_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            warn!(
                subsystem = "database",
                "SERVICE_DATABASE_URL not set, content writer shares DATABASE_URL credentials"
            );
            database_url.clone()
        }
    };
    let writer = connect_service_writer(&service_url).await?;

    let storage: Arc<dyn ObjectStorage> =
        match std::env::var("STORAGE_BACKEND").as_deref().unwrap_or("supabase") {
            "filesystem" => {
                let path = std::env::var("STORAGE_PATH")
                    .unwrap_or_else(|_| defaults::STORAGE_PATH.to_string());
                let backend = FilesystemBackend::new(path)
                    .with_max_object_bytes(extraction_config.max_file_bytes);
                if let Err(e) = backend.validate().await {
                    warn!(subsystem = "storage", error = %e, "Filesystem storage not ready");
                }
                Arc::new(backend)
            }
            "supabase" => Arc::new(
                SupabaseStorageBackend::from_env()?
                    .with_max_object_bytes(extraction_config.max_file_bytes),
            ),
            other => anyhow::bail!("Unknown STORAGE_BACKEND '{}'", other),
        };
    info!(subsystem = "storage", backend = storage.name(), "Object storage ready");

    let ocr = Arc::new(OpenAIBackend::from_env()?);
    let registry = Arc::new(ExtractionRegistry::standard(ocr));
    for (strategy, healthy) in registry.health_check_all().await {
        if healthy {
            info!(strategy = strategy.as_str(), "Extraction adapter ready");
        } else {
            warn!(strategy = strategy.as_str(), "Extraction adapter unavailable at startup");
        }
    }
    let extraction = Arc::new(ExtractionService::new(
        Arc::new(db.materials.clone()),
        storage,
        Arc::new(writer),
        registry,
        extraction_config,
    ));
    let identity = Arc::new(SupabaseAuth::from_env()?);

    let mut state = AppState::new(extraction, identity);
    if server.rate_limit_enabled {
        state = state.with_rate_limit(server.rate_limit_requests, server.rate_limit_period_secs);
        info!(
            requests = server.rate_limit_requests,
            period_secs = server.rate_limit_period_secs,
            "Rate limiting enabled"
        );
    }

    let app = router(state, server.allowed_origins.clone());

    let addr: SocketAddr = format!("{}:{}", server.host, server.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
