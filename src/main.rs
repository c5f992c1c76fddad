use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tripmate::config::{LoggingSettings, Settings, StorageBackend};
use tripmate::core::Matcher;
use tripmate::routes::{self, AppState};
use tripmate::services::{
    CacheManager, MemoryStore, PlanStore, PostgresClient, SessionManager, UploadStore, UserStore,
};

/// Initialize the tracing subscriber
///
/// `RUST_LOG` wins over the configured level; `LOG_FORMAT` over the
/// configured format (`json`, `pretty`, anything else is compact text).
fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match format.as_str() {
        "json" => subscriber.json().init(),
        "pretty" => subscriber.pretty().init(),
        _ => subscriber.init(),
    }
}

fn startup_error(message: String) -> std::io::Error {
    error!("{}", message);
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("Configuration error: {}", e))
    })?;

    init_logging(&settings.logging);

    info!("Starting Tripmate service...");

    // Initialize the record stores
    let (users, plans): (Arc<dyn UserStore>, Arc<dyn PlanStore>) = match settings.database.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage, records will not survive a restart");
            let store = Arc::new(MemoryStore::new());
            let users: Arc<dyn UserStore> = store.clone();
            let plans: Arc<dyn PlanStore> = store;
            (users, plans)
        }
        StorageBackend::Postgres => {
            let url = settings
                .database
                .url
                .as_deref()
                .ok_or_else(|| startup_error("database.url is required for the postgres backend".to_string()))?;

            let postgres = Arc::new(
                PostgresClient::from_settings(
                    url,
                    settings.database.max_connections,
                    settings.database.min_connections,
                    settings.database.acquire_timeout_secs,
                    settings.database.idle_timeout_secs,
                )
                .await
                .map_err(|e| startup_error(format!("Failed to connect to PostgreSQL: {}", e)))?,
            );

            info!(
                "PostgreSQL client initialized (max: {} connections)",
                settings.database.max_connections.unwrap_or(10)
            );

            let users: Arc<dyn UserStore> = postgres.clone();
            let plans: Arc<dyn PlanStore> = postgres;
            (users, plans)
        }
    };

    // Initialize cache manager (Redis is optional - L1 works on its own)
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match settings.cache.redis_url.as_deref() {
        Some(redis_url) => match CacheManager::new(redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized (L1: {} entries, L2: {}, TTL: {}s)", l1_cache_size, c.has_l2(), cache_ttl);
                c
            }
            Err(e) => {
                error!("Failed to connect to Redis ({}), running with L1 cache only", e);
                CacheManager::in_memory(l1_cache_size, cache_ttl)
            }
        },
        None => {
            info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            CacheManager::in_memory(l1_cache_size, cache_ttl)
        }
    };

    let sessions = SessionManager::new(
        &settings.session.secret,
        &settings.session.issuer,
        settings.session.ttl_secs,
    );

    let uploads = UploadStore::new(
        &settings.uploads.dir,
        &settings.uploads.public_prefix,
        settings.uploads.max_bytes,
    );

    let matcher = Matcher::new(settings.matching.default_count, settings.matching.max_count);

    info!("Matcher initialized: {:?}", matcher);

    // Build application state
    let app_state = AppState {
        users,
        plans,
        cache: Arc::new(cache),
        sessions: Arc::new(sessions),
        uploads: Arc::new(uploads),
        matcher,
        bcrypt_cost: settings.session.bcrypt_cost,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);
    let max_upload_bytes = settings.uploads.max_bytes;

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .app_data(routes::payload_config(max_upload_bytes))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
