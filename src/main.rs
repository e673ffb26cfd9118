use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use sponsor_match::config::Settings;
use sponsor_match::core::Matcher;
use sponsor_match::models::ScoringWeights;
use sponsor_match::routes::{self, AppState};
use sponsor_match::services::{
    CacheManager, MatchCache, MemoryStore, PostgresClient, RecordSource, RetryPolicy, ScoringService, Store,
    SupabaseClient, SupabaseTables,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Query payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(level: &str, format: &str) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match format {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.json().init(),
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting sponsor matching service...");

    // Record source for events and sponsors
    let tables = SupabaseTables {
        events: settings.supabase.events_table.clone(),
        sponsors: settings.supabase.sponsors_table.clone(),
    };
    let source: Arc<dyn RecordSource> = Arc::new(
        SupabaseClient::new(
            settings.supabase.url.clone(),
            settings.supabase.service_key.clone(),
            tables,
            Duration::from_secs(settings.supabase.timeout_secs),
        )
        .map_err(|e| startup_error("Failed to build Supabase client", e))?,
    );

    info!("Supabase client initialized ({})", settings.supabase.url);

    // Match, application and bookmark store
    let store: Arc<dyn Store> = match &settings.database.url {
        Some(url) => {
            let postgres = PostgresClient::from_settings(
                url,
                settings.database.max_connections,
                settings.database.min_connections,
                settings.database.acquire_timeout_secs,
                settings.database.idle_timeout_secs,
            )
            .await
            .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;
            info!("PostgreSQL store initialized");
            Arc::new(postgres)
        }
        None => {
            warn!("No database configured, keeping records in memory");
            Arc::new(MemoryStore::new())
        }
    };

    // Cache manager (optional - app works without it)
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache: Option<Arc<dyn MatchCache>> = match &settings.cache.redis_url {
        Some(redis_url) => match CacheManager::new(redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
                Some(Arc::new(c))
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running without cache", e);
                None
            }
        },
        None => None,
    };

    let weights = ScoringWeights::from(&settings.scoring.weights);
    let matcher = Matcher::new(weights)
        .with_featured_threshold(settings.scoring.featured_threshold)
        .with_min_profile_completion(settings.scoring.min_profile_completion);

    info!(
        "Matcher initialized with weights: {:?}, featured at {}, min completion {}%",
        weights,
        matcher.featured_threshold(),
        matcher.min_profile_completion()
    );

    let scoring = Arc::new(ScoringService::new(
        source,
        store.clone(),
        cache.clone(),
        matcher,
        RetryPolicy::from(&settings.retry),
    ));

    let app_state = AppState {
        store,
        cache,
        scoring,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
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
