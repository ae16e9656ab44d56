use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use swipe_engine::config::{LoggingSettings, Settings, StorageBackend};
use swipe_engine::core::{DiscoveryLimits, DiscoveryPlanner, SwipeOrchestrator};
use swipe_engine::routes::{self, AppState, TokenVerifier};
use swipe_engine::services::{
    CandidateIndex, ElasticsearchClient, InMemoryStore, MatchStore, PostgresClient,
    PreferenceLedger, StoreError,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

type Adapters = (
    Arc<dyn PreferenceLedger>,
    Arc<dyn MatchStore>,
    Arc<dyn CandidateIndex>,
);

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.init(),
    }
}

async fn build_adapters(settings: &Settings) -> Result<Adapters, StoreError> {
    match settings.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; swipes and matches are lost on restart");
            let store = Arc::new(InMemoryStore::new());
            match &settings.storage.seed_users {
                Some(path) => {
                    let loaded = store.load_users(path)?;
                    info!("Loaded {} candidate users from {}", loaded, path.display());
                }
                None => warn!("No storage.seed_users configured; discovery will return no candidates"),
            }
            let ledger: Arc<dyn PreferenceLedger> = store.clone();
            let matches: Arc<dyn MatchStore> = store.clone();
            let index: Arc<dyn CandidateIndex> = store;
            Ok((ledger, matches, index))
        }
        StorageBackend::Postgres => {
            let db = &settings.database;
            let postgres = Arc::new(
                PostgresClient::from_settings(
                    &db.url,
                    db.max_connections,
                    db.min_connections,
                    db.acquire_timeout_secs,
                    db.idle_timeout_secs,
                )
                .await?,
            );
            if !postgres.health_check().await? {
                return Err(StoreError::Unavailable("database health check failed".to_string()));
            }
            info!(
                "PostgreSQL client initialized (max: {} connections)",
                db.max_connections.unwrap_or(10)
            );

            let index: Arc<dyn CandidateIndex> = Arc::new(ElasticsearchClient::new(
                settings.index.url.clone(),
                settings.index.name.clone(),
                Duration::from_secs(settings.index.timeout_secs.unwrap_or(10)),
            )?);
            info!("Candidate index client initialized ({})", settings.index.name);

            let ledger: Arc<dyn PreferenceLedger> = postgres.clone();
            let matches: Arc<dyn MatchStore> = postgres;
            Ok((ledger, matches, index))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    init_logging(&settings.logging);

    info!("Starting swipe engine...");

    let (ledger, matches, index) = build_adapters(&settings).await.map_err(|e| {
        error!("Failed to initialize storage: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    let limits = DiscoveryLimits::from(&settings.discovery);

    let app_state = AppState {
        swipes: SwipeOrchestrator::new(ledger.clone(), matches),
        discovery: DiscoveryPlanner::with_limits(ledger, index, limits),
        tokens: TokenVerifier::new(&settings.auth.jwt_secret),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
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
