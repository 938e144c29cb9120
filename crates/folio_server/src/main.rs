use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use folio_core::fs::RealFileSystem;
use folio_core::site::Site;
use folio_server::{AppState, config::Config, handlers::api_routes};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing (also captures `log` records from folio_core)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "folio_server=debug,folio_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting Folio Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Site root: {:?}", config.site_root);
    info!("CORS origins: {:?}", config.cors_origins);

    let site = match Site::open(
        RealFileSystem,
        &config.site_root,
        config.site_config.as_deref(),
    ) {
        Ok(site) => site,
        Err(e) => {
            error!("Failed to open site: {}", e);
            std::process::exit(1);
        }
    };
    info!("Content file: {:?}", site.content_store().path());
    info!("Media directory: {:?}", site.media_store().dir());

    let state = AppState::new(site);

    // Build CORS layer
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(origins);
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        cors
    };

    // Build the router
    let app = Router::new()
        .route("/", get(|| async { "Folio Server" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", api_routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Create listener
    let addr = config.server_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Server listening on http://{}", addr);

    // Run server with graceful shutdown
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server shut down gracefully");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
