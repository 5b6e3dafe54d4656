use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use video_gateway::config::Config;
use video_gateway::dispatcher::Dispatcher;
use video_gateway::paypal::PayPalClient;
use video_gateway::{catalog, handlers, middleware, AppState};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging().expect("Failed to initialize logging");

    // Read all configuration once; everything downstream gets it injected.
    let config = Config::from_env();

    let paypal = config
        .paypal
        .clone()
        .map(|pp| PayPalClient::new(pp, config.app_url.clone()));
    if paypal.is_some() {
        tracing::info!("💳 PayPal client initialized");
    }

    let dispatcher = Dispatcher::new(config.clone());
    tracing::info!(
        "🎬 Dispatcher ready with {} models across {} providers",
        catalog::models().len(),
        catalog::PROVIDERS.len()
    );

    let port = config.port;
    let shared_state = Arc::new(AppState {
        dispatcher,
        paypal,
        config,
    });

    // Build our application with all routes and shared state
    let app = Router::new()
        .merge(handlers::video::video_routes())
        .merge(handlers::paypal::paypal_routes())
        .route("/api/status", axum::routing::get(api_status))
        .layer(axum::middleware::from_fn(
            middleware::logging::request_logging_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(Extension(shared_state));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("Failed to bind server port");
    tracing::info!(
        "listening on {}",
        listener.local_addr().expect("listener has no local addr")
    );
    axum::serve(listener, app).await.expect("server error");
}

// Production-grade logging configuration
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,video_gateway=trace,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,video_gateway=info,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    // JSON logging for log aggregation, human-readable for development
    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("🎬 Video Gateway starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Build mode: {}",
        if cfg!(debug_assertions) {
            "development"
        } else {
            "production"
        }
    );
    tracing::info!("Log level: {}", log_level);

    Ok(())
}

// API Status endpoint
async fn api_status(
    Extension(state): Extension<Arc<AppState>>,
) -> axum::response::Json<serde_json::Value> {
    use serde_json::json;

    let providers: serde_json::Map<String, serde_json::Value> = catalog::PROVIDERS
        .iter()
        .map(|p| {
            let status = if state.config.api_key_for(p.id).is_some() {
                "configured"
            } else {
                "not_configured"
            };
            (p.id.to_string(), json!(status))
        })
        .collect();

    axum::response::Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": providers,
        "payments": {
            "paypal": if state.paypal.is_some() { "configured" } else { "not_configured" }
        },
        "models": catalog::models().len(),
        "endpoints": {
            "generate": "/api/video/generate",
            "models": "/api/video/models",
            "status": "/api/status",
            "paypal": "/api/paypal/*"
        }
    }))
}
