//! StudyHub API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Form actions for notes, books, summaries and important questions
//! - Course content and study tools
//! - Rate limiting of the model-backed endpoints
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;
#[cfg(test)]
mod tests;

use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::any::Any;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use studyhub_common::{
    config::{AppConfig, ObservabilityConfig},
    content::ContentCatalog,
    db::{self, DocumentStore},
    errors::AppError,
    llm,
    metrics::{self, LATENCY_BUCKETS, METRICS_PREFIX, MODEL_BUCKETS},
    services::Services,
    storage::{self, BlobStore},
};
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::middleware::{metrics::track_metrics, rate_limit_middleware, ModelRateLimit};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Services,
    pub content: Arc<ContentCatalog>,
    pub store: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub rate_limit: ModelRateLimit,
}

impl AppState {
    /// Connect every collaborator named by the configuration
    pub async fn build(config: AppConfig) -> anyhow::Result<Self> {
        let store = db::create_store(&config.database).await?;
        let blobs = storage::create_blob_store(&config.storage).await?;
        let model = llm::create_model(&config.model)?;
        let content = ContentCatalog::load(config.content.path.as_deref()).await?;

        info!(
            documents = store.backend(),
            blobs = blobs.backend(),
            model = model.model_name(),
            "Collaborators ready"
        );

        Ok(Self::from_parts(config, store, blobs, model, content))
    }

    pub fn from_parts(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        model: Arc<dyn llm::LanguageModel>,
        content: ContentCatalog,
    ) -> Self {
        Self {
            rate_limit: ModelRateLimit::from_config(&config.rate_limit),
            services: Services::new(store.clone(), blobs.clone(), model),
            content: Arc::new(content),
            config: Arc::new(config),
            store,
            blobs,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    init_tracing(&config.observability);
    info!("Starting StudyHub API Gateway v{}", studyhub_common::VERSION);

    install_metrics_exporter(&config.observability)?;
    metrics::register_metrics();

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let shutdown_timeout = config.shutdown_timeout();

    let state = AppState::build(config).await?;
    let app = create_router(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();
    tokio::select! {
        result = server => result?,
        _ = async {
            shutdown_signal().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => tracing::warn!("Shutdown timeout elapsed, dropping open connections"),
    }

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn install_metrics_exporter(config: &ObservabilityConfig) -> anyhow::Result<()> {
    if config.metrics_port == 0 {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.metrics_port))
        .add_global_label("service", config.service_name.clone())
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_request_duration_seconds", METRICS_PREFIX)),
            LATENCY_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_model_duration_seconds", METRICS_PREFIX)),
            MODEL_BUCKETS,
        )?
        .install()?;

    info!(port = config.metrics_port, "Metrics exporter listening");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Model-backed actions share one limiter
    let model_routes = Router::new()
        .route("/summarize", post(handlers::summarize::summarize_notes))
        .route("/important-questions", post(handlers::questions::identify_questions))
        .route_layer(axum::middleware::from_fn_with_state(
            state.rate_limit.clone(),
            rate_limit_middleware,
        ));

    let api_routes = Router::new()
        // Notes gallery
        .route(
            "/notes",
            get(handlers::notes::list_notes).post(handlers::notes::add_note),
        )
        // Book catalog
        .route(
            "/books",
            get(handlers::books::list_books).post(handlers::books::add_book),
        )
        // Course content
        .route("/syllabus", get(handlers::content::list_syllabus))
        .route("/syllabus/{id}", get(handlers::content::get_subject))
        .route("/quizzes", get(handlers::content::list_quizzes))
        .route("/quizzes/{subject}", get(handlers::content::get_quiz))
        .route("/quizzes/{subject}/grade", post(handlers::content::grade))
        .route("/resources", get(handlers::content::list_resources))
        .route("/faqs", get(handlers::content::list_faqs))
        .route("/chapter-notes", get(handlers::content::list_chapter_notes))
        // Tools
        .route("/tools/timetable", post(handlers::tools::generate_timetable))
        .merge(model_routes);

    let mut app = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/api", api_routes);

    // Uploaded files are served back from the local blob root
    if state.config.storage.backend == "local" {
        app = app.nest_service(
            &state.config.storage.route_prefix,
            ServeDir::new(&state.config.storage.root_dir),
        );
    }

    let body_limit = state.config.server.max_upload_bytes;

    // Compose the app
    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(track_metrics))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    AppError::Internal {
        message: format!("handler panicked: {}", detail),
    }
    .into_response()
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
