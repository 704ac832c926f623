//! ClauseMatrix Server
//!
//! Analyzes uploaded legal PDFs with a text-generation API and compares
//! them side by side. Provides REST API endpoints for:
//!
//! - Single-document analysis with parsed sections
//! - Multi-document comparison matrix
//! - Role-specific follow-up questions
//! - Word and Excel export of results
//!
//! ## Architecture
//!
//! Uploads are parsed in memory and never persisted. Each batch runs
//! through a bounded worker pool with a per-document timeout, and the
//! comparison matrix is assembled once every document has finished.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use inference_client::{AnalysisRequester, ModelSettings, OpenAIBackend, RequesterConfig};
use shared_types::ErrorPolicy;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod pipeline;
mod upload;

use api::{
    handle_analyze, handle_ask, handle_compare, handle_export_docx, handle_export_matrix,
    handle_export_xlsx, handle_health, handle_list_roles, handle_list_sections,
};
use pipeline::PipelineConfig;

/// Command-line arguments for the ClauseMatrix server
#[derive(Parser, Debug)]
#[command(name = "clausematrix-server")]
#[command(about = "Legal PDF analysis and comparison server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Rate limit: requests per second per IP
    #[arg(long, env = "RATE_LIMIT", default_value = "10")]
    rate_limit: u32,

    /// Documents analyzed concurrently within one batch
    #[arg(long, env = "CONCURRENCY", default_value = "4")]
    concurrency: usize,

    /// Time limit for extracting and analyzing one document
    #[arg(long, env = "DOCUMENT_TIMEOUT_SECS", default_value = "180")]
    document_timeout_secs: u64,

    /// Maximum request body size in megabytes
    #[arg(long, env = "MAX_UPLOAD_MB", default_value = "50")]
    max_upload_mb: usize,

    /// Window size in characters for oversized documents
    #[arg(long, env = "CHUNK_CHARS", default_value = "16000")]
    chunk_chars: usize,

    /// Model tried first for every request
    #[arg(long, env = "PRIMARY_MODEL", default_value = "gpt-4o-mini")]
    primary_model: String,

    /// Model used once when the primary is rate limited or overloaded
    #[arg(long, env = "FALLBACK_MODEL", default_value = "gpt-3.5-turbo")]
    fallback_model: String,

    /// Batch behaviour on a failed document: best-effort or fail-fast
    #[arg(long, env = "ERROR_POLICY", default_value = "best-effort")]
    error_policy: ErrorPolicy,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub requester: AnalysisRequester,
    pub pipeline: PipelineConfig,
    /// Policy for uploads that do not name one
    pub default_policy: ErrorPolicy,
    pub max_upload_bytes: usize,
}

/// Routes and middleware shared by the binary and the tests.
/// Rate limiting is added in `main` since it needs the peer address.
fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // Metadata
        .route("/api/sections", get(handle_list_sections))
        .route("/api/roles", get(handle_list_roles))
        // Analysis
        .route("/api/analyze", post(handle_analyze))
        .route("/api/compare", post(handle_compare))
        .route("/api/ask", post(handle_ask))
        // Exports
        .route("/api/export/docx", post(handle_export_docx))
        .route("/api/export/xlsx", post(handle_export_xlsx))
        .route("/api/export/matrix", post(handle_export_matrix))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ClauseMatrix server on {}:{}", args.host, args.port);

    let backend =
        OpenAIBackend::from_env().context("Failed to configure text-generation backend")?;
    info!(
        "Text-generation endpoint: {} (timeout {}s)",
        backend.config().base_url,
        backend.config().timeout_seconds
    );
    let requester_config = RequesterConfig {
        primary: ModelSettings {
            model: args.primary_model,
            ..RequesterConfig::default().primary
        },
        fallback: ModelSettings {
            model: args.fallback_model,
            ..RequesterConfig::default().fallback
        },
        window_chars: args.chunk_chars,
        chunking: true,
    };

    let state = AppState {
        requester: AnalysisRequester::new(Arc::new(backend), requester_config),
        pipeline: PipelineConfig {
            concurrency: args.concurrency.max(1),
            document_timeout: Duration::from_secs(args.document_timeout_secs),
        },
        default_policy: args.error_policy,
        max_upload_bytes: args.max_upload_mb * 1024 * 1024,
    };

    let models = state.requester.config();
    info!(
        "Models: {} (fallback {}), {} concurrent documents, {}s per document",
        models.primary.model,
        models.fallback.model,
        state.pipeline.concurrency,
        state.pipeline.document_timeout.as_secs()
    );

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .context("Invalid rate limit configuration")?,
    );

    let app = build_router(state).layer(GovernorLayer {
        config: governor_conf,
    });

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
