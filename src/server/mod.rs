//! Web form server
//!
//! Serves the upload form and runs each submission through the append
//! pipeline. Requests share nothing but the immutable configuration.

pub mod form;
mod handlers;
mod page;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::pdf::{PageRasterizer, PdfiumRasterizer};

pub use handlers::{health_check, process_upload, upload_form, DOWNLOAD_NAME, PROCESSED_HEADER};
pub use page::render_upload_page;

/// Builds the rasterizer a request renders its PDFs with
pub type RasterizerFactory = Arc<dyn Fn(&Config) -> Box<dyn PageRasterizer> + Send + Sync>;

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rasterizer: RasterizerFactory,
}

impl AppState {
    /// State that renders PDFs with Pdfium
    pub fn new(config: Config) -> Self {
        Self::with_rasterizer(
            config,
            Arc::new(|config: &Config| {
                Box::new(PdfiumRasterizer::new(config.pdfium.library_dir.clone()))
                    as Box<dyn PageRasterizer>
            }),
        )
    }

    pub fn with_rasterizer(config: Config, rasterizer: RasterizerFactory) -> Self {
        Self {
            config: Arc::new(config),
            rasterizer,
        }
    }
}

/// Build the router with all endpoints
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes();

    Router::new()
        .route("/", get(upload_form))
        .route("/process", post(process_upload))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    let app = build_router(state);
    axum::serve(listener, app).await
}

/// Bind the configured address and serve
pub async fn start_server(state: AppState) -> Result<(), std::io::Error> {
    let addr = state.config.server.bind_addr.clone();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Serving upload form on http://{}", listener.local_addr()?);

    serve(listener, state).await
}
