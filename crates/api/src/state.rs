use std::sync::Arc;
use std::time::Duration;

use intake_core::csrf::CsrfSigner;
use intake_pdf::PdfRenderer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: intake_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Anti-forgery token signer, keyed by `config.secret_key`.
    pub csrf: Arc<CsrfSigner>,
    /// PDF template filler.
    pub pdf: Arc<PdfRenderer>,
    /// Budget for one render, from [`ServerConfig::pdf_timeout`].
    pub pdf_timeout: Duration,
}

impl AppState {
    /// Assemble the state from a pool and configuration.
    pub fn new(pool: intake_db::DbPool, config: ServerConfig) -> Self {
        let csrf = CsrfSigner::new(&config.secret_key);
        let pdf = PdfRenderer::new(config.pdf_template_path.clone(), config.pdf_output_dir.clone());
        let pdf_timeout = config.pdf_timeout();
        Self {
            pool,
            config: Arc::new(config),
            csrf: Arc::new(csrf),
            pdf: Arc::new(pdf),
            pdf_timeout,
        }
    }
}
