use std::net::SocketAddr;
use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intake_api::config::ServerConfig;
use intake_api::router::build_app_router;
use intake_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env();

    // --- Tracing ---
    init_tracing(&config);
    tracing::info!(
        environment = config.environment.as_str(),
        host = %config.host,
        port = %config.port,
        csrf_enabled = config.csrf_enabled,
        pdf_timeout_ms = config.pdf_timeout().as_millis() as u64,
        "Loaded server configuration",
    );

    // --- One-shot commands ---
    if let Some(path) = write_template_arg() {
        match intake_pdf::write_blank_template(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Blank PDF template written");
                return;
            }
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "Failed to write PDF template");
                std::process::exit(1);
            }
        }
    }

    // --- Database ---
    let pool = intake_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    intake_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    intake_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- PDF template ---
    match intake_pdf::ensure_template(&config.pdf_template_path) {
        Ok(true) => tracing::info!(
            path = %config.pdf_template_path.display(),
            "PDF template missing; blank template written",
        ),
        Ok(false) => {}
        Err(err) => tracing::error!(
            path = %config.pdf_template_path.display(),
            error = %err,
            "PDF template unavailable; submissions will be stored without documents",
        ),
    }

    // --- Router ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let state = AppState::new(pool.clone(), config);
    let app = build_app_router(state);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server stopped accepting connections, closing database pool");
    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// `EnvFilter` from `RUST_LOG` (or the environment default), plain or JSON
/// output depending on `LOG_FORMAT`.
fn init_tracing(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.default_log_filter().into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Path given as `--write-template <path>` or `--write-template=<path>`.
fn write_template_arg() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--write-template" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--write-template=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
