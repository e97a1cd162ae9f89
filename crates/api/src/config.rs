use std::path::PathBuf;
use std::time::Duration;

/// Deployment flavour selected by `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse an `APP_ENV` value; unknown values fall back to development.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Selected environment (default: development).
    pub environment: Environment,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// SQLite connection string.
    pub database_url: String,
    /// Key used to sign anti-forgery tokens. Never logged.
    pub secret_key: String,
    /// Whether POST /submit requires a valid anti-forgery token.
    pub csrf_enabled: bool,
    /// Fillable PDF template.
    pub pdf_template_path: PathBuf,
    /// Directory receiving generated PDFs.
    pub pdf_output_dir: PathBuf,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on one PDF render in seconds (default: `10`).
    pub pdf_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                        |
    /// |------------------------|------------------------------------------------|
    /// | `APP_ENV`              | `development`                                  |
    /// | `HOST`                 | `0.0.0.0`                                      |
    /// | `PORT`                 | `8080`                                         |
    /// | `DATABASE_URL`         | `sqlite://internship_forms.db` (`sqlite::memory:` when testing) |
    /// | `SECRET_KEY`           | random per process                             |
    /// | `CSRF_ENABLED`         | `true` (`false` when testing)                  |
    /// | `PDF_TEMPLATE_PATH`    | `static/pdf/internship_form_template.pdf`      |
    /// | `PDF_OUTPUT_DIR`       | `generated_pdfs`                               |
    /// | `STATIC_DIR`           | `static`                                       |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                           |
    /// | `PDF_TIMEOUT_SECS`     | `10`                                           |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("APP_ENV")
            .map(|v| Environment::parse(&v))
            .unwrap_or(Environment::Development);
        let testing = environment == Environment::Testing;

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port: u16 = var("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let database_url = var("DATABASE_URL").unwrap_or_else(|| {
            if testing {
                "sqlite::memory:".into()
            } else {
                "sqlite://internship_forms.db".into()
            }
        });

        let secret_key = var("SECRET_KEY").unwrap_or_else(intake_core::csrf::generate_secret);

        let csrf_enabled = var("CSRF_ENABLED")
            .map(|v| parse_bool(&v).expect("CSRF_ENABLED must be true or false"))
            .unwrap_or(!testing);

        let pdf_template_path = var("PDF_TEMPLATE_PATH")
            .unwrap_or_else(|| "static/pdf/internship_form_template.pdf".into())
            .into();
        let pdf_output_dir = var("PDF_OUTPUT_DIR")
            .unwrap_or_else(|| "generated_pdfs".into())
            .into();
        let static_dir = var("STATIC_DIR").unwrap_or_else(|| "static".into()).into();

        let request_timeout_secs: u64 = var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let pdf_timeout_secs: u64 = var("PDF_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".into())
            .parse()
            .expect("PDF_TIMEOUT_SECS must be a valid u64");

        Self {
            environment,
            host,
            port,
            database_url,
            secret_key,
            csrf_enabled,
            pdf_template_path,
            pdf_output_dir,
            static_dir,
            request_timeout_secs,
            pdf_timeout_secs,
        }
    }

    /// Debug mode: verbose logging by default.
    pub fn debug(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Render budget: `PDF_TIMEOUT_SECS`, capped at half the request timeout.
    pub fn pdf_timeout(&self) -> Duration {
        let request = Duration::from_secs(self.request_timeout_secs);
        Duration::from_secs(self.pdf_timeout_secs)
            .min(request / 2)
            .max(Duration::from_millis(100))
    }

    /// Log filter used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug() {
            "intake_api=debug,intake_pdf=debug,intake_db=debug,tower_http=debug"
        } else {
            "info"
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
