use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Catalog page URL template containing a `{page}` placeholder,
    /// e.g. `https://dentalstall.com/shop/page/{page}/`.
    pub catalog_page_url: String,
    /// Directory product images are downloaded into.
    pub image_dir: PathBuf,
    /// Path of the JSON document written after each run.
    pub output_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Total fetch attempts per page (first try included).
    pub fetch_max_attempts: u32,
    /// Fixed delay between fetch attempts, in seconds.
    pub fetch_retry_delay_secs: u64,
}
