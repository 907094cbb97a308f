use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let catalog_page_url = require("SHELFWATCH_CATALOG_PAGE_URL")?;
    if !catalog_page_url.contains("{page}") {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHELFWATCH_CATALOG_PAGE_URL".to_string(),
            reason: "template must contain a {page} placeholder".to_string(),
        });
    }

    let env = parse_environment(&or_default("SHELFWATCH_ENV", "development"));
    let bind_addr = parse_addr("SHELFWATCH_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SHELFWATCH_LOG_LEVEL", "info");
    let image_dir = PathBuf::from(or_default("SHELFWATCH_IMAGE_DIR", "./images"));
    let output_path = PathBuf::from(or_default("SHELFWATCH_OUTPUT_PATH", "./scraped_data.json"));

    let request_timeout_secs = parse_u64("SHELFWATCH_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default(
        "SHELFWATCH_USER_AGENT",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3",
    );
    let fetch_max_attempts = parse_u32("SHELFWATCH_FETCH_MAX_ATTEMPTS", "3")?;
    let fetch_retry_delay_secs = parse_u64("SHELFWATCH_FETCH_RETRY_DELAY_SECS", "5")?;

    if fetch_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHELFWATCH_FETCH_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        catalog_page_url,
        image_dir,
        output_path,
        request_timeout_secs,
        user_agent,
        fetch_max_attempts,
        fetch_retry_delay_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
