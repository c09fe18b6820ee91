use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let env = parse_environment(&or_default("FOODPRINT_ENV", "development"))?;

    let bind_addr = or_default("FOODPRINT_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("FOODPRINT_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("FOODPRINT_LOG_LEVEL", "info");
    let catalog_path = optional("FOODPRINT_CATALOG_PATH").map(PathBuf::from);

    let offline = parse_bool("FOODPRINT_OFFLINE", "false")?;
    let inference_api_token = optional("HF_API_TOKEN");
    let inference_base_url = or_default(
        "FOODPRINT_INFERENCE_URL",
        "https://api-inference.huggingface.co",
    );
    let classifier_model = or_default(
        "FOODPRINT_CLASSIFIER_MODEL",
        "distilbert-base-uncased-finetuned-sst-2-english",
    );
    let model_load_timeout_secs = parse_u64("FOODPRINT_MODEL_LOAD_TIMEOUT_SECS", "60")?;

    let geocoder_base_url = or_default(
        "FOODPRINT_GEOCODER_URL",
        "https://nominatim.openstreetmap.org",
    );
    let routing_base_url = optional("FOODPRINT_ROUTING_URL");
    let ip_location_base_url = or_default("FOODPRINT_IP_LOCATION_URL", "https://ipapi.co");

    let request_timeout_secs = parse_u64("FOODPRINT_REQUEST_TIMEOUT_SECS", "15")?;
    let geolocation_timeout_secs = parse_u64("FOODPRINT_GEOLOCATION_TIMEOUT_SECS", "10")?;
    let max_retries = parse_u32("FOODPRINT_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("FOODPRINT_RETRY_BACKOFF_BASE_MS", "500")?;
    let user_agent = or_default(
        "FOODPRINT_USER_AGENT",
        "foodprint/0.1 (sustainability-estimator)",
    );

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        catalog_path,
        offline,
        inference_api_token,
        inference_base_url,
        classifier_model,
        model_load_timeout_secs,
        geocoder_base_url,
        routing_base_url,
        ip_location_base_url,
        request_timeout_secs,
        geolocation_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        user_agent,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FOODPRINT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
