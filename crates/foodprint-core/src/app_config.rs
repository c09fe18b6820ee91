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

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub catalog_path: Option<PathBuf>,
    /// Run on static heuristics only; no inference credential is required.
    pub offline: bool,
    pub inference_api_token: Option<String>,
    pub inference_base_url: String,
    pub classifier_model: String,
    pub model_load_timeout_secs: u64,
    pub geocoder_base_url: String,
    /// OSRM-compatible routing service. `None` means haversine only.
    pub routing_base_url: Option<String>,
    pub ip_location_base_url: String,
    pub request_timeout_secs: u64,
    pub geolocation_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub user_agent: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("catalog_path", &self.catalog_path)
            .field("offline", &self.offline)
            .field(
                "inference_api_token",
                &self.inference_api_token.as_ref().map(|_| "[redacted]"),
            )
            .field("inference_base_url", &self.inference_base_url)
            .field("classifier_model", &self.classifier_model)
            .field("model_load_timeout_secs", &self.model_load_timeout_secs)
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field("routing_base_url", &self.routing_base_url)
            .field("ip_location_base_url", &self.ip_location_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("geolocation_timeout_secs", &self.geolocation_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
