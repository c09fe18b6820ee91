use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "FOODPRINT_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.catalog_path.is_none());
    assert!(!cfg.offline);
    assert!(cfg.inference_api_token.is_none());
    assert_eq!(cfg.inference_base_url, "https://api-inference.huggingface.co");
    assert_eq!(
        cfg.classifier_model,
        "distilbert-base-uncased-finetuned-sst-2-english"
    );
    assert_eq!(cfg.model_load_timeout_secs, 60);
    assert_eq!(cfg.geocoder_base_url, "https://nominatim.openstreetmap.org");
    assert!(cfg.routing_base_url.is_none());
    assert_eq!(cfg.ip_location_base_url, "https://ipapi.co");
    assert_eq!(cfg.request_timeout_secs, 15);
    assert_eq!(cfg.geolocation_timeout_secs, 10);
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_base_ms, 500);
    assert_eq!(cfg.user_agent, "foodprint/0.1 (sustainability-estimator)");
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("FOODPRINT_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FOODPRINT_BIND_ADDR"),
        "expected InvalidEnvVar(FOODPRINT_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_reads_token_and_trims_it() {
    let mut map = HashMap::new();
    map.insert("HF_API_TOKEN", "  hf_secret  ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.inference_api_token.as_deref(), Some("hf_secret"));
}

#[test]
fn build_app_config_treats_blank_token_as_missing() {
    let mut map = HashMap::new();
    map.insert("HF_API_TOKEN", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.inference_api_token.is_none());
}

#[test]
fn debug_output_redacts_token() {
    let mut map = HashMap::new();
    map.insert("HF_API_TOKEN", "hf_secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("hf_secret"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn offline_flag_accepts_common_spellings() {
    for raw in ["1", "true", "TRUE", "yes"] {
        let mut map = HashMap::new();
        map.insert("FOODPRINT_OFFLINE", raw);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.offline, "'{raw}' should enable offline mode");
    }
}

#[test]
fn offline_flag_rejects_garbage() {
    let mut map = HashMap::new();
    map.insert("FOODPRINT_OFFLINE", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FOODPRINT_OFFLINE"),
        "expected InvalidEnvVar(FOODPRINT_OFFLINE), got: {result:?}"
    );
}

#[test]
fn routing_url_override() {
    let mut map = HashMap::new();
    map.insert("FOODPRINT_ROUTING_URL", "http://localhost:5000");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.routing_base_url.as_deref(),
        Some("http://localhost:5000")
    );
}

#[test]
fn max_retries_invalid() {
    let mut map = HashMap::new();
    map.insert("FOODPRINT_MAX_RETRIES", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FOODPRINT_MAX_RETRIES"),
        "expected InvalidEnvVar(FOODPRINT_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn request_timeout_override() {
    let mut map = HashMap::new();
    map.insert("FOODPRINT_REQUEST_TIMEOUT_SECS", "30");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.request_timeout_secs, 30);
}

#[test]
fn geolocation_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("FOODPRINT_GEOLOCATION_TIMEOUT_SECS", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FOODPRINT_GEOLOCATION_TIMEOUT_SECS"),
        "expected InvalidEnvVar(FOODPRINT_GEOLOCATION_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn catalog_path_is_read() {
    let mut map = HashMap::new();
    map.insert("FOODPRINT_CATALOG_PATH", "./config/produce.yaml");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.catalog_path.as_deref(),
        Some(std::path::Path::new("./config/produce.yaml"))
    );
}
