//! Shared domain model and configuration for the foodprint workspace.

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, parse_catalog, CatalogEntry, CatalogNutrition, ProduceCatalog};
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{
    AlternativeOption, Coordinates, Hemisphere, NutritionFeatures, ProduceInfo, ProduceQuery,
    UserLocation,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("coordinates out of range: lat={lat}, lng={lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },
}
