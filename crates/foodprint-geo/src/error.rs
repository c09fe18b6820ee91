use thiserror::Error;

/// Errors returned by the geocoding, routing, and geolocation collaborators.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered, but with an application-level failure.
    #[error("provider error: {0}")]
    Provider(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The provider returned no match for the place name.
    #[error("no geocoding match for '{0}'")]
    NotFound(String),

    /// Neither coordinates nor a resolvable place name were available.
    #[error("location unavailable: {0}")]
    LocationUnavailable(String),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),
}

/// Outcomes of a single-shot position request that did not yield a fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    Denied,

    #[error("position unavailable: {0}")]
    Unavailable(String),

    #[error("position request timed out after {secs}s")]
    Timeout { secs: u64 },
}
