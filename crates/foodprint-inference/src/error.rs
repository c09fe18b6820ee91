use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No access token was configured for the inference provider.
    #[error("missing inference access token")]
    MissingCredential,

    /// The provider rejected the configured access token.
    #[error("inference credential rejected: {0}")]
    Unauthorized(String),

    /// The model is cold; the provider estimates it will be ready in `estimated_secs`.
    #[error("model is loading (ready in ~{estimated_secs:.0}s)")]
    ModelLoading { estimated_secs: f64 },

    /// The model could not be loaded or reached; callers fall back to heuristics.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("inference API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("inference API returned no labels")]
    EmptyResponse,
}

impl InferenceError {
    /// True for failures caused by the credential rather than the model.
    #[must_use]
    pub fn is_credential_error(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::Unauthorized(_))
    }
}
