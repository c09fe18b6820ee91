use std::fmt;

use foodprint_core::ProduceQuery;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The pipeline step an error or warning came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Input,
    Location,
    Distance,
    Emissions,
    Seasonality,
    Ripening,
    Alternatives,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Location => "location",
            Self::Distance => "distance",
            Self::Emissions => "emissions",
            Self::Seasonality => "seasonality",
            Self::Ripening => "ripening",
            Self::Alternatives => "alternatives",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Neither coordinates nor a resolvable place were available for the consumer.
    #[error("location unavailable: {0}")]
    LocationUnavailable(String),

    /// Missing or rejected inference credential; the pipeline does not start.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A stage failed after exhausting its fallbacks. The query is kept for retry.
    #[error("analysis failed during {stage}: {message}")]
    Failure {
        stage: Stage,
        message: String,
        query: Box<ProduceQuery>,
    },

    #[error("no previous query to retry")]
    NothingToRetry,

    /// A newer submission started before this one finished.
    #[error("result superseded by a newer query")]
    Superseded,
}

impl PipelineError {
    pub(crate) fn failure(stage: Stage, message: impl Into<String>, query: &ProduceQuery) -> Self {
        Self::Failure {
            stage,
            message: message.into(),
            query: Box::new(query.clone()),
        }
    }

    /// Text suitable for showing to the person who submitted the query.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::LocationUnavailable(_) => {
                "We couldn't determine your location. Enter your city or country and try again."
                    .to_string()
            }
            Self::Configuration(_) => {
                "The analysis service is not configured correctly. Check the access token."
                    .to_string()
            }
            Self::Failure { query, .. } => format!(
                "Analysis of {} failed. Your entry was kept so you can retry.",
                query.produce_name
            ),
            Self::NothingToRetry => "There is no previous analysis to retry.".to_string(),
            Self::Superseded => "A newer analysis replaced this one.".to_string(),
        }
    }

    /// The query retained by a [`PipelineError::Failure`].
    #[must_use]
    pub fn query(&self) -> Option<&ProduceQuery> {
        match self {
            Self::Failure { query, .. } => Some(query),
            _ => None,
        }
    }
}

/// A failure that a stage recovered from. Attached to successful results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// The source location could not be resolved; a fixed distance was assumed.
    DefaultDistance { source: String, km: u32 },
    /// The classifier could not answer; a static heuristic was used instead.
    ModelUnavailable { stage: Stage, reason: String },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefaultDistance { source, km } => {
                write!(f, "could not locate '{source}', assumed {km} km")
            }
            Self::ModelUnavailable { stage, reason } => {
                write!(f, "classifier unavailable during {stage}: {reason}")
            }
        }
    }
}

/// A stage result plus the warning raised while producing it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment<T> {
    pub value: T,
    pub warning: Option<PipelineWarning>,
}

impl<T> Assessment<T> {
    #[must_use]
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    #[must_use]
    pub fn with_warning(value: T, warning: Option<PipelineWarning>) -> Self {
        Self { value, warning }
    }
}
