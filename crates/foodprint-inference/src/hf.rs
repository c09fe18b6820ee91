//! Hugging Face Inference API client for text classification.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;
use crate::error::InferenceError;
use crate::types::{Classification, InferenceConfig, Label};

pub struct HuggingFaceClient {
    client: reqwest::Client,
    url: String,
    api_token: String,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Pipelines answer either `[[{..},{..}]]` or `[{..},{..}]` depending on model.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    estimated_time: Option<f64>,
}

impl HuggingFaceClient {
    /// # Errors
    ///
    /// Returns [`InferenceError::MissingCredential`] if the token is blank, or
    /// [`InferenceError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(config: &InferenceConfig) -> Result<Self, InferenceError> {
        if config.api_token.trim().is_empty() {
            return Err(InferenceError::MissingCredential);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url: format!(
                "{}/models/{}",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_token: config.api_token.trim().to_string(),
        })
    }

    async fn classify(&self, prompt: &str) -> Result<Classification, InferenceError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_token)
            .json(&ClassifyRequest { inputs: prompt })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        let parsed: ClassifyResponse =
            serde_json::from_str(&body).map_err(|e| InferenceError::Deserialize {
                context: "text-classification response".to_string(),
                source: e,
            })?;

        let scores = match parsed {
            ClassifyResponse::Nested(outer) => outer.into_iter().next().unwrap_or_default(),
            ClassifyResponse::Flat(flat) => flat,
        };

        top_label(scores)
    }
}

#[async_trait]
impl Classifier for HuggingFaceClient {
    async fn infer(&self, prompt: &str) -> Result<Classification, InferenceError> {
        self.classify(prompt).await
    }
}

fn classify_error(status: StatusCode, body: &str) -> InferenceError {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => InferenceError::Unauthorized(
            parsed.map_or_else(|| status.to_string(), |b| b.error),
        ),
        StatusCode::SERVICE_UNAVAILABLE => match parsed {
            Some(ErrorBody {
                estimated_time: Some(secs),
                ..
            }) => InferenceError::ModelLoading {
                estimated_secs: secs,
            },
            Some(b) => InferenceError::ModelUnavailable(b.error),
            None => InferenceError::ModelUnavailable(status.to_string()),
        },
        _ => InferenceError::Api {
            status: status.as_u16(),
            message: parsed.map_or_else(|| body.chars().take(200).collect(), |b| b.error),
        },
    }
}

/// Pick the highest-scoring label and map it onto the binary polarity.
///
/// Accepts `POSITIVE`/`NEGATIVE` as well as the `LABEL_1`/`LABEL_0` naming
/// some fine-tuned checkpoints use.
fn top_label(scores: Vec<LabelScore>) -> Result<Classification, InferenceError> {
    let top = scores
        .into_iter()
        .filter(|s| s.score.is_finite())
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or(InferenceError::EmptyResponse)?;

    let label = match top.label.to_uppercase().as_str() {
        "POSITIVE" | "POS" | "LABEL_1" => Label::Positive,
        "NEGATIVE" | "NEG" | "LABEL_0" => Label::Negative,
        other => {
            return Err(InferenceError::Api {
                status: 200,
                message: format!("unexpected label '{other}'"),
            })
        }
    };

    Ok(Classification {
        label,
        score: top.score.clamp(0.0, 1.0),
    })
}
