use axum::{
    extract::{Query, State},
    Extension, Json,
};
use foodprint_analysis::{Analysis, PipelineError, Stage};
use foodprint_core::ProduceQuery;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeParams {
    /// 0 = January. Defaults to the current month.
    pub month: Option<u8>,
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<AnalyzeParams>,
    Json(query): Json<ProduceQuery>,
) -> Result<Json<ApiResponse<Analysis>>, ApiError> {
    let result = match params.month {
        Some(month) if month > 11 => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "month must be between 0 (January) and 11 (December)",
            ))
        }
        Some(month) => state.pipeline.analyze_in_month(&query, month).await,
        None => state.pipeline.analyze(&query).await,
    };

    let analysis = result.map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: analysis,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) fn map_pipeline_error(request_id: String, error: &PipelineError) -> ApiError {
    match error {
        PipelineError::LocationUnavailable(_) => {
            ApiError::new(request_id, "location_unavailable", error.user_message())
        }
        PipelineError::Configuration(detail) => {
            tracing::error!(detail = %detail, "pipeline misconfigured");
            ApiError::new(request_id, "configuration_error", error.user_message())
        }
        PipelineError::Failure {
            stage: Stage::Input,
            message,
            ..
        } => ApiError::new(request_id, "validation_error", message.clone()),
        PipelineError::Failure { stage, message, .. } => {
            tracing::error!(stage = %stage, error = %message, "analysis failed");
            ApiError::new(request_id, "analysis_failed", error.user_message())
        }
        PipelineError::NothingToRetry | PipelineError::Superseded => {
            ApiError::new(request_id, "internal_error", error.user_message())
        }
    }
}
