use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use prediction_engine::Predictor;
use rcc_core::{ErrorExt, PredictionError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub home_page: Arc<str>,
}

/// `{"comment": [text, elapsed_minutes, community]}`
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub comment: (String, ElapsedMinutes, String),
}

/// Browsers post the elapsed time from a text field, so both a number and a
/// numeric string are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ElapsedMinutes {
    Number(f64),
    Text(String),
}

impl ElapsedMinutes {
    /// Whole minutes, truncated toward zero.
    pub fn whole_minutes(&self) -> Result<i64, PredictionError> {
        let value = match self {
            ElapsedMinutes::Number(value) => *value,
            ElapsedMinutes::Text(text) => text.trim().parse::<f64>().map_err(|_| {
                PredictionError::InvalidRequest {
                    reason: format!("elapsed time is not a number: {:?}", text),
                }
            })?,
        };

        if !value.is_finite() {
            return Err(PredictionError::InvalidRequest {
                reason: format!("elapsed time is not finite: {}", value),
            });
        }
        Ok(value.trunc() as i64)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassifyResponse {
    pub pred: i64,
}

pub struct ApiError(PredictionError);

impl From<PredictionError> for ApiError {
    fn from(error: PredictionError) -> Self {
        Self(error)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            PredictionError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            PredictionError::UnknownCommunity { .. } => StatusCode::NOT_FOUND,
            PredictionError::EmptyVocabulary => StatusCode::UNPROCESSABLE_ENTITY,
            PredictionError::FeatureMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            self.0.log_error();
        } else {
            self.0.log_warn();
        }
        let body = json!({
            "error": self.0.error_code(),
            "message": self.0.user_friendly_message(),
        });
        (status, Json(body)).into_response()
    }
}

pub async fn home(State(state): State<AppState>) -> Html<String> {
    Html(state.home_page.to_string())
}

pub async fn subreddits(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.predictor.registry().communities().to_vec())
}

pub async fn classify(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let request: ClassifyRequest =
        serde_json::from_slice(&body).map_err(|e| PredictionError::InvalidRequest {
            reason: format!("expected {{\"comment\": [text, minutes, community]}}: {}", e),
        })?;

    let (text, elapsed, community) = request.comment;
    let minutes = elapsed.whole_minutes()?;

    let pred = state.predictor.predict(&text, minutes as f64, &community)?;

    info!("r/{} comment at {} minutes classified as {}", community, minutes, pred);
    Ok(Json(ClassifyResponse { pred }))
}
