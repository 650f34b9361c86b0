use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn verify_reset_code(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<VerifyResetCodeRequest>,
) -> Result<ApiSuccess<VerifyResetCodeResponseData>, ApiError> {
    state
        .account_service
        .verify_reset_code(&body.reset_code)
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::OK,
                VerifyResetCodeResponseData {
                    status: "success".to_string(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifyResetCodeRequest {
    #[serde(rename = "resetCode")]
    reset_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyResetCodeResponseData {
    pub status: String,
}
