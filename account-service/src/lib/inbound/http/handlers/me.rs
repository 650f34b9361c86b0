use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;
use serde::Serialize;

use super::AccountData;
use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::account::models::DisplayName;
use crate::account::models::EmailAddress;
use crate::account::models::UpdateAccountCommand;
use crate::inbound::http::middleware::CurrentAccount;
use crate::inbound::http::router::AppState;

/// Logged-in caller's own profile. The account was already resolved by the
/// authentication gate.
pub async fn get_me(
    Extension(current): Extension<CurrentAccount>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, (&current.0).into()))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    ApiJson(body): ApiJson<UpdateMeRequest>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    // Never role or password through this path
    let command = UpdateAccountCommand {
        name: body
            .name
            .map(DisplayName::new)
            .transpose()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        email: body
            .email
            .map(EmailAddress::new)
            .transpose()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        role: None,
    };

    state
        .account_service
        .update_account(&current.0.id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}

pub async fn change_my_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    ApiJson(body): ApiJson<ChangeMyPasswordRequest>,
) -> Result<ApiSuccess<ChangeMyPasswordResponseData>, ApiError> {
    if body.password.chars().count() < 6 {
        return Err(ApiError::BadRequest(
            "password must be at least 6 characters".to_string(),
        ));
    }

    state
        .account_service
        .change_my_password(&current.0.id, body.password)
        .await
        .map_err(ApiError::from)
        .map(|authenticated| {
            ApiSuccess::new(
                StatusCode::OK,
                ChangeMyPasswordResponseData {
                    status: "success".to_string(),
                    token: authenticated.token,
                    data: (&authenticated.account).into(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeMyPasswordRequest {
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeMyPasswordResponseData {
    pub status: String,
    pub token: String,
    pub data: AccountData,
}
