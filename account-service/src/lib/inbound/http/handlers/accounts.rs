//! Admin-gated account management handlers.

use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use super::AccountData;
use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::account::errors::AccountError;
use crate::account::models::AccountId;
use crate::account::models::CreateAccountCommand;
use crate::account::models::DisplayName;
use crate::account::models::EmailAddress;
use crate::account::models::Role;
use crate::account::models::UpdateAccountCommand;
use crate::inbound::http::router::AppState;

pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<AccountData>>, ApiError> {
    state
        .account_service
        .list_accounts()
        .await
        .map_err(ApiError::from)
        .map(|accounts| {
            let data = accounts.iter().map(AccountData::from).collect();
            ApiSuccess::new(StatusCode::OK, data)
        })
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    let account_id = parse_id(&account_id)?;

    state
        .account_service
        .get_account(&account_id)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}

pub async fn create_account(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateAccountRequest>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    let command = body.try_into_command()?;

    state
        .account_service
        .create_account(command)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::CREATED, account.into()))
}

pub async fn update_account(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    ApiJson(body): ApiJson<UpdateAccountRequest>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    let account_id = parse_id(&account_id)?;
    let command = body.try_into_command()?;

    state
        .account_service
        .update_account(&account_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let account_id = parse_id(&account_id)?;

    state
        .account_service
        .delete_account(&account_id)
        .await
        .map_err(ApiError::from)
        .map(|_| StatusCode::NO_CONTENT)
}

pub async fn change_password(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    let account_id = parse_id(&account_id)?;

    if body.password.chars().count() < 6 {
        return Err(ApiError::BadRequest(
            "password must be at least 6 characters".to_string(),
        ));
    }

    state
        .account_service
        .change_password(&account_id, body.password)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}

fn parse_id(raw: &str) -> Result<AccountId, ApiError> {
    AccountId::from_string(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateAccountRequest {
    name: String,
    email: String,
    password: String,
    role: Option<String>,
}

impl CreateAccountRequest {
    fn try_into_command(self) -> Result<CreateAccountCommand, ApiError> {
        let name = DisplayName::new(self.name).map_err(AccountError::from)?;
        let email = EmailAddress::new(self.email).map_err(AccountError::from)?;
        let role = self
            .role
            .map(|r| r.parse::<Role>())
            .transpose()
            .map_err(AccountError::from)?
            .unwrap_or_default();

        if self.password.chars().count() < 6 {
            return Err(ApiError::BadRequest(
                "password must be at least 6 characters".to_string(),
            ));
        }

        Ok(CreateAccountCommand {
            name,
            email,
            password: self.password,
            role,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl UpdateAccountRequest {
    fn try_into_command(self) -> Result<UpdateAccountCommand, ApiError> {
        let name = self
            .name
            .map(DisplayName::new)
            .transpose()
            .map_err(AccountError::from)?;
        let email = self
            .email
            .map(EmailAddress::new)
            .transpose()
            .map_err(AccountError::from)?;
        let role = self
            .role
            .map(|r| r.parse::<Role>())
            .transpose()
            .map_err(AccountError::from)?;

        Ok(UpdateAccountCommand { name, email, role })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
}
