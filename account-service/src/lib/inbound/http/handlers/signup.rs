use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::AccountData;
use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::account::errors::EmailError;
use crate::account::errors::NameError;
use crate::account::models::DisplayName;
use crate::account::models::EmailAddress;
use crate::account::models::SignupCommand;
use crate::inbound::http::router::AppState;

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignupRequest>,
) -> Result<ApiSuccess<SignupResponseData>, ApiError> {
    let command = body.try_into_command()?;

    state
        .account_service
        .signup(command)
        .await
        .map_err(ApiError::from)
        .map(|authenticated| {
            ApiSuccess::new(
                StatusCode::CREATED,
                SignupResponseData {
                    token: authenticated.token,
                    data: (&authenticated.account).into(),
                },
            )
        })
}

/// HTTP request body for signup (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignupRequest {
    name: String,
    email: String,
    password: String,
    #[serde(rename = "passwordConfirm")]
    password_confirm: String,
}

#[derive(Debug, Clone, Error)]
enum ParseSignupRequestError {
    #[error("invalid name: {0}")]
    Name(#[from] NameError),

    #[error("invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Password Confirmation incorrect")]
    PasswordConfirmMismatch,
}

impl SignupRequest {
    fn try_into_command(self) -> Result<SignupCommand, ParseSignupRequestError> {
        let name = DisplayName::new(self.name)?;
        let email = EmailAddress::new(self.email)?;

        if self.password.chars().count() < 6 {
            return Err(ParseSignupRequestError::PasswordTooShort);
        }
        if self.password != self.password_confirm {
            return Err(ParseSignupRequestError::PasswordConfirmMismatch);
        }

        Ok(SignupCommand {
            name,
            email,
            password: self.password,
        })
    }
}

impl From<ParseSignupRequestError> for ApiError {
    fn from(err: ParseSignupRequestError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupResponseData {
    pub token: String,
    pub data: AccountData,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(password: &str, confirm: &str) -> SignupRequest {
        SignupRequest {
            name: "Ann".to_string(),
            email: "a@x.com".to_string(),
            password: password.to_string(),
            password_confirm: confirm.to_string(),
        }
    }

    #[test]
    fn test_parse_valid_request() {
        let command = request("secret1", "secret1").try_into_command().unwrap();
        assert_eq!(command.email.as_str(), "a@x.com");
        assert_eq!(command.password, "secret1");
    }

    #[test]
    fn test_parse_rejects_short_password() {
        let result = request("abc", "abc").try_into_command();
        assert!(matches!(
            result,
            Err(ParseSignupRequestError::PasswordTooShort)
        ));
    }

    #[test]
    fn test_parse_rejects_confirm_mismatch() {
        let result = request("secret1", "secret2").try_into_command();
        assert!(matches!(
            result,
            Err(ParseSignupRequestError::PasswordConfirmMismatch)
        ));
    }
}
