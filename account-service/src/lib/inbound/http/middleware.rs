use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::Role;
use crate::inbound::http::router::AppState;

/// The authenticated account, attached to request extensions by
/// [`authenticate`] for downstream handlers.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

/// Authentication gate.
///
/// Walks the request through: bearer credential present, token verifies,
/// account still exists, token not older than the last password change.
/// The first failing check rejects with 401; token-verification failures
/// are logged with their exact reason but rendered identically, so a caller
/// cannot tell an expired token from a forged one.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer_token(&req)?;

    let claims = state.token_issuer.verify(token).map_err(|e| {
        tracing::warn!(error = %e, "Session token rejected");
        unauthorized("invalid or expired token")
    })?;

    let account_id = AccountId::from_string(&claims.sub)
        .map_err(|e| {
            tracing::warn!(error = %e, "Token subject is not an account id");
            unauthorized("invalid or expired token")
        })?;

    let account = state
        .account_service
        .get_account(&account_id)
        .await
        .map_err(|e| match e {
            AccountError::NotFound(_) => {
                unauthorized("the account belonging to this token no longer exists")
            }
            other => {
                tracing::error!(error = %other, "Account lookup failed during authentication");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "status": "error",
                        "message": "internal server error",
                    })),
                )
                    .into_response()
            }
        })?;

    if let Some(changed_at) = account.password_changed_at {
        if claims.predates_password_change(changed_at) {
            return Err(unauthorized(
                "the password has changed recently, please login again",
            ));
        }
    }

    req.extensions_mut().insert(CurrentAccount(account));

    Ok(next.run(req).await)
}

/// Role gate, composed after [`authenticate`].
///
/// Exact membership in `allowed`; no implication between roles.
pub async fn authorize(
    allowed: &[Role],
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    let current = req
        .extensions()
        .get::<CurrentAccount>()
        .ok_or_else(|| unauthorized("you are not logged in"))?;

    if !allowed.contains(&current.0.role) {
        return Err(unauthorized("you are not allowed to access this route"));
    }

    Ok(next.run(req).await)
}

/// Route adapter gating on the admin role.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, Response> {
    authorize(&[Role::Admin], req, next).await
}

fn extract_bearer_token(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("you are not logged in"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("you are not logged in"))?;

    auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("you are not logged in"))
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "status": "error",
            "message": message,
        })),
    )
        .into_response()
}
