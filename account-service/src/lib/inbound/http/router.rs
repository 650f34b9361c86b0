use std::sync::Arc;
use std::time::Duration;

use auth::TokenIssuer;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::accounts::change_password;
use super::handlers::accounts::create_account;
use super::handlers::accounts::delete_account;
use super::handlers::accounts::get_account;
use super::handlers::accounts::list_accounts;
use super::handlers::accounts::update_account;
use super::handlers::forgot_password::forgot_password;
use super::handlers::login::login;
use super::handlers::me::change_my_password;
use super::handlers::me::get_me;
use super::handlers::me::update_me;
use super::handlers::reset_password::reset_password;
use super::handlers::signup::signup;
use super::handlers::verify_reset_code::verify_reset_code;
use super::middleware::authenticate as auth_middleware;
use super::middleware::require_admin;
use crate::account::ports::AccountServicePort;

#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<dyn AccountServicePort>,
    pub token_issuer: Arc<TokenIssuer>,
}

pub fn create_router(
    account_service: Arc<dyn AccountServicePort>,
    token_issuer: Arc<TokenIssuer>,
) -> Router {
    let state = AppState {
        account_service,
        token_issuer,
    };

    // Reset routes are gated only by possession of a live code, not by the
    // authentication gate.
    let public_routes = Router::new()
        .route("/api/v1/auth/signup", post(signup))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/forgotPassword", post(forgot_password))
        .route(
            "/api/v1/auth/verifyPasswordResetCode",
            post(verify_reset_code),
        )
        .route("/api/v1/auth/resetPassword", patch(reset_password));

    let me_routes = Router::new()
        .route("/api/v1/accounts/me", get(get_me))
        .route("/api/v1/accounts/updateMe", patch(update_me))
        .route("/api/v1/accounts/changeMyPassword", patch(change_my_password));

    let admin_routes = Router::new()
        .route("/api/v1/accounts", get(list_accounts).post(create_account))
        .route(
            "/api/v1/accounts/:account_id",
            get(get_account).patch(update_account).delete(delete_account),
        )
        .route(
            "/api/v1/accounts/changePassword/:account_id",
            patch(change_password),
        )
        .route_layer(middleware::from_fn(require_admin));

    // authenticate wraps the merged protected routes, so it runs before the
    // role gate on the admin subset
    let protected_routes = me_routes.merge(admin_routes).route_layer(
        middleware::from_fn_with_state(state.clone(), auth_middleware),
    );

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
