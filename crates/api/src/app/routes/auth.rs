use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::debug;

use backoffice_auth::AuthError;

use crate::app::dto::{
    AccountResponse, ConfirmationResponse, Envelope, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest,
};
use crate::app::errors;
use crate::app::services::AuthServices;
use crate::context::SessionContext;

const BOT_TOKEN_HEADER: &str = "x-recaptcha-token";

pub async fn register(
    Extension(services): Extension<Arc<AuthServices>>,
    headers: HeaderMap,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match body {
        Ok(Json(b)) => b,
        Err(rejection) => return bad_body(rejection),
    };
    if let Err(e) = bot_check(&services, &headers, body.recaptcha_token.as_deref()).await {
        return errors::auth_error_to_response(e);
    }

    match services.lifecycle.register(&body.email, &body.password).await {
        Ok(account) => (
            StatusCode::CREATED,
            Json(Envelope::single(AccountResponse::from(account))),
        )
            .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn confirm(
    Extension(services): Extension<Arc<AuthServices>>,
    Path(token): Path<String>,
) -> axum::response::Response {
    match services.lifecycle.activate(&token).await {
        Ok(email) => Json(Envelope::single(ConfirmationResponse {
            email,
            message: "account activated",
        }))
        .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AuthServices>>,
    headers: HeaderMap,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match body {
        Ok(Json(b)) => b,
        Err(rejection) => return bad_body(rejection),
    };
    if let Err(e) = bot_check(&services, &headers, body.recaptcha_token.as_deref()).await {
        return errors::auth_error_to_response(e);
    }

    match services.lifecycle.login(&body.email, &body.password).await {
        Ok(outcome) => Json(Envelope::single(LoginResponse::from(outcome))).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn logout(
    Extension(services): Extension<Arc<AuthServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    match services.lifecycle.logout(session.token().as_str()).await {
        Ok(()) => Json(Envelope::single(MessageResponse {
            message: "session closed",
        }))
        .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// Body field wins over the header when both are present.
async fn bot_check(
    services: &AuthServices,
    headers: &HeaderMap,
    from_body: Option<&str>,
) -> Result<(), AuthError> {
    let from_header = headers.get(BOT_TOKEN_HEADER).and_then(|v| v.to_str().ok());
    let response = from_body
        .filter(|v| !v.trim().is_empty())
        .or(from_header);
    services.bot.check(response).await.map_err(AuthError::from)
}

fn bad_body(rejection: JsonRejection) -> axum::response::Response {
    debug!(error = %rejection.body_text(), "rejected request body");
    errors::json_error(
        StatusCode::BAD_REQUEST,
        "validation_error",
        rejection.body_text(),
    )
}
