use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::dto::{Envelope, WhoAmIResponse};
use crate::context::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(session): Extension<SessionContext>) -> impl IntoResponse {
    Json(Envelope::single(WhoAmIResponse {
        user_id: session.account_id(),
        email: session.email().to_string(),
        is_active: session.is_active(),
    }))
}
