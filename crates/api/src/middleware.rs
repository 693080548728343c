use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use backoffice_auth::SessionGuard;

use crate::app::errors;
use crate::context::SessionContext;

#[derive(Clone)]
pub struct AuthState {
    pub guard: SessionGuard,
}

/// Admit the request only if it carries a live session token.
///
/// Every token failure renders the same 401; the guard logs the precise reason.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let header = authorization_header(req.headers());

    let subject = match state.guard.check(header).await {
        Ok(subject) => subject,
        Err(e) => return errors::auth_error_to_response(e),
    };

    req.extensions_mut().insert(SessionContext::new(subject));
    next.run(req).await
}

/// Raw `Authorization` value; a non-UTF-8 header counts as absent.
fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}
