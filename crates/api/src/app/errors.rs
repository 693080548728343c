use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use backoffice_auth::{AuthError, ErrorKind};

/// Message shared by every credential and token failure.
const UNAUTHORIZED_MESSAGE: &str = "invalid credentials or token";

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match (&err, err.kind()) {
        (_, ErrorKind::Validation) => {
            json_error(StatusCode::BAD_REQUEST, err.code(), err.to_string())
        }
        (_, ErrorKind::Conflict) => json_error(StatusCode::CONFLICT, err.code(), err.to_string()),
        (AuthError::AccountNotActivated, _) => json_error(
            StatusCode::FORBIDDEN,
            err.code(),
            "account has not been activated; check your email",
        ),
        (_, ErrorKind::Authentication | ErrorKind::Authorization) => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", UNAUTHORIZED_MESSAGE)
        }
        (_, ErrorKind::NotFound) => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        (_, ErrorKind::Internal) => {
            error!(error = %err, "request failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use backoffice_auth::TokenError;

    use super::*;

    fn status(err: AuthError) -> StatusCode {
        auth_error_to_response(err).status()
    }

    #[test]
    fn maps_kinds_to_statuses() {
        assert_eq!(status(AuthError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(AuthError::EmailTaken), StatusCode::CONFLICT);
        assert_eq!(status(AuthError::AlreadyConfirmed), StatusCode::CONFLICT);
        assert_eq!(status(AuthError::AccountNotActivated), StatusCode::FORBIDDEN);
        assert_eq!(status(AuthError::AccountNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status(AuthError::Internal("db down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn token_failures_are_uniform() {
        for err in [
            AuthError::InvalidCredentials,
            AuthError::MissingToken,
            AuthError::InvalidToken(TokenError::Expired),
            AuthError::InvalidToken(TokenError::SignatureInvalid),
            AuthError::RevokedToken,
            AuthError::UndecodableToken,
            AuthError::BotCheckFailed,
        ] {
            assert_eq!(status(err), StatusCode::UNAUTHORIZED);
        }
    }
}
