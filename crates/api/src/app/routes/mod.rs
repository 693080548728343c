use axum::{
    Router,
    routing::{get, post},
};

pub mod auth;
pub mod system;

/// Routes reachable without a session.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/confirm/:token", get(auth::confirm))
        .route("/auth/login", post(auth::login))
}

/// Routes behind the session middleware.
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/whoami", get(system::whoami))
}
