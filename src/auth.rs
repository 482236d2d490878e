//! Shared-secret gate for the admin routes.
//!
//! A single static credential in the `password` header authorizes every
//! mutation. The value is compared byte-for-byte against the configured
//! secret; there are no users, expiry, rotation or scoping. When no secret
//! is configured, every admin request is rejected.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, state::State as AppState};

pub const PASSWORD_HEADER: &str = "password";

/// Rejects the request before the inner handler runs unless the header
/// matches the configured secret.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = request
        .headers()
        .get(PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok());

    match (&state.config.admin_password, provided) {
        (Some(secret), Some(password)) if password.as_bytes() == secret.as_bytes() => {
            Ok(next.run(request).await)
        }
        _ => Err(AppError::Unauthorized),
    }
}
