//! Identity gate for the OAuth-delegated sign-in.
//!
//! The OAuth flow itself lives in the reverse proxy in front of this service;
//! the proxy forwards the authenticated principal's e-mail and display name
//! in trusted headers. This layer only enforces the allowed-domain gate and
//! hands the principal to the handlers as an opaque member-id source.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::{AppError, ErrorResponse};

/// Header carrying the authenticated principal's e-mail.
pub const AUTH_EMAIL_HEADER: &str = "x-auth-email";

/// Header carrying the authenticated principal's display name.
pub const AUTH_NAME_HEADER: &str = "x-auth-name";

/// The authenticated caller, as supplied by the identity provider.
#[derive(Debug, Clone)]
pub struct Principal {
    pub email: String,
    pub name: String,
}

/// Identity layer function that takes the allowed e-mail domain as a parameter.
pub async fn identity_layer(
    allowed_domain: Option<String>,
    mut request: Request,
    next: Next,
) -> Response {
    let email = request
        .headers()
        .get(AUTH_EMAIL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let Some(email) = email else {
        return unauthorized_response("Missing identity");
    };

    if let Some(domain) = &allowed_domain {
        if !email_in_domain(&email, domain) {
            return unauthorized_response("E-mail domain not allowed");
        }
    }

    let name = request
        .headers()
        .get(AUTH_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| display_name_from_email(&email));

    request.extensions_mut().insert(Principal { email, name });
    next.run(request).await
}

/// Whether the e-mail's domain part matches the allowed domain.
fn email_in_domain(email: &str, domain: &str) -> bool {
    match email.rsplit_once('@') {
        Some((local, found)) => !local.is_empty() && found.eq_ignore_ascii_case(domain),
        None => false,
    }
}

/// Fallback display name when the proxy sends no name header.
fn display_name_from_email(email: &str) -> String {
    email
        .split('@')
        .next()
        .unwrap_or(email)
        .replace(['.', '_'], " ")
}

/// Reject the request before any handler runs.
fn unauthorized_response(message: &str) -> Response {
    let error = AppError::Unauthorized(message.to_string());
    let body = ErrorResponse::new(&error, 0);
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
