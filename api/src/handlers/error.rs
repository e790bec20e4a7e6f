//! Maps domain errors to JSON error responses

use actix_web::{http::StatusCode, HttpResponse};
use validator::ValidationErrors;

use cp_core::errors::{AuthError, DomainError, TokenError};
use cp_shared::{error_codes, ErrorResponse};

fn respond(status: StatusCode, code: &str, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse::new(code, message))
}

/// Standard mapping used by every endpoint
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    match error {
        DomainError::Validation { message } => {
            respond(StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR, message)
        }
        DomainError::Auth(AuthError::UserNotFound) => {
            respond(StatusCode::NOT_FOUND, error_codes::NOT_FOUND, "User not found")
        }
        DomainError::Auth(AuthError::UserAlreadyExists) => respond(
            StatusCode::CONFLICT,
            error_codes::CONFLICT,
            "An account with this email already exists",
        ),
        DomainError::Auth(AuthError::InvalidCredentials) => respond(
            StatusCode::UNAUTHORIZED,
            error_codes::INVALID_CREDENTIALS,
            "Invalid email or password",
        ),
        DomainError::Token(TokenError::InvalidToken) => respond(
            StatusCode::UNAUTHORIZED,
            error_codes::INVALID_TOKEN,
            "Invalid or expired token",
        ),
        DomainError::Token(TokenError::ReplayDetected) => respond(
            StatusCode::FORBIDDEN,
            error_codes::REAUTHENTICATION_REQUIRED,
            "Please log in again",
        ),
        DomainError::Storage { message } => {
            tracing::error!(error = %message, "Storage failure");
            respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::DATABASE_ERROR,
                "A storage error occurred",
            )
        }
        DomainError::Token(TokenError::TokenGenerationFailed)
        | DomainError::Configuration { .. }
        | DomainError::Internal { .. } => {
            tracing::error!(error = %error, "Internal failure");
            respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                "An internal error occurred",
            )
        }
    }
}

/// Mapping for the refresh endpoint.
///
/// A token whose subject no longer exists is reported as an invalid session
/// rather than a missing user.
pub fn handle_refresh_error(error: &DomainError) -> HttpResponse {
    match error {
        DomainError::Auth(AuthError::UserNotFound) => respond(
            StatusCode::FORBIDDEN,
            error_codes::SESSION_INVALID,
            "Session is no longer valid",
        ),
        other => handle_domain_error(other),
    }
}

/// 400 response listing the failing fields
pub fn validation_error(errors: &ValidationErrors) -> HttpResponse {
    let mut response = ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request body");
    for (field, field_errors) in errors.field_errors() {
        let codes: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        response = response.add_detail(field.to_string(), codes);
    }
    HttpResponse::BadRequest().json(response)
}
