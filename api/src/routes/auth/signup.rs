use actix_web::{web, HttpResponse};
use validator::Validate;

use cp_core::services::auth::SignupInput;

use crate::app::AppState;
use crate::dto::SignupRequest;
use crate::handlers::{handle_domain_error, validation_error};

use super::signed_in;

/// Handler for POST /api/v1/auth/signup
///
/// Creates a password account and starts its first session.
///
/// # Request Body
///
/// ```json
/// { "email": "ada@example.com", "name": "Ada", "password": "at least 8 chars" }
/// ```
///
/// # Response
///
/// ## Success (201 Created)
/// `{ user, access_token, refresh_token, token_type, expires_in }`, plus the
/// `token` and `refreshToken` cookies.
///
/// ## Errors
/// - 400 Bad Request: Invalid email, name or password
/// - 409 Conflict: Email already registered
pub async fn signup(state: web::Data<AppState>, request: web::Json<SignupRequest>) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error(&errors);
    }

    let request = request.into_inner();
    let input = SignupInput {
        email: request.email,
        name: request.name,
        password: request.password,
    };

    match state.auth_service.signup(input).await {
        Ok(session) => signed_in(HttpResponse::Created(), &state, session),
        Err(error) => handle_domain_error(&error),
    }
}
