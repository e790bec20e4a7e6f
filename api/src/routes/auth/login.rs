use actix_web::{web, HttpResponse};
use validator::Validate;

use cp_core::services::auth::LoginInput;

use crate::app::AppState;
use crate::dto::LoginRequest;
use crate::handlers::{handle_domain_error, validation_error};

use super::signed_in;

/// Handler for POST /api/v1/auth/login
///
/// Each successful login adds a session; existing sessions on other devices
/// stay valid.
///
/// ## Errors
/// - 400 Bad Request: Malformed body
/// - 401 Unauthorized: Unknown email or wrong password
pub async fn login(state: web::Data<AppState>, request: web::Json<LoginRequest>) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error(&errors);
    }

    let request = request.into_inner();
    let input = LoginInput {
        email: request.email,
        password: request.password,
    };

    match state.auth_service.login(input).await {
        Ok(session) => signed_in(HttpResponse::Ok(), &state, session),
        Err(error) => handle_domain_error(&error),
    }
}
