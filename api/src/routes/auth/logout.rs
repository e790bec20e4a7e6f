use actix_web::{web, HttpRequest, HttpResponse};

use cp_core::errors::{DomainError, TokenError};

use crate::app::AppState;
use crate::cookies::clear_session_cookies;
use crate::dto::{LogoutResponse, RefreshTokenRequest};
use crate::handlers::handle_domain_error;

use super::refresh::presented_refresh_token;

/// Handler for POST /api/v1/auth/logout
///
/// Ends the current session only. Cookies are always cleared; a missing or
/// unusable refresh token still yields 200 with `revoked: false`.
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> HttpResponse {
    let revoked = match presented_refresh_token(&req, &state, body) {
        Some(token) => match state.session_service.revoke(&token).await {
            Ok(revoked) => revoked,
            Err(DomainError::Token(TokenError::InvalidToken)) => false,
            Err(error) => return handle_domain_error(&error),
        },
        None => false,
    };

    let response = HttpResponse::Ok().json(LogoutResponse {
        message: "Logged out successfully".to_string(),
        revoked,
    });
    clear_session_cookies(response, &state.cookies)
}
