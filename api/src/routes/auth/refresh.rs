use actix_web::{web, HttpRequest, HttpResponse};

use cp_core::errors::{AuthError, DomainError};
use cp_shared::{error_codes, ErrorResponse};

use crate::app::AppState;
use crate::cookies::{clear_session_cookies, session_cookies};
use crate::dto::{AuthResponse, RefreshTokenRequest};
use crate::handlers::handle_refresh_error;

/// Refresh token from the cookie, falling back to the JSON body
pub(super) fn presented_refresh_token(
    req: &HttpRequest,
    state: &AppState,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> Option<String> {
    req.cookie(&state.cookies.refresh_cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| body.and_then(|b| b.into_inner().refresh_token))
        .filter(|token| !token.is_empty())
}

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new pair. The presented token is consumed;
/// presenting it again revokes every session of the user.
///
/// # Response
///
/// ## Success (200 OK)
/// `{ access_token, refresh_token, token_type, expires_in }` and new cookies.
///
/// ## Errors
/// - 401 Unauthorized: Missing, malformed or expired refresh token
/// - 403 Forbidden: `REAUTHENTICATION_REQUIRED` on reuse (cookies cleared),
///   `SESSION_INVALID` when the account no longer exists
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> HttpResponse {
    let Some(token) = presented_refresh_token(&req, &state, body) else {
        return HttpResponse::Unauthorized().json(ErrorResponse::new(
            error_codes::UNAUTHORIZED,
            "Refresh token is required",
        ));
    };

    match state.session_service.rotate(&token).await {
        Ok(tokens) => {
            let mut response = HttpResponse::Ok();
            for cookie in session_cookies(&state.cookies, &tokens) {
                response.cookie(cookie);
            }
            response.json(AuthResponse::new(None, &tokens))
        }
        Err(error) => {
            let response = handle_refresh_error(&error);
            if error.requires_reauthentication()
                || matches!(error, DomainError::Auth(AuthError::UserNotFound))
            {
                clear_session_cookies(response, &state.cookies)
            } else {
                response
            }
        }
    }
}
