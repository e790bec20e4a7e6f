use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::cookies::clear_session_cookies;
use crate::dto::LogoutAllResponse;
use crate::handlers::handle_domain_error;
use crate::middleware::AuthContext;

/// Handler for POST /api/v1/auth/logout-all
///
/// Requires an access token. Invalidates every refresh token of the user.
pub async fn logout_all(state: web::Data<AppState>, auth: AuthContext) -> HttpResponse {
    match state.session_service.revoke_all(auth.user_id).await {
        Ok(revoked) => {
            let response = HttpResponse::Ok().json(LogoutAllResponse {
                message: "Logged out of all sessions".to_string(),
                revoked,
            });
            clear_session_cookies(response, &state.cookies)
        }
        Err(error) => handle_domain_error(&error),
    }
}
