//! Authentication route handlers
//!
//! - Sign-up and password login
//! - Refresh token rotation
//! - Logout of one session or all sessions
//! - Profile and session count of the signed-in user

pub mod login;
pub mod logout;
pub mod logout_all;
pub mod me;
pub mod refresh;
pub mod sessions;
pub mod signup;

use actix_web::HttpResponse;

use cp_core::services::auth::AuthenticatedSession;

use crate::app::AppState;
use crate::cookies::session_cookies;
use crate::dto::AuthResponse;

/// Successful sign-in response: token body plus session cookies
fn signed_in(
    mut response: actix_web::HttpResponseBuilder,
    state: &AppState,
    session: AuthenticatedSession,
) -> HttpResponse {
    for cookie in session_cookies(&state.cookies, &session.tokens) {
        response.cookie(cookie);
    }
    response.json(AuthResponse::new(Some(session.user), &session.tokens))
}
