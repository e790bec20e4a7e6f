//! Session cookies
//!
//! `token` carries the access token and `refreshToken` the refresh token.
//! Both are httpOnly and expire together with the token they carry.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpResponse;

use cp_core::domain::entities::token::TokenPair;
use cp_shared::config::CookieConfig;

fn same_site(config: &CookieConfig) -> SameSite {
    match config.same_site.to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}

fn session_cookie(
    config: &CookieConfig,
    name: &str,
    value: &str,
    max_age_seconds: i64,
) -> Cookie<'static> {
    Cookie::build(name.to_string(), value.to_string())
        .http_only(true)
        .secure(config.secure)
        .same_site(same_site(config))
        .path(config.path.clone())
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

fn removal_cookie(config: &CookieConfig, name: &str) -> Cookie<'static> {
    Cookie::build(name.to_string(), String::new())
        .http_only(true)
        .secure(config.secure)
        .same_site(same_site(config))
        .path(config.path.clone())
        .max_age(Duration::ZERO)
        .finish()
}

/// Cookies carrying a freshly issued pair
pub fn session_cookies(config: &CookieConfig, tokens: &TokenPair) -> [Cookie<'static>; 2] {
    [
        session_cookie(
            config,
            &config.access_cookie_name,
            &tokens.access_token,
            tokens.access_expires_in,
        ),
        session_cookie(
            config,
            &config.refresh_cookie_name,
            &tokens.refresh_token,
            tokens.refresh_expires_in,
        ),
    ]
}

/// Cookies that make the browser drop both session cookies
pub fn cleared_cookies(config: &CookieConfig) -> [Cookie<'static>; 2] {
    [
        removal_cookie(config, &config.access_cookie_name),
        removal_cookie(config, &config.refresh_cookie_name),
    ]
}

/// Replace an already built response's session cookies with removals
pub fn clear_session_cookies(mut response: HttpResponse, config: &CookieConfig) -> HttpResponse {
    for cookie in cleared_cookies(config) {
        if let Err(e) = response.add_cookie(&cookie) {
            tracing::warn!(error = %e, "Failed to attach cookie removal");
        }
    }
    response
}
