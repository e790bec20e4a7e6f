use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::handlers::handle_domain_error;
use crate::middleware::AuthContext;

/// Handler for GET /api/v1/auth/me
pub async fn me(state: web::Data<AppState>, auth: AuthContext) -> HttpResponse {
    match state.auth_service.current_user(auth.user_id).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(error) => handle_domain_error(&error),
    }
}
