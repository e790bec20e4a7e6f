use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::dto::SessionsResponse;
use crate::handlers::handle_domain_error;
use crate::middleware::AuthContext;

/// Handler for GET /api/v1/auth/sessions
pub async fn sessions(state: web::Data<AppState>, auth: AuthContext) -> HttpResponse {
    match state.session_service.active_sessions(auth.user_id).await {
        Ok(active_sessions) => HttpResponse::Ok().json(SessionsResponse { active_sessions }),
        Err(error) => handle_domain_error(&error),
    }
}
