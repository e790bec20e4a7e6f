//! Application state and factory

use std::sync::Arc;

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use cp_core::repositories::UserRepository;
use cp_core::services::auth::{AuthService, AuthServiceConfig};
use cp_core::services::session::SessionService;
use cp_core::services::token::TokenIssuer;
use cp_shared::{error_codes, CookieConfig, ErrorResponse};

use crate::middleware::JwtAuth;
use crate::routes::auth::{login, logout, logout_all, me, refresh, sessions, signup};

/// Shared application state
///
/// The repository is chosen at startup, so services work over a trait object.
pub struct AppState {
    pub auth_service: Arc<AuthService<dyn UserRepository>>,
    pub session_service: Arc<SessionService<dyn UserRepository>>,
    pub cookies: CookieConfig,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        issuer: TokenIssuer,
        auth_config: AuthServiceConfig,
        cookies: CookieConfig,
    ) -> Self {
        let session_service = Arc::new(SessionService::new(repository.clone(), Arc::new(issuer)));
        let auth_service = Arc::new(AuthService::new(
            repository,
            session_service.clone(),
            auth_config,
        ));
        Self {
            auth_service,
            session_service,
            cookies,
        }
    }
}

/// Create and configure the application
pub fn create_app(
    app_state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(ErrorResponse::new(
                error_codes::VALIDATION_ERROR,
                err.to_string(),
            ));
            actix_web::error::InternalError::from_response(err, response).into()
        }))
        .wrap(TracingLogger::default())
        .service(
            web::scope("/api/v1")
                .route("/health", web::get().to(health_check))
                .service(
                    web::scope("/auth")
                        .route("/signup", web::post().to(signup::signup))
                        .route("/login", web::post().to(login::login))
                        .route("/refresh", web::post().to(refresh::refresh))
                        .route("/logout", web::post().to(logout::logout))
                        .route(
                            "/logout-all",
                            web::post().to(logout_all::logout_all).wrap(JwtAuth::new()),
                        )
                        .route("/me", web::get().to(me::me).wrap(JwtAuth::new()))
                        .route(
                            "/sessions",
                            web::get().to(sessions::sessions).wrap(JwtAuth::new()),
                        ),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "careerpilot-session",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
