//! Access token authentication for protected endpoints.
//!
//! The middleware reads the access token from the `Authorization: Bearer`
//! header, falling back to the access token cookie, verifies it with the
//! app's token issuer and injects an [`AuthContext`] into the request.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
};
use uuid::Uuid;

use cp_core::domain::entities::token::AccessClaims;
use cp_core::errors::{DomainError, TokenError};

use crate::app::AppState;
use crate::handlers::handle_domain_error;

/// User authentication context injected into requests
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User ID extracted from the token subject
    pub user_id: Uuid,
    /// Email at the time the token was issued
    pub email: String,
}

impl AuthContext {
    /// Creates a new authentication context from verified claims
    pub fn from_claims(claims: AccessClaims) -> Result<Self, DomainError> {
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidToken))?;
        Ok(Self {
            user_id,
            email: claims.email,
        })
    }
}

/// Access token authentication middleware factory
#[derive(Default)]
pub struct JwtAuth;

impl JwtAuth {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Access token authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            match authenticate(&req) {
                Ok(auth_context) => {
                    req.extensions_mut().insert(auth_context);
                    let response = service.call(req).await?;
                    Ok(response.map_into_left_body())
                }
                Err(error) => {
                    tracing::debug!(error = %error, "Rejected request without valid access token");
                    let response = handle_domain_error(&error);
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

fn authenticate(req: &ServiceRequest) -> Result<AuthContext, DomainError> {
    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| DomainError::Internal {
        message: "Application state is not configured".to_string(),
    })?;

    let token = extract_bearer_token(req)
        .or_else(|| {
            req.cookie(&state.cookies.access_cookie_name)
                .map(|c| c.value().to_string())
        })
        .ok_or(DomainError::Token(TokenError::InvalidToken))?;

    let claims = state.session_service.issuer().verify_access_token(&token)?;
    AuthContext::from_claims(claims)
}

/// Extracts Bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ErrorUnauthorized("Authentication required"));

        ready(result)
    }
}
