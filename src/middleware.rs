use crate::auth::{AuthService, TokenIssuer};
use crate::error::AppError;
use crate::models::{Claims, User};
use actix_service::{forward_ready, Service};
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::HeaderValue;
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;

/// Why a presented credential was not accepted.
#[derive(Debug, Clone)]
pub struct AuthRejection(pub String);

/// Verifies bearer tokens and records the outcome in the request extensions.
///
/// Requests without an `Authorization` header pass through untouched, so the
/// middleware can wrap public routes too; handlers that need an identity ask
/// for a `CurrentUser`.
pub struct AuthMiddleware {
    tokens: TokenIssuer,
}

impl AuthMiddleware {
    pub fn new(tokens: TokenIssuer) -> Self {
        AuthMiddleware { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();

    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    tokens: TokenIssuer,
}

fn check_header(tokens: &TokenIssuer, header: &HeaderValue) -> Result<Claims, AuthRejection> {
    let auth_str = header
        .to_str()
        .map_err(|_| AuthRejection("Invalid authorization header".into()))?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthRejection("Invalid authorization scheme".into()))?;
    tokens
        .verify(token.trim())
        .map_err(|_| AuthRejection("Not authorized, token failed".into()))
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = req
            .headers()
            .get("Authorization")
            .map(|header| check_header(&self.tokens, header));
        match outcome {
            Some(Ok(claims)) => {
                req.extensions_mut().insert(claims);
            }
            Some(Err(rejection)) => {
                log::debug!("Rejected credential on {}: {}", req.path(), rejection.0);
                req.extensions_mut().insert(rejection);
            }
            None => {}
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

/// The authenticated caller, resolved from the verified token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let rejection = req.extensions().get::<AuthRejection>().cloned();
        let auth = req.app_data::<web::Data<AuthService>>().cloned();

        Box::pin(async move {
            let auth =
                auth.ok_or_else(|| AppError::Internal("auth service not configured".into()))?;
            match (claims, rejection) {
                (Some(claims), _) => auth.resolve(&claims).await.map(CurrentUser),
                (None, Some(rejection)) => Err(AppError::Unauthorized(rejection.0)),
                (None, None) => Err(AppError::Unauthorized("Not authorized, no token".into())),
            }
        })
    }
}
