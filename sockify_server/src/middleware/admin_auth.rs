//! Admin authentication middleware.
//! This middleware can be placed on any route or scope.
//!
//! It looks for an access token in the `Authorization: Bearer` header, falling back to a `token` query parameter. A
//! valid token's [`AdminClaims`] are stored in the request extensions, where handlers pick them up. Requests without a
//! valid token are answered with 401 Unauthorized.
//!
//! When authentication is disabled in the configuration, every request is let through as the configured dev admin.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web,
    Error,
    HttpMessage,
};
use chrono::Duration;
use futures::{
    future::{ok, Ready},
    Future,
};
use log::*;
use serde::Deserialize;

use crate::{
    auth::{validate_admin_token, AdminClaims},
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

pub struct AdminAuthMiddlewareFactory {
    config: Rc<AuthConfig>,
}

impl AdminAuthMiddlewareFactory {
    pub fn new(config: AuthConfig) -> Self {
        AdminAuthMiddlewareFactory { config: Rc::new(config) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AdminAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AdminAuthMiddlewareService { config: Rc::clone(&self.config), service: Rc::new(service) })
    }
}

pub struct AdminAuthMiddlewareService<S> {
    config: Rc<AuthConfig>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let config = Rc::clone(&self.config);
        Box::pin(async move {
            let claims = if config.disable_auth {
                trace!("🔐️ Authentication is disabled. Acting as admin #{}", config.dev_admin_id);
                AdminClaims::new(config.dev_admin_id, Duration::minutes(5))
            } else {
                let token = access_token(&req).ok_or_else(|| {
                    debug!("🔐️ No access token in request for {}", req.path());
                    ServerError::AuthenticationError(AuthError::MissingToken)
                })?;
                validate_admin_token(&token, &config).map_err(|e| {
                    debug!("🔐️ Rejected access token for {}. {e}", req.path());
                    ServerError::AuthenticationError(e)
                })?
            };
            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn access_token(req: &ServiceRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(|v| v.trim().to_string());
    from_header.or_else(|| {
        web::Query::<TokenQuery>::from_query(req.query_string()).ok().and_then(|q| q.into_inner().token)
    })
    .filter(|t| !t.is_empty())
}
