/// HTTP middleware utilities for blog-service
///
/// `SessionAuth` resolves the session token (cookie or Bearer header) into an
/// `AuthUser` stored in request extensions. It never rejects a request: a
/// missing or invalid token simply leaves the request anonymous. Handlers then
/// take a `RequestContext`, which bundles that identity with the request path
/// and the raw `page` query parameter.
pub mod permissions;

pub use permissions::*;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use serde::Deserialize;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::error::AppError;
use crate::security::AuthUser;
use crate::AppState;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

// =====================================================================
// Session authentication
// =====================================================================

/// Actix middleware that attaches the signed-in user, if any.
pub struct SessionAuth;

impl<S, B> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthService {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionAuthService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthService<S>
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
        let service = self.service.clone();

        Box::pin(async move {
            let user = session_token(req.request()).and_then(|token| {
                req.app_data::<web::Data<AppState>>()
                    .and_then(|state| state.sessions.verify(&token))
            });

            if let Some(user) = user {
                req.extensions_mut().insert(user);
            }

            service.call(req).await
        })
    }
}

/// Session token from the cookie, falling back to a Bearer header.
fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

// =====================================================================
// Request context
// =====================================================================

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<String>,
}

/// Per-request view of who is acting and what was asked for.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: Option<AuthUser>,
    /// Path plus query string, used as the `next` target for login
    pub full_path: String,
    /// Raw `page` query parameter; resolved by the paginator
    pub page: Option<String>,
}

impl RequestContext {
    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }

    /// The signed-in user, or a redirect to the login page.
    pub fn require_user(&self) -> Result<&AuthUser, AppError> {
        self.user.as_ref().ok_or_else(|| AppError::Unauthenticated {
            next: self.full_path.clone(),
        })
    }
}

impl FromRequest for RequestContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let page = web::Query::<PageQuery>::from_query(req.query_string())
            .ok()
            .and_then(|q| q.into_inner().page);

        let full_path = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.path().to_string());

        ready(Ok(RequestContext {
            user: req.extensions().get::<AuthUser>().cloned(),
            full_path,
            page,
        }))
    }
}
