//! Request interception in front of every route.
//!
//! Each request is classified by path, the session cookie is checked once,
//! and [`decide`] picks what happens. The decision table is pure so it can be
//! tested without a server.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use super::session::{SessionKeys, TokenCheck};

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// `/login`, `/register`
    AuthPage,
    /// `/api/auth/*`
    AuthHandshake,
    /// Anything else starting with `/api`; handlers answer 401 themselves.
    Api,
    Asset,
    Protected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Allow, and mark the response as not cacheable.
    AllowNoStore,
    RedirectToLogin,
    RedirectToDashboard,
}

pub fn classify(path: &str) -> RouteKind {
    let trimmed = match path.trim_end_matches('/') {
        "" => "/",
        p => p,
    };
    if trimmed == LOGIN_PATH || trimmed == REGISTER_PATH {
        RouteKind::AuthPage
    } else if path.starts_with("/api/auth/") {
        RouteKind::AuthHandshake
    } else if path.starts_with("/api") {
        RouteKind::Api
    } else if path.starts_with("/_next/static/")
        || path.starts_with("/_next/image")
        || path.starts_with("/assets/")
        || path == "/favicon.ico"
    {
        RouteKind::Asset
    } else {
        RouteKind::Protected
    }
}

pub fn decide(kind: RouteKind, authenticated: bool) -> GuardDecision {
    match (kind, authenticated) {
        (RouteKind::AuthPage, true) => GuardDecision::RedirectToDashboard,
        (RouteKind::AuthPage, false) => GuardDecision::Allow,
        (RouteKind::AuthHandshake | RouteKind::Api | RouteKind::Asset, _) => GuardDecision::Allow,
        (RouteKind::Protected, false) => GuardDecision::RedirectToLogin,
        (RouteKind::Protected, true) => GuardDecision::AllowNoStore,
    }
}

/// Keeps the browser from resurfacing protected pages through history.
pub fn apply_no_store(headers: &mut HeaderMap) {
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
}

pub async fn route_guard(
    State(keys): State<SessionKeys>,
    mut request: Request,
    next: Next,
) -> Response {
    let kind = classify(request.uri().path());
    let identity = match keys.check(request.headers()) {
        TokenCheck::Valid(identity) => Some(identity),
        TokenCheck::Missing => None,
        TokenCheck::Rejected => {
            debug!(path = %request.uri().path(), "invalid session cookie treated as anonymous");
            None
        }
    };

    match decide(kind, identity.is_some()) {
        GuardDecision::RedirectToLogin => {
            debug!(path = %request.uri().path(), "guard: redirect to login");
            let mut res = Redirect::temporary(LOGIN_PATH).into_response();
            apply_no_store(res.headers_mut());
            res
        }
        GuardDecision::RedirectToDashboard => {
            Redirect::temporary(DASHBOARD_PATH).into_response()
        }
        decision => {
            if let Some(identity) = identity {
                request.extensions_mut().insert(identity);
            }
            let mut res = next.run(request).await;
            if decision == GuardDecision::AllowNoStore {
                apply_no_store(res.headers_mut());
            }
            res
        }
    }
}
