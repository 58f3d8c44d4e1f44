use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use super::{claims::Identity, session::SessionKeys};
use crate::error::AppError;

/// The signed-in caller. Uses the identity the route guard attached; falls
/// back to checking the cookie when the handler runs without the guard.
#[derive(Debug)]
pub struct CurrentUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(CurrentUser(identity.clone()));
        }
        SessionKeys::from_ref(state)
            .check(&parts.headers)
            .identity()
            .map(CurrentUser)
            .ok_or(AppError::Unauthenticated)
    }
}

/// Like [`CurrentUser`] but never rejects.
#[derive(Debug)]
pub struct MaybeUser(pub Option<Identity>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await.ok();
        Ok(MaybeUser(user.map(|CurrentUser(identity)| identity)))
    }
}
