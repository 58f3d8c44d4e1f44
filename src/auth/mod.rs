use crate::state::AppState;
use axum::Router;

mod claims;
pub mod credentials;
pub(crate) mod dto;
pub mod extractors;
pub mod guard;
pub mod handlers;
pub mod session;

pub use claims::Identity;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
