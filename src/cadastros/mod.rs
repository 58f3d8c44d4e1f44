mod dto;
pub mod handlers;
pub mod services;
pub mod stats;

pub use dto::{CadastroCampos, CadastroInput};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::cadastro_routes()
}
