pub mod app;
pub mod auth;
pub mod cadastros;
pub mod config;
pub mod db;
pub mod error;
pub mod health;
pub mod pages;
pub mod seed;
pub mod state;

pub use app::{build_app, init_tracing, serve};
pub use state::AppState;
