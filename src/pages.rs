//! Bare HTML shells for the browser routes. The real UI is served elsewhere;
//! these give the route guard concrete pages to protect.

use axum::{
    response::{Html, Redirect},
    routing::get,
    Router,
};

use crate::auth::guard::DASHBOARD_PATH;
use crate::state::AppState;

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::temporary(DASHBOARD_PATH) }))
        .route("/login", get(|| async { shell("Entrar") }))
        .route("/login/", get(|| async { shell("Entrar") }))
        .route("/register", get(|| async { shell("Criar conta") }))
        .route("/register/", get(|| async { shell("Criar conta") }))
        .route("/dashboard", get(|| async { shell("Cadastros") }))
        .route("/grafico", get(|| async { shell("Gráficos") }))
}

fn shell(title: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html lang=\"pt-BR\"><head><meta charset=\"utf-8\">\
         <title>{title}</title></head><body><div id=\"app\" data-page=\"{title}\"></div></body></html>"
    ))
}
