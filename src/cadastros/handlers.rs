use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use super::dto::{CadastroInput, CadastroItem, CadastroList, CadastroSaved};
use super::services;
use super::stats::Estatisticas;
use crate::{
    auth::{dto::MessageResponse, extractors::CurrentUser},
    error::AppError,
    state::AppState,
};

pub fn cadastro_routes() -> Router<AppState> {
    Router::new()
        .route("/api/cadastros", get(list_cadastros).post(create_cadastro))
        .route("/api/cadastros/estatisticas", get(estatisticas))
        .route(
            "/api/cadastros/:id",
            put(update_cadastro).delete(delete_cadastro),
        )
}

#[instrument(skip(state))]
pub async fn list_cadastros(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CadastroList>, AppError> {
    let rows = services::list(state.repo.as_ref(), &user).await?;
    Ok(Json(CadastroList {
        cadastros: rows.into_iter().map(CadastroItem::from).collect(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_cadastro(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CadastroInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CadastroSaved>), AppError> {
    let Json(input) = payload?;
    let cadastro = services::create(state.repo.as_ref(), &user, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CadastroSaved {
            message: "Cadastro criado com sucesso".into(),
            cadastro: cadastro.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_cadastro(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<CadastroInput>, JsonRejection>,
) -> Result<Json<CadastroSaved>, AppError> {
    let Json(input) = payload?;
    let id = services::parse_id(&id)?;
    let cadastro = services::update(state.repo.as_ref(), &user, id, input).await?;
    Ok(Json(CadastroSaved {
        message: "Cadastro atualizado com sucesso".into(),
        cadastro: cadastro.into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_cadastro(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = services::parse_id(&id)?;
    services::delete(state.repo.as_ref(), &user, id).await?;
    Ok(Json(MessageResponse {
        message: "Cadastro excluído com sucesso".into(),
    }))
}

#[instrument(skip(state))]
pub async fn estatisticas(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Estatisticas>, AppError> {
    Ok(Json(services::statistics(state.repo.as_ref(), &user).await?))
}
