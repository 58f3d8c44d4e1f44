use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        credentials::{hash_password, normalize_email, verify_credentials},
        dto::{
            LoginRequest, MessageResponse, PublicUser, RegisterRequest, RegisterResponse,
            SessionResponse,
        },
        extractors::MaybeUser,
    },
    db::StoreError,
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/session", get(session))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn present(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let Json(payload) = payload?;
    // passwords are taken verbatim, only emptiness is checked
    let senha = payload.senha.filter(|s| !s.is_empty());
    let (Some(nome), Some(email), Some(senha)) =
        (present(payload.nome), present(payload.email), senha)
    else {
        warn!("register with missing fields");
        return Err(AppError::Validation(
            "Nome, email e senha são obrigatórios".into(),
        ));
    };

    let email = normalize_email(&email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Email inválido".into()));
    }

    if state.repo.find_user_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email já cadastrado".into()));
    }

    let hash = hash_password(&senha)?;

    let user = match state.repo.create_user(&nome, &email, &hash).await {
        Ok(u) => u,
        Err(StoreError::UniqueViolation) => {
            warn!(email = %email, "email registered concurrently");
            return Err(AppError::Conflict("Email já cadastrado".into()));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Usuário criado com sucesso".into(),
            usuario: PublicUser {
                id: user.id,
                nome: user.nome,
                email: user.email,
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    let identity = verify_credentials(
        state.repo.as_ref(),
        payload.email.as_deref(),
        payload.senha.as_deref(),
    )
    .await?;

    let token = state.session.issue(&identity)?;
    let cookie = state.session.session_cookie(&token);

    info!(user_id = %identity.id, email = %identity.email, "user logged in");
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse {
            usuario: identity.into(),
        }),
    )
        .into_response())
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        [(header::SET_COOKIE, state.session.clear_cookie())],
        Json(MessageResponse {
            message: "Sessão encerrada".into(),
        }),
    )
        .into_response()
}

pub async fn session(MaybeUser(user): MaybeUser) -> Json<Option<SessionResponse>> {
    Json(user.map(|identity| SessionResponse {
        usuario: identity.into(),
    }))
}
