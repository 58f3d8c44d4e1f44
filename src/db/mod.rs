//! Store boundary. Handlers and services only see [`Repository`]; the
//! Postgres and in-memory implementations live in the submodules.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.code().as_deref() == Some("23505") {
                return StoreError::UniqueViolation;
            }
        }
        StoreError::Other(e.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// The four lookup tables a cadastro points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Categoria {
    Composicao,
    Formato,
    NormaTecnica,
    Acabamento,
}

impl Categoria {
    pub const ALL: [Categoria; 4] = [
        Categoria::Composicao,
        Categoria::Formato,
        Categoria::NormaTecnica,
        Categoria::Acabamento,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Categoria::Composicao => "composicoes",
            Categoria::Formato => "formatos",
            Categoria::NormaTecnica => "normas_tecnicas",
            Categoria::Acabamento => "acabamentos_superficiais",
        }
    }
}

/// Resolved lookup ids for one cadastro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoriaRefs {
    pub composicao_id: Uuid,
    pub formato_id: Uuid,
    pub norma_tecnica_id: Uuid,
    pub acabamento_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CadastroResumo {
    pub id: Uuid,
    pub nome_cadastro: String,
}

/// A cadastro with its category names joined in.
#[derive(Debug, Clone, FromRow)]
pub struct CadastroDetalhado {
    pub id: Uuid,
    pub nome_cadastro: String,
    pub composicao: String,
    pub formato: String,
    pub norma_tecnica: String,
    pub acabamento: String,
    pub data_criacao: OffsetDateTime,
}

#[async_trait]
pub trait Repository: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn create_user(&self, nome: &str, email: &str, password_hash: &str) -> StoreResult<User>;
    async fn count_users(&self) -> StoreResult<i64>;

    /// Returns the id of the row named `nome`, creating it on first use.
    async fn upsert_categoria(&self, categoria: Categoria, nome: &str) -> StoreResult<Uuid>;
    async fn count_categoria(&self, categoria: Categoria) -> StoreResult<i64>;

    async fn insert_cadastro(
        &self,
        usuario_id: Uuid,
        nome_cadastro: &str,
        refs: CategoriaRefs,
    ) -> StoreResult<CadastroResumo>;
    async fn cadastro_exists(&self, id: Uuid, usuario_id: Uuid) -> StoreResult<bool>;
    /// `None` when no row with `id` is owned by `usuario_id`.
    async fn update_cadastro(
        &self,
        id: Uuid,
        usuario_id: Uuid,
        nome_cadastro: &str,
        refs: CategoriaRefs,
    ) -> StoreResult<Option<CadastroResumo>>;
    /// Single filtered delete; returns the number of rows removed.
    async fn delete_cadastro(&self, id: Uuid, usuario_id: Uuid) -> StoreResult<u64>;
    /// Newest first.
    async fn list_cadastros(&self, usuario_id: Uuid) -> StoreResult<Vec<CadastroDetalhado>>;
}
