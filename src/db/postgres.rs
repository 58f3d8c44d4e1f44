use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    CadastroDetalhado, CadastroResumo, Categoria, CategoriaRefs, Repository, StoreError,
    StoreResult, User,
};

#[derive(Clone)]
pub struct PgRepository {
    db: PgPool,
}

impl PgRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.db)
            .await
            .context("ping database")?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, nome, email, password_hash, created_at
            FROM usuarios
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, nome: &str, email: &str, password_hash: &str) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO usuarios (nome, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, nome, email, password_hash, created_at
            "#,
        )
        .bind(nome)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn count_users(&self) -> StoreResult<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM usuarios")
            .fetch_one(&self.db)
            .await?;
        Ok(n)
    }

    async fn upsert_categoria(&self, categoria: Categoria, nome: &str) -> StoreResult<Uuid> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let sql = format!(
            "INSERT INTO {} (nome) VALUES ($1) \
             ON CONFLICT (nome) DO UPDATE SET nome = EXCLUDED.nome \
             RETURNING id",
            categoria.table()
        );
        let (id,): (Uuid,) = sqlx::query_as(&sql)
            .bind(nome)
            .fetch_one(&self.db)
            .await
            .map_err(StoreError::from)?;
        Ok(id)
    }

    async fn count_categoria(&self, categoria: Categoria) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", categoria.table());
        let (n,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.db).await?;
        Ok(n)
    }

    async fn insert_cadastro(
        &self,
        usuario_id: Uuid,
        nome_cadastro: &str,
        refs: CategoriaRefs,
    ) -> StoreResult<CadastroResumo> {
        let row = sqlx::query_as::<_, CadastroResumo>(
            r#"
            INSERT INTO cadastros_aco
                (nome_cadastro, usuario_id, composicao_id, formato_id, norma_tecnica_id, acabamento_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, nome_cadastro
            "#,
        )
        .bind(nome_cadastro)
        .bind(usuario_id)
        .bind(refs.composicao_id)
        .bind(refs.formato_id)
        .bind(refs.norma_tecnica_id)
        .bind(refs.acabamento_id)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn cadastro_exists(&self, id: Uuid, usuario_id: Uuid) -> StoreResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM cadastros_aco WHERE id = $1 AND usuario_id = $2)",
        )
        .bind(id)
        .bind(usuario_id)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn update_cadastro(
        &self,
        id: Uuid,
        usuario_id: Uuid,
        nome_cadastro: &str,
        refs: CategoriaRefs,
    ) -> StoreResult<Option<CadastroResumo>> {
        let row = sqlx::query_as::<_, CadastroResumo>(
            r#"
            UPDATE cadastros_aco
               SET nome_cadastro = $3,
                   composicao_id = $4,
                   formato_id = $5,
                   norma_tecnica_id = $6,
                   acabamento_id = $7
             WHERE id = $1 AND usuario_id = $2
            RETURNING id, nome_cadastro
            "#,
        )
        .bind(id)
        .bind(usuario_id)
        .bind(nome_cadastro)
        .bind(refs.composicao_id)
        .bind(refs.formato_id)
        .bind(refs.norma_tecnica_id)
        .bind(refs.acabamento_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete_cadastro(&self, id: Uuid, usuario_id: Uuid) -> StoreResult<u64> {
        let res = sqlx::query("DELETE FROM cadastros_aco WHERE id = $1 AND usuario_id = $2")
            .bind(id)
            .bind(usuario_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected())
    }

    async fn list_cadastros(&self, usuario_id: Uuid) -> StoreResult<Vec<CadastroDetalhado>> {
        let rows = sqlx::query_as::<_, CadastroDetalhado>(
            r#"
            SELECT c.id,
                   c.nome_cadastro,
                   co.nome AS composicao,
                   f.nome  AS formato,
                   n.nome  AS norma_tecnica,
                   a.nome  AS acabamento,
                   c.data_criacao
              FROM cadastros_aco c
              JOIN composicoes co              ON co.id = c.composicao_id
              JOIN formatos f                  ON f.id  = c.formato_id
              JOIN normas_tecnicas n           ON n.id  = c.norma_tecnica_id
              JOIN acabamentos_superficiais a  ON a.id  = c.acabamento_id
             WHERE c.usuario_id = $1
             ORDER BY c.data_criacao DESC
            "#,
        )
        .bind(usuario_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
