use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    CadastroDetalhado, CadastroResumo, Categoria, CategoriaRefs, Repository, StoreError,
    StoreResult, User,
};

struct CadastroRow {
    id: Uuid,
    usuario_id: Uuid,
    nome_cadastro: String,
    refs: CategoriaRefs,
    data_criacao: OffsetDateTime,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    categorias: HashMap<Categoria, Vec<(Uuid, String)>>,
    // insertion order; newest last
    cadastros: Vec<CadastroRow>,
}

impl Tables {
    fn categoria_nome(&self, categoria: Categoria, id: Uuid) -> StoreResult<String> {
        self.categorias
            .get(&categoria)
            .and_then(|rows| rows.iter().find(|(rid, _)| *rid == id))
            .map(|(_, nome)| nome.clone())
            .ok_or_else(|| {
                StoreError::Other(anyhow::anyhow!(
                    "dangling {} reference {id}",
                    categoria.table()
                ))
            })
    }
}

/// Process-local [`Repository`] with the same uniqueness and ownership rules
/// as the Postgres schema.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, nome: &str, email: &str, password_hash: &str) -> StoreResult<User> {
        let mut t = self.tables.lock().await;
        if t.users.iter().any(|u| u.email == email) {
            return Err(StoreError::UniqueViolation);
        }
        let user = User {
            id: Uuid::new_v4(),
            nome: nome.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn count_users(&self) -> StoreResult<i64> {
        Ok(self.tables.lock().await.users.len() as i64)
    }

    async fn upsert_categoria(&self, categoria: Categoria, nome: &str) -> StoreResult<Uuid> {
        let mut t = self.tables.lock().await;
        let rows = t.categorias.entry(categoria).or_default();
        if let Some((id, _)) = rows.iter().find(|(_, n)| n == nome) {
            return Ok(*id);
        }
        let id = Uuid::new_v4();
        rows.push((id, nome.to_string()));
        Ok(id)
    }

    async fn count_categoria(&self, categoria: Categoria) -> StoreResult<i64> {
        let t = self.tables.lock().await;
        Ok(t.categorias.get(&categoria).map_or(0, |rows| rows.len() as i64))
    }

    async fn insert_cadastro(
        &self,
        usuario_id: Uuid,
        nome_cadastro: &str,
        refs: CategoriaRefs,
    ) -> StoreResult<CadastroResumo> {
        let mut t = self.tables.lock().await;
        let row = CadastroRow {
            id: Uuid::new_v4(),
            usuario_id,
            nome_cadastro: nome_cadastro.to_string(),
            refs,
            data_criacao: OffsetDateTime::now_utc(),
        };
        let resumo = CadastroResumo {
            id: row.id,
            nome_cadastro: row.nome_cadastro.clone(),
        };
        t.cadastros.push(row);
        Ok(resumo)
    }

    async fn cadastro_exists(&self, id: Uuid, usuario_id: Uuid) -> StoreResult<bool> {
        let t = self.tables.lock().await;
        Ok(t
            .cadastros
            .iter()
            .any(|c| c.id == id && c.usuario_id == usuario_id))
    }

    async fn update_cadastro(
        &self,
        id: Uuid,
        usuario_id: Uuid,
        nome_cadastro: &str,
        refs: CategoriaRefs,
    ) -> StoreResult<Option<CadastroResumo>> {
        let mut t = self.tables.lock().await;
        let Some(row) = t
            .cadastros
            .iter_mut()
            .find(|c| c.id == id && c.usuario_id == usuario_id)
        else {
            return Ok(None);
        };
        row.nome_cadastro = nome_cadastro.to_string();
        row.refs = refs;
        Ok(Some(CadastroResumo {
            id: row.id,
            nome_cadastro: row.nome_cadastro.clone(),
        }))
    }

    async fn delete_cadastro(&self, id: Uuid, usuario_id: Uuid) -> StoreResult<u64> {
        let mut t = self.tables.lock().await;
        let before = t.cadastros.len();
        t.cadastros
            .retain(|c| !(c.id == id && c.usuario_id == usuario_id));
        Ok((before - t.cadastros.len()) as u64)
    }

    async fn list_cadastros(&self, usuario_id: Uuid) -> StoreResult<Vec<CadastroDetalhado>> {
        let t = self.tables.lock().await;
        t.cadastros
            .iter()
            .rev()
            .filter(|c| c.usuario_id == usuario_id)
            .map(|c| {
                Ok(CadastroDetalhado {
                    id: c.id,
                    nome_cadastro: c.nome_cadastro.clone(),
                    composicao: t.categoria_nome(Categoria::Composicao, c.refs.composicao_id)?,
                    formato: t.categoria_nome(Categoria::Formato, c.refs.formato_id)?,
                    norma_tecnica: t
                        .categoria_nome(Categoria::NormaTecnica, c.refs.norma_tecnica_id)?,
                    acabamento: t.categoria_nome(Categoria::Acabamento, c.refs.acabamento_id)?,
                    data_criacao: c.data_criacao,
                })
            })
            .collect()
    }
}
