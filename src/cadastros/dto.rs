use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{CadastroDetalhado, CadastroResumo};
use crate::error::AppError;

/// Body of `POST /api/cadastros` and `PUT /api/cadastros/{id}`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CadastroInput {
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub composicao: Option<String>,
    #[serde(default)]
    pub formato: Option<String>,
    #[serde(default)]
    pub norma_tecnica: Option<String>,
    #[serde(default)]
    pub acabamento: Option<String>,
}

/// A [`CadastroInput`] with every field present and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CadastroCampos {
    pub nome: String,
    pub composicao: String,
    pub formato: String,
    pub norma_tecnica: String,
    pub acabamento: String,
}

impl CadastroInput {
    pub fn validate(self) -> Result<CadastroCampos, AppError> {
        fn field(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        match (
            field(self.nome),
            field(self.composicao),
            field(self.formato),
            field(self.norma_tecnica),
            field(self.acabamento),
        ) {
            (Some(nome), Some(composicao), Some(formato), Some(norma_tecnica), Some(acabamento)) => {
                Ok(CadastroCampos {
                    nome,
                    composicao,
                    formato,
                    norma_tecnica,
                    acabamento,
                })
            }
            _ => Err(AppError::Validation("Todos os campos são obrigatórios".into())),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CadastroRef {
    pub id: Uuid,
    pub nome_cadastro: String,
}

impl From<CadastroResumo> for CadastroRef {
    fn from(r: CadastroResumo) -> Self {
        Self {
            id: r.id,
            nome_cadastro: r.nome_cadastro,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CadastroSaved {
    pub message: String,
    pub cadastro: CadastroRef,
}

#[derive(Debug, Serialize)]
pub struct Nome {
    pub nome: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CadastroItem {
    pub id: Uuid,
    pub nome_cadastro: String,
    pub composicao: Nome,
    pub formato: Nome,
    pub norma_tecnica: Nome,
    pub acabamento: Nome,
}

impl From<CadastroDetalhado> for CadastroItem {
    fn from(c: CadastroDetalhado) -> Self {
        Self {
            id: c.id,
            nome_cadastro: c.nome_cadastro,
            composicao: Nome { nome: c.composicao },
            formato: Nome { nome: c.formato },
            norma_tecnica: Nome { nome: c.norma_tecnica },
            acabamento: Nome { nome: c.acabamento },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CadastroList {
    pub cadastros: Vec<CadastroItem>,
}
