use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{CadastroCampos, CadastroInput};
use super::stats::{aggregate, Estatisticas};
use crate::auth::Identity;
use crate::db::{CadastroDetalhado, CadastroResumo, Categoria, CategoriaRefs, Repository};
use crate::error::AppError;

/// Unknown and malformed ids are answered the same way as foreign ones.
pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFoundOrForbidden)
}

/// Find-or-create the four lookup rows. Each upsert is atomic on its own;
/// nothing spans them, so a failure here can only leave unused lookup rows.
pub async fn resolve_refs(
    repo: &dyn Repository,
    campos: &CadastroCampos,
) -> Result<CategoriaRefs, AppError> {
    let (composicao_id, formato_id, norma_tecnica_id, acabamento_id) = tokio::try_join!(
        repo.upsert_categoria(Categoria::Composicao, &campos.composicao),
        repo.upsert_categoria(Categoria::Formato, &campos.formato),
        repo.upsert_categoria(Categoria::NormaTecnica, &campos.norma_tecnica),
        repo.upsert_categoria(Categoria::Acabamento, &campos.acabamento),
    )?;
    Ok(CategoriaRefs {
        composicao_id,
        formato_id,
        norma_tecnica_id,
        acabamento_id,
    })
}

pub async fn create(
    repo: &dyn Repository,
    owner: &Identity,
    input: CadastroInput,
) -> Result<CadastroResumo, AppError> {
    let campos = input.validate()?;
    let refs = resolve_refs(repo, &campos).await?;
    let cadastro = repo.insert_cadastro(owner.id, &campos.nome, refs).await?;
    info!(user_id = %owner.id, cadastro_id = %cadastro.id, "cadastro created");
    Ok(cadastro)
}

pub async fn update(
    repo: &dyn Repository,
    owner: &Identity,
    id: Uuid,
    input: CadastroInput,
) -> Result<CadastroResumo, AppError> {
    let campos = input.validate()?;

    // checked first so a foreign id never creates lookup rows
    if !repo.cadastro_exists(id, owner.id).await? {
        warn!(user_id = %owner.id, cadastro_id = %id, "update of missing or foreign cadastro");
        return Err(AppError::NotFoundOrForbidden);
    }

    let refs = resolve_refs(repo, &campos).await?;
    let cadastro = repo
        .update_cadastro(id, owner.id, &campos.nome, refs)
        .await?
        .ok_or(AppError::NotFoundOrForbidden)?;
    info!(user_id = %owner.id, cadastro_id = %id, "cadastro updated");
    Ok(cadastro)
}

pub async fn delete(repo: &dyn Repository, owner: &Identity, id: Uuid) -> Result<(), AppError> {
    if repo.delete_cadastro(id, owner.id).await? == 0 {
        warn!(user_id = %owner.id, cadastro_id = %id, "delete of missing or foreign cadastro");
        return Err(AppError::NotFoundOrForbidden);
    }
    info!(user_id = %owner.id, cadastro_id = %id, "cadastro deleted");
    Ok(())
}

pub async fn list(
    repo: &dyn Repository,
    owner: &Identity,
) -> Result<Vec<CadastroDetalhado>, AppError> {
    Ok(repo.list_cadastros(owner.id).await?)
}

pub async fn statistics(repo: &dyn Repository, owner: &Identity) -> Result<Estatisticas, AppError> {
    let cadastros = repo.list_cadastros(owner.id).await?;
    Ok(aggregate(&cadastros))
}
