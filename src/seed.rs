use tracing::info;

use crate::db::{Categoria, Repository, StoreResult};

pub const COMPOSICOES: [&str; 4] = [
    "Aço Carbono Comum",
    "Aço Inoxidável",
    "Aço de Baixa Liga",
    "Aço Ferramenta",
];

pub const FORMATOS: [&str; 4] = [
    "Bobina Laminada a Quente",
    "Chapa Grossa",
    "Vergalhão",
    "Viga Perfil I (ou H)",
];

pub const NORMAS_TECNICAS: [&str; 4] = ["ASTM A36", "NBR 7480", "SAE 1020", "EN S355"];

pub const ACABAMENTOS: [&str; 4] = ["Decapado", "Galvanizado", "Polido", "Laminado a Frio"];

pub fn defaults(categoria: Categoria) -> &'static [&'static str] {
    match categoria {
        Categoria::Composicao => &COMPOSICOES,
        Categoria::Formato => &FORMATOS,
        Categoria::NormaTecnica => &NORMAS_TECNICAS,
        Categoria::Acabamento => &ACABAMENTOS,
    }
}

/// Upserts the default lookup values. Safe to run any number of times.
pub async fn seed_categorias(repo: &dyn Repository) -> StoreResult<()> {
    for categoria in Categoria::ALL {
        for nome in defaults(categoria) {
            repo.upsert_categoria(categoria, nome).await?;
        }
        info!(table = categoria.table(), "lookup values seeded");
    }
    Ok(())
}
