use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::CadastroDetalhado;

/// Per-attribute frequency tables for the chart views.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estatisticas {
    pub composicao: BTreeMap<String, u64>,
    pub formato: BTreeMap<String, u64>,
    pub norma_tecnica: BTreeMap<String, u64>,
    pub acabamento: BTreeMap<String, u64>,
    pub total: usize,
}

pub fn aggregate(cadastros: &[CadastroDetalhado]) -> Estatisticas {
    let mut stats = Estatisticas {
        total: cadastros.len(),
        ..Default::default()
    };
    for c in cadastros {
        *stats.composicao.entry(c.composicao.clone()).or_default() += 1;
        *stats.formato.entry(c.formato.clone()).or_default() += 1;
        *stats.norma_tecnica.entry(c.norma_tecnica.clone()).or_default() += 1;
        *stats.acabamento.entry(c.acabamento.clone()).or_default() += 1;
    }
    stats
}
