// src/models/relatorio.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::bem::EstadoConservacao;

// Resumo do inventário (cards do painel)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventarioStats {
    pub total: i64,
    pub conferidos: i64,
    pub valor_total: Decimal,
    /// Percentual arredondado para inteiro.
    pub percentual_conferido: i64,
    pub por_estado: Vec<EstadoCount>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstadoCount {
    pub estado_conservacao: EstadoConservacao,
    pub total: i64,
}
