// src/services/relatorio_service.rs

use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::RelatorioRepository,
    models::{
        bem::{decimal_from_real, EstadoConservacao},
        relatorio::{EstadoCount, InventarioStats},
    },
};

/// Percentual inteiro (arredondado) de `parte` sobre `total`; 0 quando não há bens.
pub fn percentual(parte: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((parte as f64) * 100.0 / (total as f64)).round() as i64
}

#[derive(Clone)]
pub struct RelatorioService {
    relatorio_repo: RelatorioRepository,
    pool: SqlitePool,
}

impl RelatorioService {
    pub fn new(relatorio_repo: RelatorioRepository, pool: SqlitePool) -> Self {
        Self { relatorio_repo, pool }
    }

    pub async fn stats(&self) -> Result<InventarioStats, AppError> {
        let resumo = self.relatorio_repo.resumo(&self.pool).await?;
        let contagens = self.relatorio_repo.contagem_por_estado(&self.pool).await?;

        // Todos os estados aparecem, na ordem de exibição, mesmo com zero.
        let por_estado = EstadoConservacao::ALL
            .iter()
            .map(|estado| EstadoCount {
                estado_conservacao: *estado,
                total: contagens
                    .iter()
                    .find(|c| c.estado_conservacao == estado.as_str())
                    .map(|c| c.total)
                    .unwrap_or(0),
            })
            .collect();

        Ok(InventarioStats {
            total: resumo.total,
            conferidos: resumo.conferidos,
            valor_total: decimal_from_real(resumo.valor_total),
            percentual_conferido: percentual(resumo.conferidos, resumo.total),
            por_estado,
        })
    }

    /// Estados de conservação na ordem de exibição.
    pub fn estados(&self) -> Vec<EstadoConservacao> {
        EstadoConservacao::ALL.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentual_is_rounded() {
        assert_eq!(percentual(1, 3), 33);
        assert_eq!(percentual(2, 3), 67);
        assert_eq!(percentual(3, 3), 100);
    }

    #[test]
    fn percentual_of_empty_inventory_is_zero() {
        assert_eq!(percentual(0, 0), 0);
    }
}
