// src/db/relatorio_repo.rs

use sqlx::{Executor, FromRow, Sqlite};

use crate::common::error::AppError;

// Linha crua do resumo; o service converte para o modelo de saída.
#[derive(Debug, FromRow)]
pub struct ResumoRow {
    pub total: i64,
    pub conferidos: i64,
    pub valor_total: f64,
}

#[derive(Debug, FromRow)]
pub struct EstadoRow {
    pub estado_conservacao: String,
    pub total: i64,
}

#[derive(Clone, Default)]
pub struct RelatorioRepository;

impl RelatorioRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn resumo<'e, E>(&self, executor: E) -> Result<ResumoRow, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        // TOTAL() devolve 0.0 em tabela vazia (SUM devolveria NULL)
        let row = sqlx::query_as::<_, ResumoRow>(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(CASE WHEN conferido THEN 1 ELSE 0 END), 0) AS conferidos,
                   TOTAL(valor_aquisicao) AS valor_total
            FROM BEM
            "#,
        )
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn contagem_por_estado<'e, E>(&self, executor: E) -> Result<Vec<EstadoRow>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, EstadoRow>(
            r#"
            SELECT estado_conservacao, COUNT(*) AS total
            FROM BEM
            GROUP BY estado_conservacao
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
