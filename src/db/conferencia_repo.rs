// src/db/conferencia_repo.rs
// Conferências, inventários (campanhas) e o log de leituras do scanner.

use chrono::NaiveDate;
use sqlx::{Executor, Sqlite};

use crate::{
    common::error::AppError,
    models::{
        bem::EstadoConservacao,
        conferencia::{Conferencia, Inventario, StatusBem},
    },
};

const SELECT_CONFERENCIA: &str = r#"
    SELECT cf.*, s.nome AS servidor_nome
    FROM CONFERENCIA cf
    LEFT JOIN SERVIDOR s ON s.id_servidor = cf.id_servidor_conferente
"#;

const SELECT_INVENTARIO: &str = r#"
    SELECT i.*, s.nome AS servidor_nome
    FROM INVENTARIO i
    LEFT JOIN SERVIDOR s ON s.id_servidor = i.id_servidor_responsavel
"#;

#[derive(Clone, Default)]
pub struct ConferenciaRepository;

impl ConferenciaRepository {
    pub fn new() -> Self {
        Self
    }

    // --- Conferência ---

    /// Os triggers atualizam o bem e os contadores do inventário.
    pub async fn insert_conferencia<'e, E>(
        &self,
        executor: E,
        id_bem: i64,
        data_conferencia: NaiveDate,
        status_bem: StatusBem,
        estado_conservacao: Option<EstadoConservacao>,
        id_servidor_conferente: Option<i64>,
        id_inventario: Option<i64>,
        observacoes: Option<&str>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO CONFERENCIA (
                data_conferencia, estado_conservacao, status_bem, id_bem,
                id_servidor_conferente, id_inventario, observacoes
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(data_conferencia)
        .bind(estado_conservacao.map(|e| e.as_str()))
        .bind(status_bem.as_str())
        .bind(id_bem)
        .bind(id_servidor_conferente)
        .bind(id_inventario)
        .bind(observacoes)
        .execute(executor)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_conferencia<'e, E>(&self, executor: E, id_conferencia: i64) -> Result<Option<Conferencia>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("{} WHERE cf.id_conferencia = ?", SELECT_CONFERENCIA);
        let conferencia = sqlx::query_as::<_, Conferencia>(&sql)
            .bind(id_conferencia)
            .fetch_optional(executor)
            .await?;
        Ok(conferencia)
    }

    /// Histórico de um bem, da mais recente para a mais antiga.
    pub async fn list_by_bem<'e, E>(&self, executor: E, id_bem: i64) -> Result<Vec<Conferencia>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "{} WHERE cf.id_bem = ? ORDER BY cf.data_conferencia DESC, cf.id_conferencia DESC",
            SELECT_CONFERENCIA
        );
        let conferencias = sqlx::query_as::<_, Conferencia>(&sql)
            .bind(id_bem)
            .fetch_all(executor)
            .await?;
        Ok(conferencias)
    }

    // --- Inventário ---

    /// Abre uma campanha já com o total de bens cadastrados.
    pub async fn insert_inventario<'e, E>(
        &self,
        executor: E,
        ano: i64,
        data_inicio: NaiveDate,
        id_servidor_responsavel: Option<i64>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO INVENTARIO (ano, data_inicio, total_bens, id_servidor_responsavel)
            VALUES (?, ?, (SELECT COUNT(*) FROM BEM), ?)
            "#,
        )
        .bind(ano)
        .bind(data_inicio)
        .bind(id_servidor_responsavel)
        .execute(executor)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_inventario<'e, E>(&self, executor: E, id_inventario: i64) -> Result<Option<Inventario>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("{} WHERE i.id_inventario = ?", SELECT_INVENTARIO);
        let inventario = sqlx::query_as::<_, Inventario>(&sql)
            .bind(id_inventario)
            .fetch_optional(executor)
            .await?;
        Ok(inventario)
    }

    pub async fn list_inventarios<'e, E>(&self, executor: E) -> Result<Vec<Inventario>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "{} ORDER BY i.ano DESC, i.id_inventario DESC",
            SELECT_INVENTARIO
        );
        let inventarios = sqlx::query_as::<_, Inventario>(&sql)
            .fetch_all(executor)
            .await?;
        Ok(inventarios)
    }

    /// Fecha a campanha. Devolve `false` se ela já estava fechada (ou não existe).
    pub async fn close_inventario<'e, E>(
        &self,
        executor: E,
        id_inventario: i64,
        data_fim: NaiveDate,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE INVENTARIO
            SET data_fim = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id_inventario = ? AND data_fim IS NULL
            "#,
        )
        .bind(data_fim)
        .bind(id_inventario)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Leitura (log do scanner) ---

    pub async fn insert_leitura<'e, E>(&self, executor: E, br_code: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("INSERT INTO LEITURA (br_code) VALUES (?)")
            .bind(br_code)
            .execute(executor)
            .await?;
        Ok(())
    }
}
