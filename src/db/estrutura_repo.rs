// src/db/estrutura_repo.rs
// Campus, blocos, ambientes e servidores.

use sqlx::{Executor, Sqlite};

use crate::{
    common::error::AppError,
    models::estrutura::{Ambiente, Bloco, Campus, Servidor},
};

const SELECT_BLOCO: &str = r#"
    SELECT bl.*, c.nome AS campus_nome
    FROM BLOCO bl
    LEFT JOIN CAMPUS c ON c.id_campus = bl.id_campus
"#;

const SELECT_AMBIENTE: &str = r#"
    SELECT a.*,
           bl.nome AS bloco_nome,
           c.nome  AS campus_nome,
           s.nome  AS servidor_nome
    FROM AMBIENTE a
    LEFT JOIN BLOCO bl   ON bl.id_bloco = a.id_bloco
    LEFT JOIN CAMPUS c   ON c.id_campus = bl.id_campus
    LEFT JOIN SERVIDOR s ON s.id_servidor = a.id_servidor_responsavel
"#;

fn codigo_duplicado(e: sqlx::Error, codigo: &str) -> AppError {
    AppError::from_unique_violation(e, |_| AppError::CodigoAlreadyExists(codigo.to_string()))
}

#[derive(Clone, Default)]
pub struct EstruturaRepository;

impl EstruturaRepository {
    pub fn new() -> Self {
        Self
    }

    // --- Campus ---

    pub async fn insert_campus<'e, E>(
        &self,
        executor: E,
        nome: &str,
        codigo: &str,
        endereco: Option<&str>,
        cep: Option<&str>,
        cidade: Option<&str>,
        estado: Option<&str>,
    ) -> Result<Campus, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Campus>(
            r#"
            INSERT INTO CAMPUS (nome, codigo, endereco, cep, cidade, estado)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(nome)
        .bind(codigo)
        .bind(endereco)
        .bind(cep)
        .bind(cidade)
        .bind(estado)
        .fetch_one(executor)
        .await
        .map_err(|e| codigo_duplicado(e, codigo))
    }

    pub async fn list_campus<'e, E>(&self, executor: E) -> Result<Vec<Campus>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let campus = sqlx::query_as::<_, Campus>(
            "SELECT * FROM CAMPUS WHERE ativo = 1 ORDER BY nome ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(campus)
    }

    // --- Bloco ---

    /// Insere e devolve o id; o registro completo (com nome do campus) vem de `find_bloco`.
    pub async fn insert_bloco<'e, E>(
        &self,
        executor: E,
        nome: &str,
        codigo: &str,
        id_campus: i64,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("INSERT INTO BLOCO (nome, codigo, id_campus) VALUES (?, ?, ?)")
            .bind(nome)
            .bind(codigo)
            .bind(id_campus)
            .execute(executor)
            .await
            .map_err(|e| codigo_duplicado(e, codigo))?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_bloco<'e, E>(&self, executor: E, id_bloco: i64) -> Result<Option<Bloco>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("{} WHERE bl.id_bloco = ?", SELECT_BLOCO);
        let bloco = sqlx::query_as::<_, Bloco>(&sql)
            .bind(id_bloco)
            .fetch_optional(executor)
            .await?;
        Ok(bloco)
    }

    pub async fn list_blocos<'e, E>(&self, executor: E, id_campus: Option<i64>) -> Result<Vec<Bloco>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "{} WHERE bl.ativo = 1 AND (? IS NULL OR bl.id_campus = ?) ORDER BY bl.nome ASC",
            SELECT_BLOCO
        );
        let blocos = sqlx::query_as::<_, Bloco>(&sql)
            .bind(id_campus)
            .bind(id_campus)
            .fetch_all(executor)
            .await?;
        Ok(blocos)
    }

    // --- Servidor ---

    pub async fn insert_servidor<'e, E>(
        &self,
        executor: E,
        nome: &str,
        matricula: &str,
        email: Option<&str>,
    ) -> Result<Servidor, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Servidor>(
            r#"
            INSERT INTO SERVIDOR (nome, matricula, email)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(nome)
        .bind(matricula)
        .bind(email)
        .fetch_one(executor)
        .await
        .map_err(|e| codigo_duplicado(e, matricula))
    }

    pub async fn list_servidores<'e, E>(&self, executor: E) -> Result<Vec<Servidor>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let servidores = sqlx::query_as::<_, Servidor>(
            "SELECT * FROM SERVIDOR WHERE ativo = 1 ORDER BY nome ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(servidores)
    }

    // --- Ambiente ---

    pub async fn insert_ambiente<'e, E>(
        &self,
        executor: E,
        nome: &str,
        codigo: &str,
        id_bloco: i64,
        id_servidor_responsavel: Option<i64>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO AMBIENTE (nome, codigo, id_bloco, id_servidor_responsavel)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(nome)
        .bind(codigo)
        .bind(id_bloco)
        .bind(id_servidor_responsavel)
        .execute(executor)
        .await
        .map_err(|e| codigo_duplicado(e, codigo))?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_ambiente<'e, E>(&self, executor: E, id_ambiente: i64) -> Result<Option<Ambiente>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("{} WHERE a.id_ambiente = ?", SELECT_AMBIENTE);
        let ambiente = sqlx::query_as::<_, Ambiente>(&sql)
            .bind(id_ambiente)
            .fetch_optional(executor)
            .await?;
        Ok(ambiente)
    }

    pub async fn list_ambientes<'e, E>(&self, executor: E, id_bloco: Option<i64>) -> Result<Vec<Ambiente>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "{} WHERE a.ativo = 1 AND (? IS NULL OR a.id_bloco = ?) ORDER BY a.nome ASC",
            SELECT_AMBIENTE
        );
        let ambientes = sqlx::query_as::<_, Ambiente>(&sql)
            .bind(id_bloco)
            .bind(id_bloco)
            .fetch_all(executor)
            .await?;
        Ok(ambientes)
    }

    /// Resolve o rótulo da coluna LOCALIZAÇÃO: código ou nome do ambiente, sem caixa.
    pub async fn find_ambiente_by_label<'e, E>(&self, executor: E, label: &str) -> Result<Option<Ambiente>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "{} WHERE a.ativo = 1 AND (a.codigo = ? COLLATE NOCASE OR a.nome = ? COLLATE NOCASE) \
             ORDER BY a.id_ambiente ASC LIMIT 1",
            SELECT_AMBIENTE
        );
        let label = label.trim();
        let ambiente = sqlx::query_as::<_, Ambiente>(&sql)
            .bind(label)
            .bind(label)
            .fetch_optional(executor)
            .await?;
        Ok(ambiente)
    }
}
