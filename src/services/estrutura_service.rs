// src/services/estrutura_service.rs

use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::EstruturaRepository,
    models::estrutura::{Ambiente, Bloco, Campus, Servidor},
};

#[derive(Clone)]
pub struct EstruturaService {
    estrutura_repo: EstruturaRepository,
    pool: SqlitePool,
}

impl EstruturaService {
    pub fn new(estrutura_repo: EstruturaRepository, pool: SqlitePool) -> Self {
        Self { estrutura_repo, pool }
    }

    pub async fn create_campus(
        &self,
        nome: &str,
        codigo: &str,
        endereco: Option<&str>,
        cep: Option<&str>,
        cidade: Option<&str>,
        estado: Option<&str>,
    ) -> Result<Campus, AppError> {
        self.estrutura_repo
            .insert_campus(&self.pool, nome, codigo, endereco, cep, cidade, estado)
            .await
    }

    pub async fn list_campus(&self) -> Result<Vec<Campus>, AppError> {
        self.estrutura_repo.list_campus(&self.pool).await
    }

    pub async fn create_bloco(&self, nome: &str, codigo: &str, id_campus: i64) -> Result<Bloco, AppError> {
        let mut tx = self.pool.begin().await?;
        let id_bloco = self
            .estrutura_repo
            .insert_bloco(&mut *tx, nome, codigo, id_campus)
            .await?;
        let bloco = self
            .estrutura_repo
            .find_bloco(&mut *tx, id_bloco)
            .await?
            .ok_or_else(|| anyhow::anyhow!("bloco {} sumiu após o INSERT", id_bloco))?;
        tx.commit().await?;
        Ok(bloco)
    }

    pub async fn list_blocos(&self, id_campus: Option<i64>) -> Result<Vec<Bloco>, AppError> {
        self.estrutura_repo.list_blocos(&self.pool, id_campus).await
    }

    pub async fn create_servidor(&self, nome: &str, matricula: &str, email: Option<&str>) -> Result<Servidor, AppError> {
        self.estrutura_repo
            .insert_servidor(&self.pool, nome, matricula, email)
            .await
    }

    pub async fn list_servidores(&self) -> Result<Vec<Servidor>, AppError> {
        self.estrutura_repo.list_servidores(&self.pool).await
    }

    pub async fn create_ambiente(
        &self,
        nome: &str,
        codigo: &str,
        id_bloco: i64,
        id_servidor_responsavel: Option<i64>,
    ) -> Result<Ambiente, AppError> {
        let mut tx = self.pool.begin().await?;
        let id_ambiente = self
            .estrutura_repo
            .insert_ambiente(&mut *tx, nome, codigo, id_bloco, id_servidor_responsavel)
            .await?;
        let ambiente = self
            .estrutura_repo
            .find_ambiente(&mut *tx, id_ambiente)
            .await?
            .ok_or_else(|| anyhow::anyhow!("ambiente {} sumiu após o INSERT", id_ambiente))?;
        tx.commit().await?;
        Ok(ambiente)
    }

    pub async fn list_ambientes(&self, id_bloco: Option<i64>) -> Result<Vec<Ambiente>, AppError> {
        self.estrutura_repo.list_ambientes(&self.pool, id_bloco).await
    }
}
