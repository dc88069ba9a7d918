// src/services/conferencia_service.rs

use chrono::{Datelike, NaiveDate};
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{BemRepository, ConferenciaRepository},
    models::{
        bem::EstadoConservacao,
        conferencia::{Conferencia, Inventario, StatusBem},
    },
};

// Dados de uma conferência, já validados pelo handler.
#[derive(Debug, Clone)]
pub struct NovaConferencia {
    pub id_bem: i64,
    pub data_conferencia: Option<NaiveDate>,
    pub status_bem: StatusBem,
    pub estado_conservacao: Option<EstadoConservacao>,
    pub id_servidor_conferente: Option<i64>,
    pub id_inventario: Option<i64>,
    pub observacoes: Option<String>,
}

#[derive(Clone)]
pub struct ConferenciaService {
    conferencia_repo: ConferenciaRepository,
    bem_repo: BemRepository,
    pool: SqlitePool,
}

impl ConferenciaService {
    pub fn new(conferencia_repo: ConferenciaRepository, bem_repo: BemRepository, pool: SqlitePool) -> Self {
        Self { conferencia_repo, bem_repo, pool }
    }

    /// Registra a conferência de um bem. Os triggers do banco atualizam o bem
    /// (conferido, data, estado) e os contadores do inventário.
    pub async fn register(&self, nova: NovaConferencia, today: NaiveDate) -> Result<Conferencia, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. O bem precisa existir
        if self.bem_repo.find_by_id(&mut *tx, nova.id_bem).await?.is_none() {
            return Err(AppError::BemNotFound(nova.id_bem.to_string()));
        }

        // 2. Campanha informada precisa estar aberta
        if let Some(id_inventario) = nova.id_inventario {
            let inventario = self
                .conferencia_repo
                .find_inventario(&mut *tx, id_inventario)
                .await?
                .ok_or(AppError::InventarioNotFound(id_inventario))?;
            if inventario.data_fim.is_some() {
                return Err(AppError::InventarioAlreadyClosed(id_inventario));
            }
        }

        // 3. Grava
        let id_conferencia = self
            .conferencia_repo
            .insert_conferencia(
                &mut *tx,
                nova.id_bem,
                nova.data_conferencia.unwrap_or(today),
                nova.status_bem,
                nova.estado_conservacao,
                nova.id_servidor_conferente,
                nova.id_inventario,
                nova.observacoes.as_deref(),
            )
            .await?;

        let conferencia = self
            .conferencia_repo
            .find_conferencia(&mut *tx, id_conferencia)
            .await?
            .ok_or_else(|| anyhow::anyhow!("conferência {} sumiu após o INSERT", id_conferencia))?;

        tx.commit().await?;
        tracing::info!(
            "Conferência registrada: bem {} ({})",
            conferencia.id_bem,
            conferencia.status_bem.as_str()
        );
        Ok(conferencia)
    }

    pub async fn list_by_bem(&self, id_bem: i64) -> Result<Vec<Conferencia>, AppError> {
        if self.bem_repo.find_by_id(&self.pool, id_bem).await?.is_none() {
            return Err(AppError::BemNotFound(id_bem.to_string()));
        }
        self.conferencia_repo.list_by_bem(&self.pool, id_bem).await
    }

    // --- Inventários ---

    pub async fn open_inventario(
        &self,
        ano: Option<i64>,
        id_servidor_responsavel: Option<i64>,
        today: NaiveDate,
    ) -> Result<Inventario, AppError> {
        let ano = ano.unwrap_or_else(|| i64::from(today.year()));

        let mut tx = self.pool.begin().await?;
        let id_inventario = self
            .conferencia_repo
            .insert_inventario(&mut *tx, ano, today, id_servidor_responsavel)
            .await?;
        let inventario = self
            .conferencia_repo
            .find_inventario(&mut *tx, id_inventario)
            .await?
            .ok_or(AppError::InventarioNotFound(id_inventario))?;
        tx.commit().await?;

        tracing::info!(
            "Inventário {} aberto ({} bens)",
            inventario.ano,
            inventario.total_bens
        );
        Ok(inventario)
    }

    pub async fn close_inventario(&self, id_inventario: i64, today: NaiveDate) -> Result<Inventario, AppError> {
        let mut tx = self.pool.begin().await?;
        let inventario = self
            .conferencia_repo
            .find_inventario(&mut *tx, id_inventario)
            .await?
            .ok_or(AppError::InventarioNotFound(id_inventario))?;
        if inventario.data_fim.is_some() {
            return Err(AppError::InventarioAlreadyClosed(id_inventario));
        }

        self.conferencia_repo
            .close_inventario(&mut *tx, id_inventario, today)
            .await?;
        let fechado = self
            .conferencia_repo
            .find_inventario(&mut *tx, id_inventario)
            .await?
            .ok_or(AppError::InventarioNotFound(id_inventario))?;
        tx.commit().await?;
        Ok(fechado)
    }

    pub async fn list_inventarios(&self) -> Result<Vec<Inventario>, AppError> {
        self.conferencia_repo.list_inventarios(&self.pool).await
    }
}
