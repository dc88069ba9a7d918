// src/services/bem_service.rs

use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{BemRepository, ConferenciaRepository},
    models::{
        bem::{Bem, DadosBem},
        filtro::{self, BensResult, FiltroBens, Paginacao},
    },
};

#[derive(Clone)]
pub struct BemService {
    bem_repo: BemRepository,
    conferencia_repo: ConferenciaRepository,
    pool: SqlitePool,
}

impl BemService {
    pub fn new(bem_repo: BemRepository, conferencia_repo: ConferenciaRepository, pool: SqlitePool) -> Self {
        Self { bem_repo, conferencia_repo, pool }
    }

    // --- Consulta filtrada e paginada ---

    /// Contagem e página rodam em sequência, com os mesmos filtros.
    pub async fn search(&self, filtro: FiltroBens, paginacao: Paginacao) -> Result<BensResult, AppError> {
        let filtro = filtro.normalized();
        let paginacao = paginacao.sanitized();

        let total = self.bem_repo.count(&self.pool, &filtro).await?;
        let bens = self.bem_repo.find_page(&self.pool, &filtro, paginacao).await?;
        let has_more = filtro::has_more(paginacao.offset(), bens.len(), total);

        Ok(BensResult {
            bens,
            total,
            has_more,
            page: paginacao.page,
            page_size: paginacao.page_size,
        })
    }

    pub async fn get_by_id(&self, id_bem: i64) -> Result<Bem, AppError> {
        self.bem_repo
            .find_by_id(&self.pool, id_bem)
            .await?
            .ok_or_else(|| AppError::BemNotFound(id_bem.to_string()))
    }

    pub async fn get_by_numero_patrimonio(&self, numero_patrimonio: &str) -> Result<Bem, AppError> {
        self.bem_repo
            .find_by_numero_patrimonio(&self.pool, numero_patrimonio.trim())
            .await?
            .ok_or_else(|| AppError::BemNotFound(numero_patrimonio.to_string()))
    }

    /// Leitura do scanner: registra a leitura e procura pelo código de barras,
    /// caindo para o número de patrimônio (etiquetas antigas trazem só o número).
    pub async fn find_by_scan(&self, codigo: &str) -> Result<Bem, AppError> {
        let codigo = codigo.trim();
        if codigo.is_empty() {
            return Err(AppError::BemNotFound(String::new()));
        }

        self.conferencia_repo.insert_leitura(&self.pool, codigo).await?;

        if let Some(bem) = self.bem_repo.find_by_br_code(&self.pool, codigo).await? {
            return Ok(bem);
        }
        self.bem_repo
            .find_by_numero_patrimonio(&self.pool, codigo)
            .await?
            .ok_or_else(|| {
                tracing::debug!("Leitura sem bem correspondente: {}", codigo);
                AppError::BemNotFound(codigo.to_string())
            })
    }

    // --- Cadastro manual ---

    pub async fn create(&self, dados: &DadosBem) -> Result<Bem, AppError> {
        let mut tx = self.pool.begin().await?;
        let id_bem = self.bem_repo.insert(&mut *tx, dados).await?;
        let bem = self
            .bem_repo
            .find_by_id(&mut *tx, id_bem)
            .await?
            .ok_or_else(|| AppError::BemNotFound(id_bem.to_string()))?;
        tx.commit().await?;

        tracing::info!("Bem cadastrado: {} (id {})", bem.numero_patrimonio, bem.id_bem);
        Ok(bem)
    }

    pub async fn update(&self, id_bem: i64, dados: &DadosBem) -> Result<Bem, AppError> {
        let mut tx = self.pool.begin().await?;
        self.bem_repo.update(&mut *tx, id_bem, dados).await?;
        let bem = self
            .bem_repo
            .find_by_id(&mut *tx, id_bem)
            .await?
            .ok_or_else(|| AppError::BemNotFound(id_bem.to_string()))?;
        tx.commit().await?;
        Ok(bem)
    }

    pub async fn delete(&self, id_bem: i64) -> Result<(), AppError> {
        self.bem_repo.delete(&self.pool, id_bem).await?;
        tracing::info!("Bem {} excluído", id_bem);
        Ok(())
    }
}
