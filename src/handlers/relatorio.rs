// src/handlers/relatorio.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{bem::EstadoConservacao, relatorio::InventarioStats},
};

#[utoipa::path(
    get,
    path = "/api/relatorio",
    tag = "Relatório",
    responses(
        (status = 200, description = "Totais do inventário", body = InventarioStats)
    )
)]
pub async fn get_relatorio(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.relatorio_service.stats().await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/estados-conservacao",
    tag = "Relatório",
    responses(
        (status = 200, description = "Estados de conservação em ordem de exibição", body = Vec<EstadoConservacao>)
    )
)]
pub async fn list_estados(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.relatorio_service.estados())
}
