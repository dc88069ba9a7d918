// src/handlers/conferencias.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        bem::EstadoConservacao,
        conferencia::{Conferencia, Inventario, StatusBem},
    },
    services::conferencia_service::NovaConferencia,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConferenciaPayload {
    #[validate(range(min = 1, message = "O campo 'idBem' é obrigatório."))]
    pub id_bem: i64,
    /// Hoje, quando omitida.
    pub data_conferencia: Option<NaiveDate>,
    pub status_bem: StatusBem,
    /// Omitido = mantém o estado atual do bem.
    pub estado_conservacao: Option<EstadoConservacao>,
    pub id_servidor_conferente: Option<i64>,
    pub id_inventario: Option<i64>,
    #[validate(length(max = 1000, message = "Observações muito longas."))]
    pub observacoes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/conferencias",
    tag = "Conferências",
    request_body = ConferenciaPayload,
    responses(
        (status = 201, description = "Conferência registrada", body = Conferencia),
        (status = 404, description = "Bem ou inventário não encontrado"),
        (status = 409, description = "Inventário já finalizado")
    )
)]
pub async fn register_conferencia(
    State(app_state): State<AppState>,
    Json(payload): Json<ConferenciaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let nova = NovaConferencia {
        id_bem: payload.id_bem,
        data_conferencia: payload.data_conferencia,
        status_bem: payload.status_bem,
        estado_conservacao: payload.estado_conservacao,
        id_servidor_conferente: payload.id_servidor_conferente,
        id_inventario: payload.id_inventario,
        observacoes: payload
            .observacoes
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty()),
    };
    let today = chrono::Local::now().date_naive();
    let conferencia = app_state.conferencia_service.register(nova, today).await?;
    Ok((StatusCode::CREATED, Json(conferencia)))
}

#[utoipa::path(
    get,
    path = "/api/bens/{id}/conferencias",
    tag = "Conferências",
    params(("id" = i64, Path, description = "ID do bem")),
    responses(
        (status = 200, description = "Histórico de conferências (mais recente primeiro)", body = Vec<Conferencia>),
        (status = 404, description = "Bem não encontrado")
    )
)]
pub async fn list_conferencias_bem(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let conferencias = app_state.conferencia_service.list_by_bem(id).await?;
    Ok(Json(conferencias))
}

// ---
// Inventários (campanhas)
// ---

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbrirInventarioPayload {
    /// Ano corrente, quando omitido.
    #[validate(range(min = 1900, max = 9999, message = "Ano inválido."))]
    pub ano: Option<i64>,
    pub id_servidor_responsavel: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/inventarios",
    tag = "Inventários",
    request_body = AbrirInventarioPayload,
    responses(
        (status = 201, description = "Inventário aberto", body = Inventario)
    )
)]
pub async fn open_inventario(
    State(app_state): State<AppState>,
    Json(payload): Json<AbrirInventarioPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let today = chrono::Local::now().date_naive();
    let inventario = app_state
        .conferencia_service
        .open_inventario(payload.ano, payload.id_servidor_responsavel, today)
        .await?;
    Ok((StatusCode::CREATED, Json(inventario)))
}

#[utoipa::path(
    get,
    path = "/api/inventarios",
    tag = "Inventários",
    responses(
        (status = 200, description = "Inventários, do mais recente ao mais antigo", body = Vec<Inventario>)
    )
)]
pub async fn list_inventarios(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let inventarios = app_state.conferencia_service.list_inventarios().await?;
    Ok(Json(inventarios))
}

#[utoipa::path(
    post,
    path = "/api/inventarios/{id}/finalizar",
    tag = "Inventários",
    params(("id" = i64, Path, description = "ID do inventário")),
    responses(
        (status = 200, description = "Inventário finalizado", body = Inventario),
        (status = 404, description = "Inventário não encontrado"),
        (status = 409, description = "Inventário já finalizado")
    )
)]
pub async fn close_inventario(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let today = chrono::Local::now().date_naive();
    let inventario = app_state.conferencia_service.close_inventario(id, today).await?;
    Ok(Json(inventario))
}
