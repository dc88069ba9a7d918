// src/handlers/estrutura.rs
// Cadastro básico da estrutura física: campus, blocos, ambientes e servidores.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::estrutura::{Ambiente, Bloco, Campus, Servidor},
};

// --- Campus ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampusPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: String,
    #[validate(length(min = 1, message = "O código é obrigatório."))]
    pub codigo: String,
    pub endereco: Option<String>,
    pub cep: Option<String>,
    pub cidade: Option<String>,
    #[validate(length(equal = 2, message = "Use a sigla do estado (ex: SP)."))]
    pub estado: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/campus",
    tag = "Estrutura",
    request_body = CampusPayload,
    responses(
        (status = 201, description = "Campus criado", body = Campus),
        (status = 409, description = "Código já cadastrado")
    )
)]
pub async fn create_campus(
    State(app_state): State<AppState>,
    Json(payload): Json<CampusPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let campus = app_state
        .estrutura_service
        .create_campus(
            payload.nome.trim(),
            payload.codigo.trim(),
            payload.endereco.as_deref(),
            payload.cep.as_deref(),
            payload.cidade.as_deref(),
            payload.estado.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(campus)))
}

#[utoipa::path(
    get,
    path = "/api/campus",
    tag = "Estrutura",
    responses((status = 200, description = "Campus ativos", body = Vec<Campus>))
)]
pub async fn list_campus(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let campus = app_state.estrutura_service.list_campus().await?;
    Ok(Json(campus))
}

// --- Bloco ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlocoPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: String,
    #[validate(length(min = 1, message = "O código é obrigatório."))]
    pub codigo: String,
    pub id_campus: i64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BlocoFiltro {
    pub id_campus: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/blocos",
    tag = "Estrutura",
    request_body = BlocoPayload,
    responses(
        (status = 201, description = "Bloco criado", body = Bloco),
        (status = 409, description = "Código já cadastrado")
    )
)]
pub async fn create_bloco(
    State(app_state): State<AppState>,
    Json(payload): Json<BlocoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let bloco = app_state
        .estrutura_service
        .create_bloco(payload.nome.trim(), payload.codigo.trim(), payload.id_campus)
        .await?;
    Ok((StatusCode::CREATED, Json(bloco)))
}

#[utoipa::path(
    get,
    path = "/api/blocos",
    tag = "Estrutura",
    params(BlocoFiltro),
    responses((status = 200, description = "Blocos ativos", body = Vec<Bloco>))
)]
pub async fn list_blocos(
    State(app_state): State<AppState>,
    Query(filtro): Query<BlocoFiltro>,
) -> Result<impl IntoResponse, AppError> {
    let blocos = app_state.estrutura_service.list_blocos(filtro.id_campus).await?;
    Ok(Json(blocos))
}

// --- Servidor ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServidorPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: String,
    #[validate(length(min = 1, message = "A matrícula é obrigatória."))]
    pub matricula: String,
    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/servidores",
    tag = "Estrutura",
    request_body = ServidorPayload,
    responses(
        (status = 201, description = "Servidor cadastrado", body = Servidor),
        (status = 409, description = "Matrícula já cadastrada")
    )
)]
pub async fn create_servidor(
    State(app_state): State<AppState>,
    Json(payload): Json<ServidorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let servidor = app_state
        .estrutura_service
        .create_servidor(
            payload.nome.trim(),
            payload.matricula.trim(),
            payload.email.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(servidor)))
}

#[utoipa::path(
    get,
    path = "/api/servidores",
    tag = "Estrutura",
    responses((status = 200, description = "Servidores ativos", body = Vec<Servidor>))
)]
pub async fn list_servidores(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let servidores = app_state.estrutura_service.list_servidores().await?;
    Ok(Json(servidores))
}

// --- Ambiente ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AmbientePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: String,
    #[validate(length(min = 1, message = "O código é obrigatório."))]
    pub codigo: String,
    pub id_bloco: i64,
    pub id_servidor_responsavel: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AmbienteFiltro {
    pub id_bloco: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/ambientes",
    tag = "Estrutura",
    request_body = AmbientePayload,
    responses(
        (status = 201, description = "Ambiente criado", body = Ambiente),
        (status = 409, description = "Código já cadastrado")
    )
)]
pub async fn create_ambiente(
    State(app_state): State<AppState>,
    Json(payload): Json<AmbientePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let ambiente = app_state
        .estrutura_service
        .create_ambiente(
            payload.nome.trim(),
            payload.codigo.trim(),
            payload.id_bloco,
            payload.id_servidor_responsavel,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ambiente)))
}

#[utoipa::path(
    get,
    path = "/api/ambientes",
    tag = "Estrutura",
    params(AmbienteFiltro),
    responses((status = 200, description = "Ambientes ativos", body = Vec<Ambiente>))
)]
pub async fn list_ambientes(
    State(app_state): State<AppState>,
    Query(filtro): Query<AmbienteFiltro>,
) -> Result<impl IntoResponse, AppError> {
    let ambientes = app_state.estrutura_service.list_ambientes(filtro.id_bloco).await?;
    Ok(Json(ambientes))
}
