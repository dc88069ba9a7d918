// src/handlers/bens.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        bem::{derive_br_code, Bem, DadosBem, EstadoConservacao},
        filtro::{BensResult, FiltroBens, Paginacao},
    },
};

// ---
// Validações customizadas
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("O campo não pode ficar em branco.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: cadastro/edição de bem
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BemPayload {
    #[validate(custom(function = "validate_not_blank"))]
    pub numero_patrimonio: String,

    #[serde(default)]
    pub classificacao: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub descricao_bem: String,

    /// Data ISO (`YYYY-MM-DD`).
    pub data_aquisicao: NaiveDate,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub valor_aquisicao: Decimal,

    pub empenho_siafi: Option<String>,
    pub nota_fiscal: Option<String>,

    /// Gerado como `PAT-<numero>` quando omitido.
    pub br_code: Option<String>,

    #[serde(default)]
    pub estado_conservacao: EstadoConservacao,

    pub id_servidor_responsavel: Option<i64>,
    pub id_ambiente_atual: Option<i64>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl BemPayload {
    fn into_dados(self) -> DadosBem {
        let numero_patrimonio = self.numero_patrimonio.trim().to_string();
        let br_code = trimmed(self.br_code).unwrap_or_else(|| derive_br_code(&numero_patrimonio));
        DadosBem {
            classificacao: self.classificacao.trim().to_string(),
            descricao_bem: self.descricao_bem.trim().to_string(),
            data_aquisicao: self.data_aquisicao,
            valor_aquisicao: self.valor_aquisicao.round_dp(2),
            empenho_siafi: trimmed(self.empenho_siafi),
            nota_fiscal: trimmed(self.nota_fiscal),
            br_code,
            estado_conservacao: self.estado_conservacao,
            id_servidor_responsavel: self.id_servidor_responsavel,
            id_ambiente_atual: self.id_ambiente_atual,
            numero_patrimonio,
        }
    }
}

// Paginação vinda da query string (`?page=2&pageSize=50`).
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaginacaoParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

// ---
// Handler: list_bens (busca filtrada + paginada)
// ---
#[utoipa::path(
    get,
    path = "/api/bens",
    tag = "Bens",
    params(FiltroBens, PaginacaoParams),
    responses(
        (status = 200, description = "Página de bens", body = BensResult)
    )
)]
pub async fn list_bens(
    State(app_state): State<AppState>,
    Query(filtro): Query<FiltroBens>,
    Query(params): Query<PaginacaoParams>,
) -> Result<impl IntoResponse, AppError> {
    let paginacao = Paginacao::new(
        params.page.unwrap_or(1),
        params.page_size.unwrap_or(app_state.default_page_size),
    );
    let result = app_state.bem_service.search(filtro, paginacao).await?;
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/api/bens",
    tag = "Bens",
    request_body = BemPayload,
    responses(
        (status = 201, description = "Bem cadastrado", body = Bem),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Número de patrimônio ou código já cadastrado")
    )
)]
pub async fn create_bem(
    State(app_state): State<AppState>,
    Json(payload): Json<BemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let bem = app_state.bem_service.create(&payload.into_dados()).await?;
    Ok((StatusCode::CREATED, Json(bem)))
}

#[utoipa::path(
    get,
    path = "/api/bens/{id}",
    tag = "Bens",
    params(("id" = i64, Path, description = "ID do bem")),
    responses(
        (status = 200, description = "Bem encontrado", body = Bem),
        (status = 404, description = "Bem não encontrado")
    )
)]
pub async fn get_bem(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let bem = app_state.bem_service.get_by_id(id).await?;
    Ok(Json(bem))
}

#[utoipa::path(
    put,
    path = "/api/bens/{id}",
    tag = "Bens",
    params(("id" = i64, Path, description = "ID do bem")),
    request_body = BemPayload,
    responses(
        (status = 200, description = "Bem atualizado", body = Bem),
        (status = 404, description = "Bem não encontrado")
    )
)]
pub async fn update_bem(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<BemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let bem = app_state.bem_service.update(id, &payload.into_dados()).await?;
    Ok(Json(bem))
}

/// Exclusão é uma ação explícita; nunca acontece como efeito de importação.
#[utoipa::path(
    delete,
    path = "/api/bens/{id}",
    tag = "Bens",
    params(("id" = i64, Path, description = "ID do bem")),
    responses(
        (status = 204, description = "Bem excluído"),
        (status = 404, description = "Bem não encontrado")
    )
)]
pub async fn delete_bem(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.bem_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/bens/patrimonio/{numero}",
    tag = "Bens",
    params(("numero" = String, Path, description = "Número de patrimônio")),
    responses(
        (status = 200, description = "Bem encontrado", body = Bem),
        (status = 404, description = "Bem não encontrado")
    )
)]
pub async fn get_bem_by_patrimonio(
    State(app_state): State<AppState>,
    Path(numero): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bem = app_state.bem_service.get_by_numero_patrimonio(&numero).await?;
    Ok(Json(bem))
}

// Leitura do scanner (código de barras / QR já decodificado).
#[utoipa::path(
    get,
    path = "/api/scan/{codigo}",
    tag = "Bens",
    params(("codigo" = String, Path, description = "Código lido (br_code ou número de patrimônio)")),
    responses(
        (status = 200, description = "Bem encontrado", body = Bem),
        (status = 404, description = "Nenhum bem com esse código")
    )
)]
pub async fn scan_bem(
    State(app_state): State<AppState>,
    Path(codigo): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bem = app_state.bem_service.find_by_scan(&codigo).await?;
    Ok(Json(bem))
}
