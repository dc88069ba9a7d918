// src/handlers/importacao.rs
//
// O arquivo chega cru no corpo da requisição (o seletor de arquivos da UI
// entrega bytes + nome + MIME). O tipo pode ser forçado com `?kind=csv|pdf`.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    models::importacao::{ArquivoImportacao, ImportBatchResult, ImportPreview, SourceKind},
};

/// Cabeçalho com o nome original do arquivo (usado para detectar a extensão).
pub const FILE_NAME_HEADER: &str = "x-file-name";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImportParams {
    /// `csv` ou `pdf` (texto extraído). Sem ele, o tipo vem do MIME/extensão.
    pub kind: Option<String>,
}

fn parse_kind(kind: Option<&str>) -> Result<Option<SourceKind>, AppError> {
    match kind.map(|k| k.trim().to_lowercase()) {
        None => Ok(None),
        Some(k) if k.is_empty() => Ok(None),
        Some(k) => match k.as_str() {
            "csv" => Ok(Some(SourceKind::Csv)),
            "pdf" | "pdf_text" | "pdftext" | "txt" => Ok(Some(SourceKind::PdfText)),
            _ => Err(AppError::UnsupportedFormat(k)),
        },
    }
}

fn arquivo_from_request(headers: &HeaderMap, body: Bytes) -> ArquivoImportacao {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    ArquivoImportacao {
        nome: header_str(FILE_NAME_HEADER).unwrap_or_else(|| "upload".to_string()),
        mime_type: header_str(header::CONTENT_TYPE.as_str()),
        bytes: body.to_vec(),
    }
}

#[utoipa::path(
    post,
    path = "/api/importacao",
    tag = "Importação",
    params(
        ImportParams,
        ("x-file-name" = Option<String>, Header, description = "Nome do arquivo original")
    ),
    request_body(content = Vec<u8>, description = "Conteúdo do arquivo (CSV ou texto de PDF)", content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Resultado da importação", body = ImportBatchResult),
        (status = 400, description = "Arquivo vazio ou formato não suportado"),
        (status = 422, description = "Cabeçalhos obrigatórios ausentes")
    )
)]
pub async fn import_file(
    State(app_state): State<AppState>,
    Query(params): Query<ImportParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_kind(params.kind.as_deref())?;
    let arquivo = arquivo_from_request(&headers, body);
    let today = chrono::Local::now().date_naive();

    let result = app_state
        .importacao_service
        .import_file(&arquivo, kind, today)
        .await?;
    Ok(Json(result))
}

/// Parse + mapeamento sem gravar nada.
#[utoipa::path(
    post,
    path = "/api/importacao/preview",
    tag = "Importação",
    params(
        ImportParams,
        ("x-file-name" = Option<String>, Header, description = "Nome do arquivo original")
    ),
    request_body(content = Vec<u8>, description = "Conteúdo do arquivo (CSV ou texto de PDF)", content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Prévia da importação", body = ImportPreview),
        (status = 400, description = "Arquivo vazio ou formato não suportado"),
        (status = 422, description = "Cabeçalhos obrigatórios ausentes")
    )
)]
pub async fn preview_import(
    State(app_state): State<AppState>,
    Query(params): Query<ImportParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_kind(params.kind.as_deref())?;
    let arquivo = arquivo_from_request(&headers, body);
    let today = chrono::Local::now().date_naive();

    let preview = app_state.importacao_service.preview(&arquivo, kind, today)?;
    Ok(Json(preview))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_override_is_case_insensitive() {
        assert_eq!(parse_kind(Some("CSV")).unwrap(), Some(SourceKind::Csv));
        assert_eq!(parse_kind(Some("pdf")).unwrap(), Some(SourceKind::PdfText));
        assert_eq!(parse_kind(Some(" ")).unwrap(), None);
        assert_eq!(parse_kind(None).unwrap(), None);
        assert!(parse_kind(Some("xlsx")).is_err());
    }

    #[test]
    fn file_metadata_comes_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "text/csv".parse().unwrap());
        headers.insert(FILE_NAME_HEADER, "bens.csv".parse().unwrap());

        let arquivo = arquivo_from_request(&headers, Bytes::from_static(b"a;b"));
        assert_eq!(arquivo.nome, "bens.csv");
        assert_eq!(arquivo.mime_type.as_deref(), Some("text/csv"));
        assert_eq!(arquivo.bytes, b"a;b");
    }
}
