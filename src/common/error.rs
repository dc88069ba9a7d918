// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Erros da aplicação. Erros de linha (parse, persistência) NÃO passam por aqui:
// eles são acumulados como dados no resultado da importação.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Erro estrutural: a importação inteira é rejeitada antes do mapeamento.
    #[error("Cabeçalhos obrigatórios ausentes: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),

    #[error("Formato de arquivo não suportado: {0}")]
    UnsupportedFormat(String),

    #[error("Arquivo vazio ou sem linha de cabeçalho")]
    EmptySource,

    #[error("Bem não encontrado: {0}")]
    BemNotFound(String),

    #[error("Número de patrimônio já cadastrado: {0}")]
    PatrimonioAlreadyExists(String),

    #[error("Código de leitura já cadastrado: {0}")]
    BrCodeAlreadyExists(String),

    #[error("Código já cadastrado: {0}")]
    CodigoAlreadyExists(String),

    #[error("Inventário não encontrado: {0}")]
    InventarioNotFound(i64),

    #[error("Inventário já finalizado: {0}")]
    InventarioAlreadyClosed(i64),

    #[error("Configuração inválida: {0}")]
    InvalidConfig(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Converte violações de unicidade do SQLite em erros de domínio.
    /// `on_unique` recebe a mensagem do banco, que cita a coluna (ex: "BEM.br_code").
    pub fn from_unique_violation(e: sqlx::Error, on_unique: impl FnOnce(&str) -> AppError) -> AppError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return on_unique(db_err.message());
            }
        }
        AppError::DatabaseError(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::MissingHeaders(missing) => {
                let details: Vec<String> = missing
                    .iter()
                    .map(|h| format!("Cabeçalho faltante: {}", h))
                    .collect();
                let body = Json(json!({
                    "error": "O arquivo não possui todas as colunas obrigatórias.",
                    "details": details,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            ref e @ (AppError::UnsupportedFormat(_) | AppError::EmptySource) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ref e @ (AppError::BemNotFound(_) | AppError::InventarioNotFound(_)) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            ref e @ (AppError::PatrimonioAlreadyExists(_)
            | AppError::BrCodeAlreadyExists(_)
            | AppError::CodigoAlreadyExists(_)
            | AppError::InventarioAlreadyClosed(_)) => (StatusCode::CONFLICT, e.to_string()),

            // Todos os outros erros viram 500. O detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
