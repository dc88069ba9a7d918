// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Bens ---
        handlers::bens::list_bens,
        handlers::bens::create_bem,
        handlers::bens::get_bem,
        handlers::bens::update_bem,
        handlers::bens::delete_bem,
        handlers::bens::get_bem_by_patrimonio,
        handlers::bens::scan_bem,

        // --- Importação ---
        handlers::importacao::import_file,
        handlers::importacao::preview_import,

        // --- Conferências / Inventários ---
        handlers::conferencias::register_conferencia,
        handlers::conferencias::list_conferencias_bem,
        handlers::conferencias::open_inventario,
        handlers::conferencias::list_inventarios,
        handlers::conferencias::close_inventario,

        // --- Estrutura ---
        handlers::estrutura::create_campus,
        handlers::estrutura::list_campus,
        handlers::estrutura::create_bloco,
        handlers::estrutura::list_blocos,
        handlers::estrutura::create_servidor,
        handlers::estrutura::list_servidores,
        handlers::estrutura::create_ambiente,
        handlers::estrutura::list_ambientes,

        // --- Relatório ---
        handlers::relatorio::get_relatorio,
        handlers::relatorio::list_estados,
    ),
    components(
        schemas(
            // --- Bem ---
            models::bem::Bem,
            models::bem::EstadoConservacao,
            models::bem::DadosBem,
            models::filtro::FiltroBens,
            models::filtro::Paginacao,
            models::filtro::BensResult,

            // --- Importação ---
            models::importacao::SourceKind,
            models::importacao::RowParseError,
            models::importacao::ParsedTable,
            models::importacao::BemCandidato,
            models::importacao::ImportWarning,
            models::importacao::ImportErrorDetail,
            models::importacao::ImportBatchResult,
            models::importacao::ImportMode,
            models::importacao::ImportPreview,

            // --- Conferência ---
            models::conferencia::StatusBem,
            models::conferencia::Conferencia,
            models::conferencia::Inventario,

            // --- Estrutura ---
            models::estrutura::Campus,
            models::estrutura::Bloco,
            models::estrutura::Servidor,
            models::estrutura::Ambiente,

            // --- Relatório ---
            models::relatorio::InventarioStats,
            models::relatorio::EstadoCount,

            // --- Payloads ---
            handlers::bens::BemPayload,
            handlers::conferencias::ConferenciaPayload,
            handlers::conferencias::AbrirInventarioPayload,
            handlers::estrutura::CampusPayload,
            handlers::estrutura::BlocoPayload,
            handlers::estrutura::ServidorPayload,
            handlers::estrutura::AmbientePayload,
        )
    ),
    tags(
        (name = "Bens", description = "Cadastro, busca e leitura de bens patrimoniais"),
        (name = "Importação", description = "Importação em lote de planilhas CSV e texto de PDF"),
        (name = "Conferências", description = "Conferência física dos bens"),
        (name = "Inventários", description = "Campanhas anuais de inventário"),
        (name = "Estrutura", description = "Campus, blocos, ambientes e servidores"),
        (name = "Relatório", description = "Indicadores do inventário")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_the_import_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/importacao"));
        assert!(doc.paths.paths.contains_key("/api/bens/{id}"));
    }
}
