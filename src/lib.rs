// src/lib.rs

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod importacao;
pub mod models;
pub mod services;

use crate::config::AppState;

/// Limite do corpo nas rotas de importação (planilhas grandes).
const IMPORT_BODY_LIMIT: usize = 20 * 1024 * 1024;

pub fn build_router(app_state: AppState) -> Router {
    let bens_routes = Router::new()
        .route("/"
               ,get(handlers::bens::list_bens)
               .post(handlers::bens::create_bem)
        )
        .route("/{id}"
               ,get(handlers::bens::get_bem)
               .put(handlers::bens::update_bem)
               .delete(handlers::bens::delete_bem)
        )
        .route("/{id}/conferencias"
               ,get(handlers::conferencias::list_conferencias_bem)
        )
        .route("/patrimonio/{numero}"
               ,get(handlers::bens::get_bem_by_patrimonio)
        );

    let importacao_routes = Router::new()
        .route("/", post(handlers::importacao::import_file))
        .route("/preview", post(handlers::importacao::preview_import))
        .layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT));

    let inventario_routes = Router::new()
        .route("/"
               ,post(handlers::conferencias::open_inventario)
               .get(handlers::conferencias::list_inventarios)
        )
        .route("/{id}/finalizar"
               ,post(handlers::conferencias::close_inventario)
        );

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/docs/openapi.json", get(|| async { Json(docs::ApiDoc::openapi()) }))
        .route("/api/scan/{codigo}", get(handlers::bens::scan_bem))
        .route("/api/conferencias", post(handlers::conferencias::register_conferencia))
        .route("/api/campus"
               ,post(handlers::estrutura::create_campus)
               .get(handlers::estrutura::list_campus)
        )
        .route("/api/blocos"
               ,post(handlers::estrutura::create_bloco)
               .get(handlers::estrutura::list_blocos)
        )
        .route("/api/servidores"
               ,post(handlers::estrutura::create_servidor)
               .get(handlers::estrutura::list_servidores)
        )
        .route("/api/ambientes"
               ,post(handlers::estrutura::create_ambiente)
               .get(handlers::estrutura::list_ambientes)
        )
        .route("/api/relatorio", get(handlers::relatorio::get_relatorio))
        .route("/api/estados-conservacao", get(handlers::relatorio::list_estados))
        .nest("/api/bens", bens_routes)
        .nest("/api/importacao", importacao_routes)
        .nest("/api/inventarios", inventario_routes)
        .with_state(app_state)
}
