// tests/api.rs
//
// Rotas HTTP via `oneshot`, sem abrir porta.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use common::*;
use patrimonio::build_router;

async fn setup_app() -> Router {
    build_router(setup_state().await)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_csv(uri: &str, linhas: &[&str]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "text/csv")
        .header("x-file-name", "bens.csv")
        .body(Body::from(linhas.join("\n")))
        .unwrap()
}

// ============================================================================
// Saúde e documentação
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;
    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_app().await;
    let (status, json) = send(&app, get("/api/docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/importacao"].is_object());
}

// ============================================================================
// Importação
// ============================================================================

#[tokio::test]
async fn test_import_then_list() {
    let app = setup_app().await;
    let (status, json) = send(
        &app,
        post_csv(
            "/api/importacao",
            &[
                CABECALHO_COMPLETO,
                "3504;123110303;CADEIRA AZUL;;10/02/2020;;;1.234,56;BOM",
                "3505;123110303;MESA;;10/02/2020;;;100,00;BOM",
                ";;SEM CODIGO;;;;;;",
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["imported"], 2);
    assert_eq!(json["skipped"], 1);
    assert_eq!(json["errors"], 0);

    let (status, json) = send(&app, get("/api/bens?search=cadeira")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);
    assert_eq!(json["hasMore"], false);
    assert_eq!(json["bens"][0]["brCode"], "PAT-3504");
    assert_eq!(json["bens"][0]["valorAquisicao"], 1234.56);
}

#[tokio::test]
async fn test_import_missing_headers_is_unprocessable() {
    let app = setup_app().await;
    let (status, _) = send(
        &app,
        post_csv("/api/importacao", &["CÓD BEM;CLASS", "3504;123110303"]),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_import_rejects_unknown_format() {
    let app = setup_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/importacao")
        .header("content-type", "application/zip")
        .header("x-file-name", "bens.zip")
        .body(Body::from("PK"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_with_huge_page_number() {
    let app = setup_app().await;
    let (status, json) = send(&app, get("/api/bens?page=9223372036854775807&pageSize=200")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hasMore"], false);
    assert_eq!(json["bens"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_preview_does_not_persist() {
    let app = setup_app().await;
    let (status, json) = send(
        &app,
        post_csv(
            "/api/importacao/preview",
            &[CABECALHO_COMPLETO, "3504;123110303;CADEIRA AZUL;;10/02/2020;;;100,00;BOM"],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["candidatos"].as_array().map(Vec::len), Some(1));

    let (_, json) = send(&app, get("/api/bens")).await;
    assert_eq!(json["total"], 0);
}

// ============================================================================
// Cadastro, leitura e conferência
// ============================================================================

#[tokio::test]
async fn test_create_get_and_scan() {
    let app = setup_app().await;
    let (status, criado) = send(
        &app,
        post_json(
            "/api/bens",
            json!({
                "numeroPatrimonio": "3504",
                "classificacao": "123110303",
                "descricaoBem": "CADEIRA AZUL",
                "dataAquisicao": "2020-02-10",
                "valorAquisicao": 100.0,
                "estadoConservacao": "BOM"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(criado["brCode"], "PAT-3504");
    let id = criado["idBem"].as_i64().unwrap();

    let (status, json) = send(&app, get(&format!("/api/bens/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["numeroPatrimonio"], "3504");

    let (status, json) = send(&app, get("/api/bens/patrimonio/3504")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["idBem"], id);

    let (status, json) = send(&app, get("/api/scan/PAT-3504")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["idBem"], id);

    let (status, _) = send(&app, get("/api/scan/PAT-0000")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_payload_is_bad_request() {
    let app = setup_app().await;
    let (status, _) = send(
        &app,
        post_json(
            "/api/bens",
            json!({
                "numeroPatrimonio": "   ",
                "classificacao": "123110303",
                "descricaoBem": "CADEIRA",
                "dataAquisicao": "2020-02-10",
                "valorAquisicao": -1.0,
                "estadoConservacao": "BOM"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_conferencia_marks_asset_and_feeds_report() {
    let app = setup_app().await;
    send(
        &app,
        post_csv(
            "/api/importacao",
            &[
                CABECALHO_COMPLETO,
                "1;123110303;CADEIRA;;10/02/2020;;;100,00;BOM",
                "2;123110303;MESA;;10/02/2020;;;100,00;BOM",
            ],
        ),
    )
    .await;
    let (_, bem) = send(&app, get("/api/bens/patrimonio/1")).await;
    let id = bem["idBem"].as_i64().unwrap();

    let (status, json) = send(
        &app,
        post_json(
            "/api/conferencias",
            json!({ "idBem": id, "statusBem": "LOCALIZADO", "estadoConservacao": "REGULAR" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["statusBem"], "LOCALIZADO");

    let (_, bem) = send(&app, get(&format!("/api/bens/{}", id))).await;
    assert_eq!(bem["conferido"], true);
    assert_eq!(bem["estadoConservacao"], "REGULAR");

    let (status, historico) = send(&app, get(&format!("/api/bens/{}/conferencias", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(historico.as_array().map(Vec::len), Some(1));

    let (status, stats) = send(&app, get("/api/relatorio")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["conferidos"], 1);
    assert_eq!(stats["percentualConferido"], 50);
}

#[tokio::test]
async fn test_conferencia_for_unknown_asset_is_not_found() {
    let app = setup_app().await;
    let (status, _) = send(
        &app,
        post_json("/api/conferencias", json!({ "idBem": 999, "statusBem": "LOCALIZADO" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_asset() {
    let app = setup_app().await;
    send(
        &app,
        post_csv(
            "/api/importacao",
            &[CABECALHO_COMPLETO, "1;123110303;CADEIRA;;10/02/2020;;;100,00;BOM"],
        ),
    )
    .await;
    let (_, bem) = send(&app, get("/api/bens/patrimonio/1")).await;
    let id = bem["idBem"].as_i64().unwrap();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/bens/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/api/bens/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_estados_in_display_order() {
    let app = setup_app().await;
    let (status, json) = send(&app, get("/api/estados-conservacao")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!(["EXCELENTE", "BOM", "REGULAR", "RUIM", "PESSIMO"]));
}
