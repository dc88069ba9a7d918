// tests/common/mod.rs
//
// Banco SQLite em memória com as migrações aplicadas. Uma única conexão,
// que nunca expira: fechar a conexão apagaria o banco.

#![allow(dead_code)]

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use patrimonio::{
    config::{AppState, Config, ImportSettings},
    models::importacao::ArquivoImportacao,
};

pub const CABECALHO_COMPLETO: &str =
    "CÓD BEM;CLASS;DESCRIÇÃO DO BEM;LOCALIZAÇÃO;AQUISIÇÃO CONS.;NOTA FIS;EMPENHO;VALOR;CONSERVAÇÃO";

pub async fn setup_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();
    pool
}

pub async fn setup_state() -> AppState {
    setup_state_with(ImportSettings::default()).await
}

pub async fn setup_state_with(import: ImportSettings) -> AppState {
    let pool = setup_pool().await;
    let config = Config { import, ..Config::default() };
    AppState::from_pool(pool, &config)
}

pub fn csv(linhas: &[&str]) -> ArquivoImportacao {
    ArquivoImportacao {
        nome: "bens.csv".to_string(),
        mime_type: Some("text/csv".to_string()),
        bytes: linhas.join("\n").into_bytes(),
    }
}

pub fn hoje() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn dados_bem(numero: &str, descricao: &str) -> patrimonio::models::bem::DadosBem {
    patrimonio::models::bem::DadosBem {
        classificacao: "123110303".to_string(),
        numero_patrimonio: numero.to_string(),
        descricao_bem: descricao.to_string(),
        data_aquisicao: hoje(),
        valor_aquisicao: dec("100.00"),
        empenho_siafi: None,
        nota_fiscal: None,
        br_code: patrimonio::models::bem::derive_br_code(numero),
        estado_conservacao: Default::default(),
        id_servidor_responsavel: None,
        id_ambiente_atual: None,
    }
}
