// src/config.rs

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::{env, str::FromStr, time::Duration};

use crate::{
    common::error::AppError,
    db::{BemRepository, ConferenciaRepository, EstruturaRepository, RelatorioRepository},
    models::{filtro::DEFAULT_PAGE_SIZE, importacao::ImportMode},
    services::{
        bem_service::BemService, conferencia_service::ConferenciaService,
        estrutura_service::EstruturaService, importacao_service::ImportacaoService,
        relatorio_service::RelatorioService,
    },
};

// Comportamento da importação em lote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    pub mode: ImportMode,
    /// `false` relaxa a checagem do CSV para exigir só o `CÓD BEM`.
    pub require_all_headers: bool,
    pub fallback_ambiente_id: Option<i64>,
    pub fallback_servidor_id: Option<i64>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            mode: ImportMode::BestEffort,
            require_all_headers: true,
            fallback_ambiente_id: None,
            fallback_servidor_id: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub default_page_size: i64,
    pub import: ImportSettings,
}

// Lê uma variável opcional; valor presente mas inválido é erro de configuração.
fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, AppError> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::InvalidConfig(format!("{} = '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

fn parse_bool(name: &str) -> Result<Option<bool>, AppError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "1" | "true" | "yes" | "sim" => Ok(Some(true)),
            "0" | "false" | "no" | "nao" | "não" => Ok(Some(false)),
            _ => Err(AppError::InvalidConfig(format!("{} = '{}'", name, raw))),
        },
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Lê `.env` (se existir) e as variáveis de ambiente.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let import_mode = match env::var("IMPORT_MODE") {
            Ok(raw) if !raw.trim().is_empty() => raw
                .parse::<ImportMode>()
                .map_err(AppError::InvalidConfig)?,
            _ => ImportMode::default(),
        };

        let db_max_connections = parse_var::<u32>("DB_MAX_CONNECTIONS")?.unwrap_or(1);
        if db_max_connections == 0 {
            return Err(AppError::InvalidConfig("DB_MAX_CONNECTIONS = 0".to_string()));
        }
        let default_page_size = parse_var::<i64>("DEFAULT_PAGE_SIZE")?.unwrap_or(DEFAULT_PAGE_SIZE);
        if default_page_size < 1 {
            return Err(AppError::InvalidConfig(format!(
                "DEFAULT_PAGE_SIZE = {}",
                default_page_size
            )));
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://inventario.db?mode=rwc".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            db_max_connections,
            default_page_size,
            import: ImportSettings {
                mode: import_mode,
                require_all_headers: parse_bool("IMPORT_REQUIRE_ALL_HEADERS")?.unwrap_or(true),
                fallback_ambiente_id: parse_var("IMPORT_FALLBACK_AMBIENTE_ID")?,
                fallback_servidor_id: parse_var("IMPORT_FALLBACK_SERVIDOR_ID")?,
            },
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub default_page_size: i64,
    pub bem_service: BemService,
    pub importacao_service: ImportacaoService,
    pub conferencia_service: ConferenciaService,
    pub estrutura_service: EstruturaService,
    pub relatorio_service: RelatorioService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .foreign_keys(true)
            .create_if_missing(true);

        let db_pool = SqlitePoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config))
    }

    // --- Monta o gráfico de dependências ---
    // Separado de `new` para os testes injetarem um pool em memória.
    pub fn from_pool(db_pool: SqlitePool, config: &Config) -> Self {
        let bem_repo = BemRepository::new();
        let estrutura_repo = EstruturaRepository::new();
        let conferencia_repo = ConferenciaRepository::new();
        let relatorio_repo = RelatorioRepository::new();

        Self {
            bem_service: BemService::new(bem_repo.clone(), conferencia_repo.clone(), db_pool.clone()),
            importacao_service: ImportacaoService::new(
                bem_repo.clone(),
                estrutura_repo.clone(),
                config.import.clone(),
                db_pool.clone(),
            ),
            conferencia_service: ConferenciaService::new(conferencia_repo, bem_repo, db_pool.clone()),
            estrutura_service: EstruturaService::new(estrutura_repo, db_pool.clone()),
            relatorio_service: RelatorioService::new(relatorio_repo, db_pool.clone()),
            default_page_size: config.default_page_size,
            db_pool,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://inventario.db?mode=rwc".to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            db_max_connections: 1,
            default_page_size: DEFAULT_PAGE_SIZE,
            import: ImportSettings::default(),
        }
    }
}
