// src/models/conferencia.rs

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use utoipa::ToSchema;

use super::bem::EstadoConservacao;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusBem {
    Localizado,
    NaoLocalizado,
}

impl StatusBem {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusBem::Localizado => "LOCALIZADO",
            StatusBem::NaoLocalizado => "NAO_LOCALIZADO",
        }
    }
}

impl std::str::FromStr for StatusBem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOCALIZADO" => Ok(StatusBem::Localizado),
            "NAO_LOCALIZADO" => Ok(StatusBem::NaoLocalizado),
            other => Err(format!("Status de bem inválido: {}", other)),
        }
    }
}

// --- Conferência (inspeção de um bem) ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Conferencia {
    pub id_conferencia: i64,
    pub data_conferencia: NaiveDate,
    pub estado_conservacao: Option<EstadoConservacao>,
    pub status_bem: StatusBem,
    pub id_bem: i64,
    pub id_servidor_conferente: Option<i64>,
    pub id_inventario: Option<i64>,
    pub observacoes: Option<String>,
    pub servidor_nome: Option<String>,
    pub created_at: NaiveDateTime,
}

impl<'r> FromRow<'r, SqliteRow> for Conferencia {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let decode_err = |index: &str, e: String| sqlx::Error::ColumnDecode {
            index: index.to_string(),
            source: e.into(),
        };

        let estado: Option<String> = row.try_get("estado_conservacao")?;
        let estado_conservacao = estado
            .map(|s| s.parse::<EstadoConservacao>())
            .transpose()
            .map_err(|e| decode_err("estado_conservacao", e))?;
        let status: String = row.try_get("status_bem")?;
        let status_bem = status
            .parse::<StatusBem>()
            .map_err(|e| decode_err("status_bem", e))?;

        Ok(Self {
            id_conferencia: row.try_get("id_conferencia")?,
            data_conferencia: row.try_get("data_conferencia")?,
            estado_conservacao,
            status_bem,
            id_bem: row.try_get("id_bem")?,
            id_servidor_conferente: row.try_get("id_servidor_conferente")?,
            id_inventario: row.try_get("id_inventario")?,
            observacoes: row.try_get("observacoes")?,
            servidor_nome: row.try_get("servidor_nome")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

// --- Inventário (campanha anual de conferência) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Inventario {
    pub id_inventario: i64,
    pub ano: i64,
    pub data_inicio: NaiveDate,
    pub data_fim: Option<NaiveDate>,
    pub total_bens: i64,
    pub bens_conferidos: i64,
    pub percentual_conclusao: f64,
    pub id_servidor_responsavel: Option<i64>,
    pub servidor_nome: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
