// src/models/estrutura.rs
// Estrutura organizacional: Campus > Bloco > Ambiente, e os Servidores responsáveis.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Campus {
    pub id_campus: i64,
    pub nome: String,
    pub codigo: String,
    pub endereco: Option<String>,
    pub cep: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub ativo: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// Bloco (prédio) de um campus
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bloco {
    pub id_bloco: i64,
    pub nome: String,
    pub codigo: String,
    pub ativo: bool,
    pub id_campus: i64,
    pub campus_nome: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Servidor {
    pub id_servidor: i64,
    pub nome: String,
    pub matricula: String,
    pub email: Option<String>,
    pub ativo: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// Ambiente (sala/local) onde os bens ficam
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ambiente {
    pub id_ambiente: i64,
    pub nome: String,
    pub codigo: String,
    pub ativo: bool,
    pub id_bloco: i64,
    pub id_servidor_responsavel: Option<i64>,
    pub bloco_nome: Option<String>,
    pub campus_nome: Option<String>,
    pub servidor_nome: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
