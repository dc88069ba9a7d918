// src/models/bem.rs

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Prefixo do código de leitura (br_code) derivado do número de patrimônio.
pub const BR_CODE_PREFIX: &str = "PAT-";
/// Usado apenas quando o número de patrimônio não existe (não deve chegar ao banco).
pub const BR_CODE_SEM_CODIGO: &str = "PAT-SEM-CODIGO";

/// Deriva o código de leitura: `"PAT-" + numero_patrimonio`.
pub fn derive_br_code(numero_patrimonio: &str) -> String {
    let numero = numero_patrimonio.trim();
    if numero.is_empty() {
        return BR_CODE_SEM_CODIGO.to_string();
    }
    format!("{}{}", BR_CODE_PREFIX, numero)
}

// --- 1. Estado de Conservação ---
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoConservacao {
    Excelente,
    #[default]
    Bom,
    Regular,
    Ruim,
    Pessimo,
}

impl EstadoConservacao {
    /// Ordem de exibição (do melhor para o pior).
    pub const ALL: [EstadoConservacao; 5] = [
        EstadoConservacao::Excelente,
        EstadoConservacao::Bom,
        EstadoConservacao::Regular,
        EstadoConservacao::Ruim,
        EstadoConservacao::Pessimo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoConservacao::Excelente => "EXCELENTE",
            EstadoConservacao::Bom => "BOM",
            EstadoConservacao::Regular => "REGULAR",
            EstadoConservacao::Ruim => "RUIM",
            EstadoConservacao::Pessimo => "PESSIMO",
        }
    }
}

impl fmt::Display for EstadoConservacao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstadoConservacao {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EXCELENTE" => Ok(EstadoConservacao::Excelente),
            "BOM" => Ok(EstadoConservacao::Bom),
            "REGULAR" => Ok(EstadoConservacao::Regular),
            "RUIM" => Ok(EstadoConservacao::Ruim),
            "PESSIMO" | "PÉSSIMO" => Ok(EstadoConservacao::Pessimo),
            other => Err(format!("Estado de conservação inválido: {}", other)),
        }
    }
}

// --- 2. Bem (registro persistido + nomes vindos dos JOINs) ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bem {
    pub id_bem: i64,
    pub classificacao: String,
    pub numero_patrimonio: String,
    pub descricao_bem: String,
    pub data_aquisicao: NaiveDate,
    pub valor_aquisicao: Decimal,
    pub empenho_siafi: Option<String>,
    pub nota_fiscal: Option<String>,
    pub br_code: String,
    pub estado_conservacao: EstadoConservacao,
    pub conferido: bool,
    pub data_conferencia: Option<NaiveDate>,
    pub id_servidor_responsavel: Option<i64>,
    pub id_ambiente_atual: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,

    // Campos de relacionamento (JOINs)
    pub servidor_nome: Option<String>,
    pub ambiente_nome: Option<String>,
    pub bloco_nome: Option<String>,
    pub campus_nome: Option<String>,
}

/// O SQLite guarda o valor como REAL; o domínio trabalha com `Decimal` de 2 casas.
pub(crate) fn decimal_from_real(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

pub(crate) fn decimal_to_real(value: Decimal) -> f64 {
    value.round_dp(2).to_f64().unwrap_or(0.0)
}

impl<'r> FromRow<'r, SqliteRow> for Bem {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let estado: String = row.try_get("estado_conservacao")?;
        let estado_conservacao = estado
            .parse::<EstadoConservacao>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "estado_conservacao".to_string(),
                source: e.into(),
            })?;

        Ok(Self {
            id_bem: row.try_get("id_bem")?,
            classificacao: row.try_get("classificacao")?,
            numero_patrimonio: row.try_get("numero_patrimonio")?,
            descricao_bem: row.try_get("descricao_bem")?,
            data_aquisicao: row.try_get("data_aquisicao")?,
            valor_aquisicao: decimal_from_real(row.try_get("valor_aquisicao")?),
            empenho_siafi: row.try_get("empenho_siafi")?,
            nota_fiscal: row.try_get("nota_fiscal")?,
            br_code: row.try_get("br_code")?,
            estado_conservacao,
            conferido: row.try_get("conferido")?,
            data_conferencia: row.try_get("data_conferencia")?,
            id_servidor_responsavel: row.try_get("id_servidor_responsavel")?,
            id_ambiente_atual: row.try_get("id_ambiente_atual")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            servidor_nome: row.try_get("servidor_nome")?,
            ambiente_nome: row.try_get("ambiente_nome")?,
            bloco_nome: row.try_get("bloco_nome")?,
            campus_nome: row.try_get("campus_nome")?,
        })
    }
}

// --- 3. Dados gravados de um bem (cadastro manual ou importação) ---
// Não inclui identidade nem estado de conferência: esses são preservados no UPDATE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DadosBem {
    pub classificacao: String,
    pub numero_patrimonio: String,
    pub descricao_bem: String,
    pub data_aquisicao: NaiveDate,
    pub valor_aquisicao: Decimal,
    pub empenho_siafi: Option<String>,
    pub nota_fiscal: Option<String>,
    pub br_code: String,
    pub estado_conservacao: EstadoConservacao,
    pub id_servidor_responsavel: Option<i64>,
    pub id_ambiente_atual: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn br_code_uses_trimmed_number() {
        assert_eq!(derive_br_code(" 3504 "), "PAT-3504");
        assert_eq!(derive_br_code("   "), BR_CODE_SEM_CODIGO);
    }

    #[test]
    fn real_column_keeps_two_decimals() {
        let valor = Decimal::from_str("1234.56").unwrap();
        assert_eq!(decimal_from_real(decimal_to_real(valor)), valor);
        assert_eq!(decimal_from_real(0.1 + 0.2), Decimal::from_str("0.30").unwrap());
    }

    #[test]
    fn estado_round_trips_through_storage_text() {
        for estado in EstadoConservacao::ALL {
            assert_eq!(estado.as_str().parse::<EstadoConservacao>(), Ok(estado));
        }
    }
}
