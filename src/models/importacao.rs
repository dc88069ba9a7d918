// src/models/importacao.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::bem::EstadoConservacao;

// --- 1. Tipo da fonte ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    /// Planilha CSV (delimitador `;` ou `,`).
    Csv,
    /// Texto já extraído de um PDF, página a página.
    PdfText,
}

// Arquivo entregue pelo seletor de arquivos: bytes + metadados.
#[derive(Debug, Clone)]
pub struct ArquivoImportacao {
    pub nome: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Linha importada: cabeçalho canônico -> valor bruto.
pub type ImportRow = BTreeMap<String, String>;

// Erro de parse de uma linha (1-based, contando o cabeçalho como linha 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RowParseError {
    pub linha: usize,
    pub message: String,
}

// Resultado do parser tabular (antes da validação de cabeçalhos).
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTable {
    /// Cabeçalhos já normalizados, na ordem da fonte.
    pub headers: Vec<String>,
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<ImportRow>,
    pub errors: Vec<RowParseError>,
}

// --- 2. Bem candidato (saída do mapeador, entrada da reconciliação) ---
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BemCandidato {
    pub classificacao: String,
    pub numero_patrimonio: String,
    pub descricao_bem: String,
    pub data_aquisicao: NaiveDate,
    pub valor_aquisicao: Decimal,
    pub empenho_siafi: Option<String>,
    pub nota_fiscal: Option<String>,
    pub br_code: String,
    pub estado_conservacao: EstadoConservacao,
    /// Rótulo bruto da coluna LOCALIZAÇÃO, resolvido contra AMBIENTE na reconciliação.
    pub localizacao: Option<String>,
}

// Degradação silenciosa de um campo (valor padrão aplicado).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportWarning {
    pub patrimonio: String,
    pub campo: String,
    pub message: String,
}

// Falha de persistência de uma linha.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportErrorDetail {
    pub patrimonio: String,
    pub error: String,
}

// --- 3. Resultado agregado de uma importação ---
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatchResult {
    pub success: bool,
    /// Inseridos + atualizados.
    pub imported: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Linhas descartadas antes da reconciliação (sem número de patrimônio). Não são erros.
    pub skipped: usize,
    pub errors: usize,
    pub error_details: Vec<ImportErrorDetail>,
    pub warnings: Vec<ImportWarning>,
    /// Erros de parse reportados pelo leitor de CSV.
    pub parse_errors: Vec<RowParseError>,
}

// Modo de persistência do lote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Cada linha é sua própria unidade; falhas não desfazem as demais.
    #[default]
    BestEffort,
    /// Lote inteiro em uma transação: tudo ou nada.
    Atomic,
}

impl std::str::FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "best_effort" | "best-effort" => Ok(ImportMode::BestEffort),
            "atomic" => Ok(ImportMode::Atomic),
            other => Err(format!("IMPORT_MODE inválido: {}", other)),
        }
    }
}

// Prévia (parse + mapeamento, sem gravar nada).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub kind: SourceKind,
    pub headers: Vec<String>,
    pub parsed_count: usize,
    pub skipped: usize,
    pub candidatos: Vec<BemCandidato>,
    pub warnings: Vec<ImportWarning>,
    pub parse_errors: Vec<RowParseError>,
}
