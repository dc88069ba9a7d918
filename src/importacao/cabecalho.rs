// src/importacao/cabecalho.rs
//
// Normalização de cabeçalhos: cada fonte (CSV do sistema patrimonial, texto de
// PDF, planilhas editadas à mão) escreve as colunas de um jeito. Aqui tudo vira
// o rótulo canônico, e o resto do pipeline não precisa saber de onde veio.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::models::importacao::ImportRow;

// --- Rótulos canônicos ---
pub const COD_BEM: &str = "CÓD BEM";
pub const CLASS: &str = "CLASS";
pub const DESCRICAO: &str = "DESCRIÇÃO DO BEM";
pub const LOCALIZACAO: &str = "LOCALIZAÇÃO";
pub const AQUISICAO: &str = "AQUISIÇÃO CONS.";
pub const NOTA_FIS: &str = "NOTA FIS";
pub const EMPENHO: &str = "EMPENHO";
pub const VALOR: &str = "VALOR";
pub const CONSERVACAO: &str = "CONSERVAÇÃO";

/// Colunas que toda fonte precisa ter para ser importada.
pub const REQUIRED_HEADERS: [&str; 8] = [
    COD_BEM, CLASS, DESCRICAO, LOCALIZACAO, AQUISICAO, NOTA_FIS, EMPENHO, VALOR,
];

// Chave de comparação -> rótulo(s) canônico(s).
// Mais de um rótulo = dois cabeçalhos colados pelo OCR (falta de delimitador).
static ALIASES: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let table: &[(&str, &'static [&'static str])] = &[
        ("COD BEM", &[COD_BEM]),
        ("COD. BEM", &[COD_BEM]),
        ("CODIGO", &[COD_BEM]),
        ("CODIGO BEM", &[COD_BEM]),
        ("CODIGO DO BEM", &[COD_BEM]),
        ("PATRIMONIO", &[COD_BEM]),
        ("NUMERO PATRIMONIO", &[COD_BEM]),
        ("NUMERO_PATRIMONIO", &[COD_BEM]),
        ("N PATRIMONIO", &[COD_BEM]),
        ("CLASS", &[CLASS]),
        ("CLASS.", &[CLASS]),
        ("CLASSIFICACAO", &[CLASS]),
        ("DESCRICAO DO BEM", &[DESCRICAO]),
        ("DESCRICAO", &[DESCRICAO]),
        ("DESCRICAO_BEM", &[DESCRICAO]),
        ("LOCALIZACAO", &[LOCALIZACAO]),
        ("LOCAL", &[LOCALIZACAO]),
        ("AMBIENTE", &[LOCALIZACAO]),
        ("AQUISICAO CONS.", &[AQUISICAO]),
        ("AQUISICAO", &[AQUISICAO]),
        ("DATA AQU", &[AQUISICAO]),
        ("DATA AQUISICAO", &[AQUISICAO]),
        ("DATA_AQUISICAO", &[AQUISICAO]),
        ("NOTA FIS", &[NOTA_FIS]),
        ("NOTA FISCONS.", &[NOTA_FIS]),
        ("NOTA FISCAL", &[NOTA_FIS]),
        ("NOTA_FISCAL", &[NOTA_FIS]),
        ("NF", &[NOTA_FIS]),
        ("EMPENHO", &[EMPENHO]),
        ("EMPENHO SIAFI", &[EMPENHO]),
        ("EMPENHO_SIAFI", &[EMPENHO]),
        ("VALOR", &[VALOR]),
        ("VALOR AQUISICAO", &[VALOR]),
        ("VALOR_AQUISICAO", &[VALOR]),
        ("VALORLOCALIZACAO", &[VALOR, LOCALIZACAO]),
        ("CONSERVACAO", &[CONSERVACAO]),
        ("CONS.", &[CONSERVACAO]),
        ("ESTADO", &[CONSERVACAO]),
        ("ESTADO CONSERVACAO", &[CONSERVACAO]),
        ("ESTADO DE CONSERVACAO", &[CONSERVACAO]),
        ("ESTADO_CONSERVACAO", &[CONSERVACAO]),
    ];
    table.iter().copied().collect()
});

/// Remove acentos (NFD + descarta marcas combinantes).
pub fn strip_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Chave usada para comparar cabeçalhos: sem acento, maiúscula, espaços colapsados.
pub fn comparison_key(header: &str) -> String {
    strip_diacritics(header)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Rótulos canônicos de um cabeçalho bruto. Desconhecido passa adiante (apenas trim).
pub fn canonical_labels(raw: &str) -> Vec<String> {
    let trimmed = raw.trim().trim_start_matches('\u{feff}').trim();
    match ALIASES.get(comparison_key(trimmed).as_str()) {
        Some(labels) => labels.iter().map(|l| l.to_string()).collect(),
        None => vec![trimmed.to_string()],
    }
}

// Mapa coluna bruta -> rótulos canônicos. Monta as linhas por posição.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    columns: Vec<Vec<String>>,
}

impl HeaderMap {
    pub fn new<S: AsRef<str>>(raw_headers: &[S]) -> Self {
        let columns = raw_headers
            .iter()
            .map(|h| canonical_labels(h.as_ref()))
            .collect();
        Self { columns }
    }

    pub fn raw_column_count(&self) -> usize {
        self.columns.len()
    }

    /// Cabeçalhos canônicos na ordem da fonte, sem repetição.
    pub fn headers(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for label in self.columns.iter().flatten() {
            if !label.is_empty() && !seen.contains(label) {
                seen.push(label.clone());
            }
        }
        seen
    }

    /// Monta uma linha a partir dos valores posicionais.
    ///
    /// Coluna colada (N rótulos) tem o valor dividido em espaços: os N-1 primeiros
    /// rótulos pegam um token cada e o último fica com o resto. Quando o mesmo rótulo
    /// aparece em mais de uma coluna, vale o primeiro valor não vazio.
    pub fn build_row<S: AsRef<str>>(&self, values: &[S]) -> ImportRow {
        let mut row = ImportRow::new();
        for (idx, labels) in self.columns.iter().enumerate() {
            let value = values.get(idx).map(|v| v.as_ref()).unwrap_or("");
            let parts = split_fused(value, labels.len());
            for (label, part) in labels.iter().zip(parts) {
                if label.is_empty() {
                    continue;
                }
                let slot = row.entry(label.clone()).or_default();
                if slot.trim().is_empty() {
                    *slot = part;
                }
            }
        }
        row
    }
}

fn split_fused(value: &str, n: usize) -> Vec<String> {
    if n <= 1 {
        return vec![value.to_string()];
    }
    let mut parts = Vec::with_capacity(n);
    let mut rest = value.trim();
    for _ in 0..n - 1 {
        match rest.split_once(char::is_whitespace) {
            Some((head, tail)) => {
                parts.push(head.to_string());
                rest = tail.trim_start();
            }
            None => {
                parts.push(rest.to_string());
                rest = "";
            }
        }
    }
    parts.push(rest.to_string());
    parts
}

/// Cabeçalhos obrigatórios que não aparecem na lista normalizada.
pub fn missing_required(headers: &[String], required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|r| !headers.iter().any(|h| h == *r))
        .map(|r| r.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accents_and_case_are_ignored() {
        assert_eq!(canonical_labels("cód bem"), vec![COD_BEM]);
        assert_eq!(canonical_labels("COD BEM"), vec![COD_BEM]);
        assert_eq!(canonical_labels("  Descrição   do Bem "), vec![DESCRICAO]);
        assert_eq!(canonical_labels("LOCALIZACAO"), vec![LOCALIZACAO]);
    }

    #[test]
    fn known_ocr_artifacts_are_mapped() {
        assert_eq!(canonical_labels("NOTA FISCONS."), vec![NOTA_FIS]);
        assert_eq!(canonical_labels("AQUISIÇÃO"), vec![AQUISICAO]);
        assert_eq!(canonical_labels("DATA AQU"), vec![AQUISICAO]);
        assert_eq!(canonical_labels("VALORLOCALIZAÇÃO"), vec![VALOR, LOCALIZACAO]);
    }

    #[test]
    fn unknown_headers_pass_through() {
        assert_eq!(canonical_labels(" OBSERVAÇÕES "), vec!["OBSERVAÇÕES"]);
    }

    #[test]
    fn byte_order_mark_is_dropped() {
        assert_eq!(canonical_labels("\u{feff}CÓD BEM"), vec![COD_BEM]);
    }

    #[test]
    fn fused_column_value_is_split() {
        let map = HeaderMap::new(&["CÓD BEM", "VALORLOCALIZAÇÃO"]);
        assert_eq!(map.headers(), vec![COD_BEM, VALOR, LOCALIZACAO]);

        let row = map.build_row(&["3504", "1.234,56 SALA 101"]);
        assert_eq!(row[VALOR], "1.234,56");
        assert_eq!(row[LOCALIZACAO], "SALA 101");
    }

    #[test]
    fn duplicate_labels_keep_first_non_empty() {
        let map = HeaderMap::new(&["CODIGO", "CÓD BEM"]);
        assert_eq!(map.headers(), vec![COD_BEM]);
        assert_eq!(map.build_row(&["", "77"])[COD_BEM], "77");
        assert_eq!(map.build_row(&["12", "77"])[COD_BEM], "12");
    }

    #[test]
    fn short_rows_fill_missing_values_with_empty() {
        let map = HeaderMap::new(&["CÓD BEM", "CLASS"]);
        let row = map.build_row(&["1"]);
        assert_eq!(row[CLASS], "");
    }

    #[test]
    fn missing_required_lists_absent_headers() {
        let map = HeaderMap::new(&["CÓD BEM", "CLASS", "DESCRIÇÃO DO BEM"]);
        let missing = missing_required(&map.headers(), &REQUIRED_HEADERS);
        assert_eq!(
            missing,
            vec![LOCALIZACAO, AQUISICAO, NOTA_FIS, EMPENHO, VALOR]
        );
    }
}
