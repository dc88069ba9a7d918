// src/importacao/parser.rs
//
// Leitor tabular: bytes do arquivo -> cabeçalhos normalizados + linhas.

use csv::{ErrorKind, ReaderBuilder, Trim};
use encoding_rs::WINDOWS_1252;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::cabecalho::{self, HeaderMap};
use crate::{
    common::error::AppError,
    models::importacao::{ParsedTable, RowParseError, SourceKind},
};

// Colunas do texto extraído de PDF são separadas por 2+ espaços.
static COLUMN_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("regex válida"));

/// Descobre o tipo da fonte pelo MIME ou pela extensão do nome do arquivo.
pub fn sniff_kind(nome: &str, mime_type: Option<&str>) -> Result<SourceKind, AppError> {
    let mime = mime_type
        .map(|m| m.split(';').next().unwrap_or("").trim().to_lowercase())
        .unwrap_or_default();
    match mime.as_str() {
        "text/csv" | "application/csv" | "application/vnd.ms-excel" => {
            return Ok(SourceKind::Csv);
        }
        "application/pdf" => return Ok(SourceKind::PdfText),
        _ => {}
    }

    let ext = Path::new(nome)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("csv") => Ok(SourceKind::Csv),
        Some("pdf") | Some("txt") => Ok(SourceKind::PdfText),
        _ if mime == "text/plain" => Ok(SourceKind::PdfText),
        _ => Err(AppError::UnsupportedFormat(format!(
            "{} ({})",
            nome,
            if mime.is_empty() { "sem tipo" } else { mime.as_str() }
        ))),
    }
}

/// UTF-8 (sem BOM); se não for UTF-8 válido, Windows-1252 (exportação do Excel).
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            // Superconjunto do ISO-8859-1: aspas curvas, travessão e € em 0x80..0x9F
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}

/// `;` se a primeira linha tiver ponto e vírgula, senão `,`.
pub fn detect_delimiter(text: &str) -> u8 {
    let first_line = text.lines().next().unwrap_or("");
    if first_line.contains(';') { b';' } else { b',' }
}

/// Junta os itens de texto de cada página com espaço e termina cada página com `\n`.
pub fn extract_pdf_text<S: AsRef<str>>(pages: &[Vec<S>]) -> String {
    let mut text = String::new();
    for page in pages {
        let items: Vec<&str> = page.iter().map(|s| s.as_ref()).collect();
        text.push_str(&items.join(" "));
        text.push('\n');
    }
    text
}

pub fn parse_csv(text: &str) -> Result<ParsedTable, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::EmptySource);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(detect_delimiter(text))
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let raw_headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::UnsupportedFormat(format!("cabeçalho ilegível: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();
    if raw_headers.iter().all(|h| h.is_empty()) {
        return Err(AppError::EmptySource);
    }

    let map = HeaderMap::new(&raw_headers);
    let expected = map.raw_column_count();
    let mut table = ParsedTable {
        headers: map.headers(),
        ..Default::default()
    };

    for (idx, result) in reader.records().enumerate() {
        // linha 1 = cabeçalho
        let fallback_line = idx + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let linha = e
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                let message = match e.kind() {
                    ErrorKind::Utf8 { .. } => "texto inválido na linha".to_string(),
                    _ => e.to_string(),
                };
                table.errors.push(RowParseError { linha, message });
                continue;
            }
        };

        let linha = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_line);
        let values: Vec<&str> = record.iter().collect();
        if values.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        if values.len() != expected {
            table.errors.push(RowParseError {
                linha,
                message: format!(
                    "esperados {} campos, encontrados {}",
                    expected,
                    values.len()
                ),
            });
            continue;
        }
        table.rows.push(map.build_row(&values));
    }

    Ok(table)
}

fn split_columns(line: &str) -> Vec<String> {
    COLUMN_GAP
        .split(line.trim())
        .map(|s| s.trim().to_string())
        .collect()
}

pub fn parse_pdf_text(text: &str) -> Result<ParsedTable, AppError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header_line = lines.next().ok_or(AppError::EmptySource)?;

    let map = HeaderMap::new(&split_columns(header_line));
    let mut table = ParsedTable {
        headers: map.headers(),
        ..Default::default()
    };
    for line in lines {
        let values = split_columns(line);
        if values.iter().all(|v| v.is_empty()) {
            continue;
        }
        table.rows.push(map.build_row(&values));
    }
    Ok(table)
}

/// Ponto de entrada do parser: decodifica e despacha pelo tipo.
pub fn parse(bytes: &[u8], kind: SourceKind) -> Result<ParsedTable, AppError> {
    let text = decode_text(bytes);
    let table = match kind {
        SourceKind::Csv => parse_csv(&text)?,
        SourceKind::PdfText => parse_pdf_text(&text)?,
    };
    tracing::debug!(
        "Parse {:?}: {} cabeçalhos, {} linhas, {} erros",
        kind,
        table.headers.len(),
        table.rows.len(),
        table.errors.len()
    );
    Ok(table)
}

/// Rejeita o lote inteiro se faltar algum cabeçalho obrigatório.
pub fn validate_headers(headers: &[String], required: &[&str]) -> Result<(), AppError> {
    let missing = cabecalho::missing_required(headers, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::MissingHeaders(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importacao::cabecalho::{CLASS, COD_BEM, DESCRICAO, REQUIRED_HEADERS};

    #[test]
    fn semicolon_in_first_line_wins() {
        assert_eq!(detect_delimiter("A;B,C\n1;2,3"), b';');
        assert_eq!(detect_delimiter("A,B,C\n1;2;3"), b',');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn parses_semicolon_csv_with_accented_headers() {
        let table = parse(
            "CÓD BEM;CLASS;DESCRIÇÃO DO BEM\n3504;123110303;CADEIRA AZUL\n".as_bytes(),
            SourceKind::Csv,
        )
        .unwrap();

        assert_eq!(table.headers, vec![COD_BEM, CLASS, DESCRICAO]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][COD_BEM], "3504");
        assert_eq!(table.rows[0][CLASS], "123110303");
        assert_eq!(table.rows[0][DESCRICAO], "CADEIRA AZUL");
        assert!(table.errors.is_empty());
    }

    #[test]
    fn comma_csv_with_quoted_fields() {
        let csv = "Codigo,Descricao\n10,\"MESA, REUNIAO\"\n";
        let table = parse(csv.as_bytes(), SourceKind::Csv).unwrap();
        assert_eq!(table.rows[0][DESCRICAO], "MESA, REUNIAO");
    }

    #[test]
    fn ragged_rows_are_reported_and_parsing_continues() {
        let csv = "CÓD BEM;CLASS\n1;A\n2\n3;C;extra\n4;D\n";
        let table = parse(csv.as_bytes(), SourceKind::Csv).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][COD_BEM], "4");
        let linhas: Vec<usize> = table.errors.iter().map(|e| e.linha).collect();
        assert_eq!(linhas, vec![3, 4]);
    }

    #[test]
    fn blank_rows_are_dropped() {
        let csv = "CÓD BEM;CLASS\n;\n1;A\n\n";
        let table = parse(csv.as_bytes(), SourceKind::Csv).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert!(table.errors.is_empty());
    }

    #[test]
    fn latin1_bytes_are_decoded() {
        // "CÓD BEM;CLASS\n1;X" em ISO-8859-1 (Ó = 0xD3)
        let bytes = b"C\xD3D BEM;CLASS\n1;X\n";
        let table = parse(bytes, SourceKind::Csv).unwrap();
        assert_eq!(table.headers[0], COD_BEM);
        assert_eq!(table.rows[0][COD_BEM], "1");
    }

    #[test]
    fn windows_1252_punctuation_is_decoded() {
        assert_eq!(
            decode_text(b"CADEIRA \x93AZUL\x94 \x96 R\x80"),
            "CADEIRA \u{201C}AZUL\u{201D} \u{2013} R\u{20AC}"
        );
        assert_eq!(decode_text(b"DESCRI\xC7\xC3O"), "DESCRIÇÃO");
    }

    #[test]
    fn utf8_bom_is_stripped() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFabc"), "abc");
    }

    #[test]
    fn empty_source_is_rejected() {
        assert!(matches!(parse(b"", SourceKind::Csv), Err(AppError::EmptySource)));
        assert!(matches!(
            parse(b"  \n\n", SourceKind::PdfText),
            Err(AppError::EmptySource)
        ));
    }

    #[test]
    fn pdf_text_splits_on_wide_gaps() {
        let text = "CÓD BEM   CLASS   DESCRIÇÃO DO BEM\n\n\
                    3504  123110303    CADEIRA AZUL GIRATORIA\n   \n\
                    3505  123110303  MESA DE REUNIAO\n";
        let table = parse(text.as_bytes(), SourceKind::PdfText).unwrap();

        assert_eq!(table.headers, vec![COD_BEM, CLASS, DESCRICAO]);
        assert_eq!(table.rows.len(), 2);
        // espaço simples não separa colunas
        assert_eq!(table.rows[0][DESCRICAO], "CADEIRA AZUL GIRATORIA");
        assert_eq!(table.rows[1][COD_BEM], "3505");
    }

    #[test]
    fn pdf_pages_are_concatenated_line_per_page() {
        let pages = vec![
            vec!["CÓD BEM", "  CLASS"],
            vec!["1", "  X"],
        ];
        assert_eq!(extract_pdf_text(&pages), "CÓD BEM   CLASS\n1   X\n");
    }

    #[test]
    fn sniffs_kind_from_mime_then_extension() {
        assert_eq!(sniff_kind("x.bin", Some("text/csv; charset=utf-8")).unwrap(), SourceKind::Csv);
        assert_eq!(sniff_kind("lista.PDF", None).unwrap(), SourceKind::PdfText);
        assert_eq!(sniff_kind("lista.csv", Some("")).unwrap(), SourceKind::Csv);
        assert_eq!(sniff_kind("extraido.txt", None).unwrap(), SourceKind::PdfText);
        assert!(matches!(
            sniff_kind("foto.png", Some("image/png")),
            Err(AppError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_headers_reject_the_batch() {
        let headers = vec![COD_BEM.to_string(), CLASS.to_string()];
        match validate_headers(&headers, &REQUIRED_HEADERS) {
            Err(AppError::MissingHeaders(missing)) => {
                assert_eq!(missing.len(), 6);
                assert!(missing.contains(&"VALOR".to_string()));
            }
            other => panic!("esperado MissingHeaders, veio {:?}", other),
        }
        assert!(validate_headers(&headers, &[COD_BEM]).is_ok());
    }
}
