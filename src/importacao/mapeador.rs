// src/importacao/mapeador.rs
//
// Linha normalizada -> BemCandidato. Nunca falha: campos ruins viram valores
// padrão e geram um aviso; só a falta do número de patrimônio descarta a linha.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::cabecalho::{
    self, AQUISICAO, CLASS, COD_BEM, CONSERVACAO, DESCRICAO, EMPENHO, LOCALIZACAO, NOTA_FIS,
    VALOR,
};
use crate::models::{
    bem::{derive_br_code, EstadoConservacao},
    importacao::{BemCandidato, ImportRow, ImportWarning},
};

static DATA_BARRAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("regex válida"));
static DATA_COMPACTA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})(\d{2})(\d{4})$").expect("regex válida"));
static DATA_ISO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("regex válida"));
// Data no fim da descrição ("CADEIRA GIRATORIA 12/03/2019")
static DATA_NA_DESCRICAO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}/\d{1,2}/\d{4})\s*$").expect("regex válida"));

#[derive(Debug, Clone, Default)]
pub struct MapOutcome {
    /// `None` quando a linha não tem número de patrimônio.
    pub candidato: Option<BemCandidato>,
    pub warnings: Vec<ImportWarning>,
}

// Lote mapeado: candidatos em ordem de entrada + descartes.
#[derive(Debug, Clone, Default)]
pub struct MappedBatch {
    pub candidatos: Vec<BemCandidato>,
    pub skipped: usize,
    pub warnings: Vec<ImportWarning>,
}

fn field<'a>(row: &'a ImportRow, label: &str) -> &'a str {
    row.get(label).map(|v| v.trim()).unwrap_or("")
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() { None } else { Some(value.to_string()) }
}

/// Aceita `DD/MM/YYYY`, `D/M/YYYY`, `DDMMYYYY` e ISO `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let (d, m, y) = if let Some(c) = DATA_BARRAS.captures(raw) {
        (c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?)
    } else if let Some(c) = DATA_COMPACTA.captures(raw) {
        (c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?)
    } else if let Some(c) = DATA_ISO.captures(raw) {
        (c[3].parse().ok()?, c[2].parse().ok()?, c[1].parse().ok()?)
    } else {
        return None;
    };
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Data no final da descrição, se houver.
pub fn trailing_date(descricao: &str) -> Option<NaiveDate> {
    DATA_NA_DESCRICAO
        .captures(descricao.trim())
        .and_then(|c| parse_date(&c[1]))
}

/// Converte moeda brasileira ("R$ 1.234,56") em Decimal.
///
/// Com vírgula: pontos são milhar e a vírgula é decimal. Sem vírgula: um único
/// ponto seguido de exatamente 3 dígitos é milhar ("1.234"), senão é decimal.
pub fn parse_currency(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        let dots = cleaned.matches('.').count();
        let thousands = match cleaned.split_once('.') {
            Some((_, after)) if dots == 1 => after.len() == 3,
            _ => dots > 1,
        };
        if thousands { cleaned.replace('.', "") } else { cleaned }
    };
    Decimal::from_str(&normalized).ok()
}

/// Busca por substring, sem acento e sem caixa.
pub fn parse_estado(raw: &str) -> Option<EstadoConservacao> {
    let folded = cabecalho::strip_diacritics(raw).to_lowercase();
    [
        ("excelente", EstadoConservacao::Excelente),
        ("bom", EstadoConservacao::Bom),
        ("regular", EstadoConservacao::Regular),
        ("ruim", EstadoConservacao::Ruim),
        ("pessimo", EstadoConservacao::Pessimo),
    ]
    .into_iter()
    .find(|(needle, _)| folded.contains(needle))
    .map(|(_, estado)| estado)
}

pub fn map_row(row: &ImportRow, today: NaiveDate) -> MapOutcome {
    let numero = field(row, COD_BEM);
    if numero.is_empty() {
        return MapOutcome::default();
    }

    let mut warnings = Vec::new();
    let mut warn = |campo: &str, message: String| {
        tracing::warn!("Patrimônio {}: {}", numero, message);
        warnings.push(ImportWarning {
            patrimonio: numero.to_string(),
            campo: campo.to_string(),
            message,
        });
    };

    let descricao = field(row, DESCRICAO);

    // --- Data de aquisição ---
    let data_bruta = field(row, AQUISICAO);
    let data_aquisicao = if data_bruta.is_empty() {
        trailing_date(descricao)
    } else {
        parse_date(data_bruta)
    };
    let data_aquisicao = data_aquisicao.unwrap_or_else(|| {
        let motivo = if data_bruta.is_empty() {
            "ausente".to_string()
        } else {
            format!("inválida ('{}')", data_bruta)
        };
        warn(
            AQUISICAO,
            format!("Data de aquisição {}; usando a data de hoje", motivo),
        );
        today
    });

    // --- Valor ---
    let valor_bruto = field(row, VALOR);
    let valor_aquisicao = if valor_bruto.is_empty() {
        Decimal::ZERO
    } else {
        match parse_currency(valor_bruto) {
            Some(v) if v.is_sign_negative() && !v.is_zero() => {
                warn(VALOR, format!("Valor negativo ('{}'); usando 0", valor_bruto));
                Decimal::ZERO
            }
            Some(v) => v.round_dp(2),
            None => {
                warn(VALOR, format!("Valor inválido ('{}'); usando 0", valor_bruto));
                Decimal::ZERO
            }
        }
    };

    // --- Estado de conservação ---
    let estado_bruto = field(row, CONSERVACAO);
    let estado_conservacao = if estado_bruto.is_empty() {
        EstadoConservacao::default()
    } else {
        parse_estado(estado_bruto).unwrap_or_else(|| {
            warn(
                CONSERVACAO,
                format!("Estado de conservação desconhecido ('{}'); usando BOM", estado_bruto),
            );
            EstadoConservacao::default()
        })
    };

    let candidato = BemCandidato {
        classificacao: field(row, CLASS).to_string(),
        numero_patrimonio: numero.to_string(),
        descricao_bem: descricao.to_string(),
        data_aquisicao,
        valor_aquisicao,
        empenho_siafi: optional(field(row, EMPENHO)),
        nota_fiscal: optional(field(row, NOTA_FIS)),
        br_code: derive_br_code(numero),
        estado_conservacao,
        localizacao: optional(field(row, LOCALIZACAO)),
    };

    MapOutcome {
        candidato: Some(candidato),
        warnings,
    }
}

/// Mapeia todas as linhas, preservando a ordem de entrada.
pub fn map_rows(rows: &[ImportRow], today: NaiveDate) -> MappedBatch {
    let mut batch = MappedBatch::default();
    for row in rows {
        let outcome = map_row(row, today);
        batch.warnings.extend(outcome.warnings);
        match outcome.candidato {
            Some(candidato) => batch.candidatos.push(candidato),
            None => batch.skipped += 1,
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn row(pairs: &[(&str, &str)]) -> ImportRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn brazilian_dates_become_iso() {
        assert_eq!(parse_date("15/03/2020"), NaiveDate::from_ymd_opt(2020, 3, 15));
        assert_eq!(parse_date("5/3/2020"), NaiveDate::from_ymd_opt(2020, 3, 5));
        assert_eq!(parse_date("15032020"), NaiveDate::from_ymd_opt(2020, 3, 15));
        assert_eq!(parse_date("2020-03-15"), NaiveDate::from_ymd_opt(2020, 3, 15));
        assert_eq!(
            parse_date("15/03/2020").unwrap().to_string(),
            "2020-03-15"
        );
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert_eq!(parse_date("31/02/2020"), None);
        assert_eq!(parse_date("2020"), None);
        assert_eq!(parse_date("ontem"), None);
    }

    #[test]
    fn currency_in_brazilian_format() {
        assert_eq!(parse_currency("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_currency("R$ 12.345.678,90"), Some(dec("12345678.90")));
        assert_eq!(parse_currency("89,9"), Some(dec("89.9")));
    }

    #[test]
    fn currency_without_comma() {
        assert_eq!(parse_currency("1.234"), Some(dec("1234")));
        assert_eq!(parse_currency("1.234.567"), Some(dec("1234567")));
        assert_eq!(parse_currency("1234.56"), Some(dec("1234.56")));
        assert_eq!(parse_currency("350"), Some(dec("350")));
    }

    #[test]
    fn garbage_currency_is_none() {
        assert_eq!(parse_currency("abc"), None);
        assert_eq!(parse_currency("1-2"), None);
    }

    #[test]
    fn estado_matches_by_substring() {
        assert_eq!(parse_estado("Ótimo/EXCELENTE"), Some(EstadoConservacao::Excelente));
        assert_eq!(parse_estado("em bom estado"), Some(EstadoConservacao::Bom));
        assert_eq!(parse_estado("PÉSSIMO"), Some(EstadoConservacao::Pessimo));
        assert_eq!(parse_estado("Ruim"), Some(EstadoConservacao::Ruim));
        assert_eq!(parse_estado("quebrado"), None);
    }

    #[test]
    fn full_row_is_mapped() {
        let r = row(&[
            (COD_BEM, " 3504 "),
            (CLASS, "123110303"),
            (DESCRICAO, "CADEIRA AZUL"),
            (LOCALIZACAO, "SALA 101"),
            (AQUISICAO, "15/03/2020"),
            (NOTA_FIS, "NF-77"),
            (EMPENHO, ""),
            (VALOR, "1.234,56"),
            (CONSERVACAO, "Regular"),
        ]);
        let out = map_row(&r, today());
        let c = out.candidato.unwrap();

        assert_eq!(c.numero_patrimonio, "3504");
        assert_eq!(c.br_code, "PAT-3504");
        assert_eq!(c.data_aquisicao, NaiveDate::from_ymd_opt(2020, 3, 15).unwrap());
        assert_eq!(c.valor_aquisicao, dec("1234.56"));
        assert_eq!(c.nota_fiscal.as_deref(), Some("NF-77"));
        assert_eq!(c.empenho_siafi, None);
        assert_eq!(c.estado_conservacao, EstadoConservacao::Regular);
        assert_eq!(c.localizacao.as_deref(), Some("SALA 101"));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn row_without_code_is_skipped() {
        let out = map_row(&row(&[(COD_BEM, "   "), (DESCRICAO, "MESA")]), today());
        assert!(out.candidato.is_none());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn defaults_are_applied_with_warnings() {
        let r = row(&[
            (COD_BEM, "10"),
            (AQUISICAO, "sem data"),
            (VALOR, "??"),
            (CONSERVACAO, "quebrado"),
        ]);
        let out = map_row(&r, today());
        let c = out.candidato.unwrap();

        assert_eq!(c.data_aquisicao, today());
        assert_eq!(c.valor_aquisicao, Decimal::ZERO);
        assert_eq!(c.estado_conservacao, EstadoConservacao::Bom);
        let campos: Vec<&str> = out.warnings.iter().map(|w| w.campo.as_str()).collect();
        assert_eq!(campos, vec![AQUISICAO, VALOR, CONSERVACAO]);
    }

    #[test]
    fn negative_value_becomes_zero() {
        let out = map_row(&row(&[(COD_BEM, "10"), (VALOR, "-5,00"), (AQUISICAO, "01/01/2020")]), today());
        assert_eq!(out.candidato.unwrap().valor_aquisicao, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn date_in_description_is_used_when_column_is_empty() {
        let r = row(&[
            (COD_BEM, "11"),
            (DESCRICAO, "ARMARIO DE ACO 12/08/2019"),
            (AQUISICAO, ""),
        ]);
        let c = map_row(&r, today()).candidato.unwrap();
        assert_eq!(c.data_aquisicao, NaiveDate::from_ymd_opt(2019, 8, 12).unwrap());
        assert_eq!(c.descricao_bem, "ARMARIO DE ACO 12/08/2019");

        // a coluna explícita tem prioridade
        let r = row(&[
            (COD_BEM, "11"),
            (DESCRICAO, "ARMARIO DE ACO 12/08/2019"),
            (AQUISICAO, "01/02/2018"),
        ]);
        let c = map_row(&r, today()).candidato.unwrap();
        assert_eq!(c.data_aquisicao, NaiveDate::from_ymd_opt(2018, 2, 1).unwrap());
    }

    #[test]
    fn short_date_in_description_is_accepted() {
        assert_eq!(
            trailing_date("MESA 5/3/2019"),
            NaiveDate::from_ymd_opt(2019, 3, 5)
        );
        assert_eq!(
            trailing_date("MESA 05/3/2019 "),
            NaiveDate::from_ymd_opt(2019, 3, 5)
        );
        assert_eq!(trailing_date("MESA 5/3/19"), None);

        let r = row(&[(COD_BEM, "12"), (DESCRICAO, "MESA 5/3/2019"), (AQUISICAO, "")]);
        let out = map_row(&r, today());
        assert!(out.warnings.is_empty());
        assert_eq!(
            out.candidato.unwrap().data_aquisicao,
            NaiveDate::from_ymd_opt(2019, 3, 5).unwrap()
        );
    }

    #[test]
    fn batch_counts_skipped_rows_in_order() {
        let rows = vec![
            row(&[(COD_BEM, "1"), (AQUISICAO, "01/01/2020")]),
            row(&[(COD_BEM, "")]),
            row(&[(COD_BEM, "2"), (AQUISICAO, "01/01/2020")]),
        ];
        let batch = map_rows(&rows, today());
        assert_eq!(batch.skipped, 1);
        let codigos: Vec<&str> = batch
            .candidatos
            .iter()
            .map(|c| c.numero_patrimonio.as_str())
            .collect();
        assert_eq!(codigos, vec!["1", "2"]);
    }
}
