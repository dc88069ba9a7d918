// src/models/filtro.rs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::bem::{Bem, EstadoConservacao};

/// Tamanho de página usado quando o chamador não informa um.
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Limite superior do tamanho de página.
pub const MAX_PAGE_SIZE: i64 = 200;

// Filtros de busca de bens. Todos opcionais, combinados com AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FiltroBens {
    /// Texto livre: número de patrimônio, descrição, classificação ou código de leitura.
    pub search: Option<String>,
    /// Casamento por prefixo (códigos de classificação são hierárquicos).
    pub classificacao: Option<String>,
    pub estado_conservacao: Option<EstadoConservacao>,
    pub id_campus: Option<i64>,
    pub id_bloco: Option<i64>,
    pub id_ambiente: Option<i64>,
    pub id_servidor_responsavel: Option<i64>,
}

impl FiltroBens {
    /// Descarta strings vazias (campo de busca limpo na tela = sem filtro).
    pub fn normalized(mut self) -> Self {
        self.search = non_blank(self.search);
        self.classificacao = non_blank(self.classificacao);
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Página solicitada (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paginacao {
    pub page: i64,
    pub page_size: i64,
}

impl Default for Paginacao {
    fn default() -> Self {
        Self { page: 1, page_size: DEFAULT_PAGE_SIZE }
    }
}

impl Paginacao {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// Página abaixo de 1 vira 1; tamanho fica em [1, MAX_PAGE_SIZE].
    pub fn sanitized(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Satura em `i64::MAX`: página absurda vira janela vazia, não overflow.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// `has_more` = offset + itens retornados < total.
pub fn has_more(offset: i64, returned: usize, total: i64) -> bool {
    offset.saturating_add(returned as i64) < total
}

// Janela de resultados. O motor é stateless: páginas seguintes são
// concatenadas pelo chamador (scroll infinito).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BensResult {
    pub bens: Vec<Bem>,
    pub total: i64,
    pub has_more: bool,
    pub page: i64,
    pub page_size: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_one_based() {
        assert_eq!(Paginacao::new(1, 20).offset(), 0);
        assert_eq!(Paginacao::new(3, 20).offset(), 40);
    }

    #[test]
    fn sanitized_clamps_page_and_size() {
        let p = Paginacao::new(0, 0).sanitized();
        assert_eq!(p, Paginacao::new(1, 1));

        let p = Paginacao::new(-4, 10_000).sanitized();
        assert_eq!(p, Paginacao::new(1, MAX_PAGE_SIZE));
    }

    #[test]
    fn pages_with_more_are_all_but_last() {
        // n = 45, p = 20 -> 3 páginas, 2 com has_more
        let total = 45;
        let size = 20;
        let mut with_more = 0;
        for page in 1..=3 {
            let p = Paginacao::new(page, size);
            let returned = (total - p.offset()).min(size) as usize;
            if has_more(p.offset(), returned, total) {
                with_more += 1;
            }
        }
        assert_eq!(with_more, 2);
    }

    #[test]
    fn huge_page_saturates_the_offset() {
        let p = Paginacao::new(i64::MAX, 200).sanitized();
        assert_eq!(p.offset(), i64::MAX);
        assert!(!has_more(p.offset(), 0, 45));
    }

    #[test]
    fn empty_page_past_the_end_has_no_more() {
        assert!(!has_more(100, 0, 45));
    }

    #[test]
    fn normalized_drops_blank_strings() {
        let f = FiltroBens {
            search: Some("   ".into()),
            classificacao: Some(" 1231 ".into()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(f.search, None);
        assert_eq!(f.classificacao.as_deref(), Some("1231"));
    }
}
