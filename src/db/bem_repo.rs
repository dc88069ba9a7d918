// src/db/bem_repo.rs

use sqlx::{Executor, QueryBuilder, Sqlite};

use crate::{
    common::error::AppError,
    importacao::cabecalho::strip_diacritics,
    models::{
        bem::{decimal_to_real, Bem, DadosBem},
        filtro::{FiltroBens, Paginacao},
    },
};

// SELECT base com os nomes de responsável/local vindos dos JOINs.
// O FromRow de Bem depende das quatro colunas *_nome.
const SELECT_BEM: &str = r#"
    SELECT b.*,
           s.nome  AS servidor_nome,
           a.nome  AS ambiente_nome,
           bl.nome AS bloco_nome,
           c.nome  AS campus_nome
    FROM BEM b
    LEFT JOIN SERVIDOR s ON s.id_servidor = b.id_servidor_responsavel
    LEFT JOIN AMBIENTE a ON a.id_ambiente = b.id_ambiente_atual
    LEFT JOIN BLOCO bl   ON bl.id_bloco = a.id_bloco
    LEFT JOIN CAMPUS c   ON c.id_campus = bl.id_campus
"#;

const COUNT_BEM: &str = r#"
    SELECT COUNT(*)
    FROM BEM b
    LEFT JOIN AMBIENTE a ON a.id_ambiente = b.id_ambiente_atual
    LEFT JOIN BLOCO bl   ON bl.id_bloco = a.id_bloco
"#;

/// Sem acento e em minúsculas: "GIRATÓRIA" e "giratoria" viram a mesma coisa.
pub fn dobra_texto(texto: &str) -> String {
    strip_diacritics(texto).to_lowercase()
}

// Conteúdo da coluna `busca`: os quatro campos da busca livre, um por linha.
fn texto_busca(dados: &DadosBem) -> String {
    [
        dados.numero_patrimonio.as_str(),
        dados.descricao_bem.as_str(),
        dados.classificacao.as_str(),
        dados.br_code.as_str(),
    ]
    .map(dobra_texto)
    .join("\n")
}

/// Escapa os curingas do LIKE (`%`, `_`) e a própria barra de escape.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// Anexa o WHERE dos filtros. Serve tanto para a contagem quanto para a página.
fn push_filtros<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filtro: &FiltroBens) {
    qb.push(" WHERE 1 = 1");

    // O LIKE do SQLite só ignora caixa em ASCII; por isso compara com a coluna
    // `busca`, dobrada do mesmo jeito que o termo.
    if let Some(search) = &filtro.search {
        qb.push(" AND b.busca LIKE ")
            .push_bind(format!("%{}%", escape_like(&dobra_texto(search))))
            .push(" ESCAPE '\\'");
    }

    // Classificação casa por prefixo: "1231" encontra "123110303".
    if let Some(classificacao) = &filtro.classificacao {
        qb.push(" AND b.classificacao LIKE ")
            .push_bind(format!("{}%", escape_like(classificacao)))
            .push(" ESCAPE '\\'");
    }
    if let Some(estado) = filtro.estado_conservacao {
        qb.push(" AND b.estado_conservacao = ")
            .push_bind(estado.as_str());
    }
    if let Some(id_campus) = filtro.id_campus {
        qb.push(" AND bl.id_campus = ").push_bind(id_campus);
    }
    if let Some(id_bloco) = filtro.id_bloco {
        qb.push(" AND a.id_bloco = ").push_bind(id_bloco);
    }
    if let Some(id_ambiente) = filtro.id_ambiente {
        qb.push(" AND b.id_ambiente_atual = ").push_bind(id_ambiente);
    }
    if let Some(id_servidor) = filtro.id_servidor_responsavel {
        qb.push(" AND b.id_servidor_responsavel = ").push_bind(id_servidor);
    }
}

fn map_unique(e: sqlx::Error, dados: &DadosBem) -> AppError {
    AppError::from_unique_violation(e, |message| {
        if message.contains("br_code") {
            AppError::BrCodeAlreadyExists(dados.br_code.clone())
        } else {
            AppError::PatrimonioAlreadyExists(dados.numero_patrimonio.clone())
        }
    })
}

#[derive(Clone, Default)]
pub struct BemRepository;

impl BemRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Leitura
    // ---

    pub async fn find_by_id<'e, E>(&self, executor: E, id_bem: i64) -> Result<Option<Bem>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("{} WHERE b.id_bem = ?", SELECT_BEM);
        let bem = sqlx::query_as::<_, Bem>(&sql)
            .bind(id_bem)
            .fetch_optional(executor)
            .await?;
        Ok(bem)
    }

    /// Busca pela chave natural. É a consulta que a reconciliação faz por linha.
    pub async fn find_by_numero_patrimonio<'e, E>(
        &self,
        executor: E,
        numero_patrimonio: &str,
    ) -> Result<Option<Bem>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("{} WHERE b.numero_patrimonio = ?", SELECT_BEM);
        let bem = sqlx::query_as::<_, Bem>(&sql)
            .bind(numero_patrimonio)
            .fetch_optional(executor)
            .await?;
        Ok(bem)
    }

    pub async fn find_by_br_code<'e, E>(&self, executor: E, br_code: &str) -> Result<Option<Bem>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("{} WHERE b.br_code = ?", SELECT_BEM);
        let bem = sqlx::query_as::<_, Bem>(&sql)
            .bind(br_code)
            .fetch_optional(executor)
            .await?;
        Ok(bem)
    }

    pub async fn count<'e, E>(&self, executor: E, filtro: &FiltroBens) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut qb = QueryBuilder::<Sqlite>::new(COUNT_BEM);
        push_filtros(&mut qb, filtro);
        let total: i64 = qb.build_query_scalar::<i64>().fetch_one(executor).await?;
        Ok(total)
    }

    pub async fn find_page<'e, E>(
        &self,
        executor: E,
        filtro: &FiltroBens,
        paginacao: Paginacao,
    ) -> Result<Vec<Bem>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_BEM);
        push_filtros(&mut qb, filtro);
        qb.push(" ORDER BY b.numero_patrimonio ASC, b.id_bem ASC LIMIT ")
            .push_bind(paginacao.page_size)
            .push(" OFFSET ")
            .push_bind(paginacao.offset());

        tracing::debug!("Busca de bens: {}", qb.sql());
        let bens = qb.build_query_as::<Bem>().fetch_all(executor).await?;
        Ok(bens)
    }

    // ---
    // Escrita
    // ---

    /// Insere e devolve o `id_bem` gerado.
    pub async fn insert<'e, E>(&self, executor: E, dados: &DadosBem) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO BEM (
                classificacao, numero_patrimonio, descricao_bem, data_aquisicao,
                valor_aquisicao, empenho_siafi, nota_fiscal, br_code,
                estado_conservacao, id_servidor_responsavel, id_ambiente_atual, busca
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&dados.classificacao)
        .bind(&dados.numero_patrimonio)
        .bind(&dados.descricao_bem)
        .bind(dados.data_aquisicao)
        .bind(decimal_to_real(dados.valor_aquisicao))
        .bind(&dados.empenho_siafi)
        .bind(&dados.nota_fiscal)
        .bind(&dados.br_code)
        .bind(dados.estado_conservacao.as_str())
        .bind(dados.id_servidor_responsavel)
        .bind(dados.id_ambiente_atual)
        .bind(texto_busca(dados))
        .execute(executor)
        .await
        .map_err(|e| map_unique(e, dados))?;

        Ok(result.last_insert_rowid())
    }

    /// Sobrescreve os dados do bem. Identidade e estado de conferência ficam intactos.
    pub async fn update<'e, E>(&self, executor: E, id_bem: i64, dados: &DadosBem) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE BEM
            SET classificacao = ?,
                numero_patrimonio = ?,
                descricao_bem = ?,
                data_aquisicao = ?,
                valor_aquisicao = ?,
                empenho_siafi = ?,
                nota_fiscal = ?,
                br_code = ?,
                estado_conservacao = ?,
                id_servidor_responsavel = ?,
                id_ambiente_atual = ?,
                busca = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id_bem = ?
            "#,
        )
        .bind(&dados.classificacao)
        .bind(&dados.numero_patrimonio)
        .bind(&dados.descricao_bem)
        .bind(dados.data_aquisicao)
        .bind(decimal_to_real(dados.valor_aquisicao))
        .bind(&dados.empenho_siafi)
        .bind(&dados.nota_fiscal)
        .bind(&dados.br_code)
        .bind(dados.estado_conservacao.as_str())
        .bind(dados.id_servidor_responsavel)
        .bind(dados.id_ambiente_atual)
        .bind(texto_busca(dados))
        .bind(id_bem)
        .execute(executor)
        .await
        .map_err(|e| map_unique(e, dados))?;

        if result.rows_affected() == 0 {
            return Err(AppError::BemNotFound(id_bem.to_string()));
        }
        Ok(())
    }

    pub async fn delete<'e, E>(&self, executor: E, id_bem: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM BEM WHERE id_bem = ?")
            .bind(id_bem)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::BemNotFound(id_bem.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\x"), "c:\\\\x");
        assert_eq!(escape_like("cadeira"), "cadeira");
    }

    #[test]
    fn search_text_is_folded() {
        assert_eq!(dobra_texto("CADEIRA GIRATÓRIA"), "cadeira giratoria");
        assert_eq!(dobra_texto("Ação"), "acao");
    }

    #[test]
    fn filters_are_parameterized() {
        let filtro = FiltroBens {
            search: Some("cadeira".into()),
            classificacao: Some("1231".into()),
            id_campus: Some(2),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Sqlite>::new(COUNT_BEM);
        push_filtros(&mut qb, &filtro);
        let sql = qb.sql();

        assert!(!sql.contains("cadeira"));
        assert!(sql.contains("b.classificacao LIKE ?"));
        assert!(sql.contains("bl.id_campus = ?"));
        assert!(sql.contains("b.busca LIKE ?"));
        assert_eq!(sql.matches('?').count(), 3);
    }
}
