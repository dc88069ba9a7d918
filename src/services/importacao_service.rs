// src/services/importacao_service.rs
//
// Importação em lote: parse -> cabeçalhos -> mapeamento -> reconciliação com o banco.

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;

use crate::{
    common::error::AppError,
    config::ImportSettings,
    db::{BemRepository, EstruturaRepository},
    importacao::{
        cabecalho::{COD_BEM, REQUIRED_HEADERS},
        mapeador::{self, MappedBatch},
        parser,
    },
    models::{
        bem::DadosBem,
        importacao::{
            ArquivoImportacao, BemCandidato, ImportBatchResult, ImportErrorDetail, ImportMode,
            ImportPreview, ParsedTable, SourceKind,
        },
    },
};

// Resultado da resolução da coluna LOCALIZAÇÃO.
#[derive(Debug, Clone, Copy, Default)]
struct LocalResolvido {
    id_ambiente: Option<i64>,
    id_servidor: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reconciliado {
    Inserido,
    Atualizado,
}

// Lote já parseado e mapeado, pronto para gravar.
struct LotePreparado {
    kind: SourceKind,
    table: ParsedTable,
    mapped: MappedBatch,
}

#[derive(Clone)]
pub struct ImportacaoService {
    bem_repo: BemRepository,
    estrutura_repo: EstruturaRepository,
    settings: ImportSettings,
    pool: SqlitePool,
}

impl ImportacaoService {
    pub fn new(
        bem_repo: BemRepository,
        estrutura_repo: EstruturaRepository,
        settings: ImportSettings,
        pool: SqlitePool,
    ) -> Self {
        Self { bem_repo, estrutura_repo, settings, pool }
    }

    // --- 1. Etapas puras (sem banco) ---

    fn preparar(
        &self,
        arquivo: &ArquivoImportacao,
        kind: Option<SourceKind>,
        today: NaiveDate,
    ) -> Result<LotePreparado, AppError> {
        let kind = match kind {
            Some(kind) => kind,
            None => parser::sniff_kind(&arquivo.nome, arquivo.mime_type.as_deref())?,
        };
        let table = parser::parse(&arquivo.bytes, kind)?;

        // Só o CSV pode relaxar a checagem; texto de PDF sempre exige todas as colunas.
        let required: &[&str] = if kind == SourceKind::Csv && !self.settings.require_all_headers {
            &[COD_BEM]
        } else {
            &REQUIRED_HEADERS
        };
        parser::validate_headers(&table.headers, required)?;

        let mapped = mapeador::map_rows(&table.rows, today);
        Ok(LotePreparado { kind, table, mapped })
    }

    /// Parse + mapeamento para conferência na tela antes de gravar.
    pub fn preview(
        &self,
        arquivo: &ArquivoImportacao,
        kind: Option<SourceKind>,
        today: NaiveDate,
    ) -> Result<ImportPreview, AppError> {
        let lote = self.preparar(arquivo, kind, today)?;
        Ok(ImportPreview {
            kind: lote.kind,
            headers: lote.table.headers,
            parsed_count: lote.table.rows.len(),
            skipped: lote.mapped.skipped,
            candidatos: lote.mapped.candidatos,
            warnings: lote.mapped.warnings,
            parse_errors: lote.table.errors,
        })
    }

    // --- 2. Importação completa ---

    pub async fn import_file(
        &self,
        arquivo: &ArquivoImportacao,
        kind: Option<SourceKind>,
        today: NaiveDate,
    ) -> Result<ImportBatchResult, AppError> {
        let lote = self.preparar(arquivo, kind, today)?;
        tracing::info!(
            "Importando '{}' ({:?}): {} linhas, {} candidatos, {} descartadas",
            arquivo.nome,
            lote.kind,
            lote.table.rows.len(),
            lote.mapped.candidatos.len(),
            lote.mapped.skipped
        );

        let mut result = self.reconcile(&lote.mapped.candidatos).await?;
        result.skipped = lote.mapped.skipped;
        result.warnings = lote.mapped.warnings;
        result.parse_errors = lote.table.errors;
        Ok(result)
    }

    /// Grava os candidatos em ordem, no modo configurado.
    /// Só devolve `Err` se nem for possível obter uma conexão.
    pub async fn reconcile(&self, candidatos: &[BemCandidato]) -> Result<ImportBatchResult, AppError> {
        let result = match self.settings.mode {
            ImportMode::BestEffort => self.reconcile_best_effort(candidatos).await?,
            ImportMode::Atomic => self.reconcile_atomic(candidatos).await?,
        };
        tracing::info!(
            "Importação concluída: {} inseridos, {} atualizados, {} erros",
            result.inserted,
            result.updated,
            result.errors
        );
        Ok(result)
    }

    async fn reconcile_best_effort(&self, candidatos: &[BemCandidato]) -> Result<ImportBatchResult, AppError> {
        let mut conn = self.pool.acquire().await?;
        let mut cache = HashMap::new();
        let mut result = ImportBatchResult::default();

        for candidato in candidatos {
            match self.reconcile_one(&mut conn, candidato, &mut cache).await {
                Ok(Reconciliado::Inserido) => result.inserted += 1,
                Ok(Reconciliado::Atualizado) => result.updated += 1,
                Err(e) => {
                    tracing::warn!(
                        "Falha ao importar o patrimônio {}: {}",
                        candidato.numero_patrimonio,
                        e
                    );
                    result.error_details.push(ImportErrorDetail {
                        patrimonio: candidato.numero_patrimonio.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        result.imported = result.inserted + result.updated;
        result.errors = result.error_details.len();
        result.success = result.errors == 0;
        Ok(result)
    }

    async fn reconcile_atomic(&self, candidatos: &[BemCandidato]) -> Result<ImportBatchResult, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut cache = HashMap::new();
        let mut result = ImportBatchResult::default();

        for candidato in candidatos {
            match self.reconcile_one(&mut tx, candidato, &mut cache).await {
                Ok(Reconciliado::Inserido) => result.inserted += 1,
                Ok(Reconciliado::Atualizado) => result.updated += 1,
                Err(e) => {
                    tx.rollback().await?;
                    tracing::warn!(
                        "Importação desfeita: patrimônio {} falhou ({})",
                        candidato.numero_patrimonio,
                        e
                    );
                    // Nada foi gravado: os contadores voltam a zero.
                    return Ok(ImportBatchResult {
                        success: false,
                        errors: 1,
                        error_details: vec![ImportErrorDetail {
                            patrimonio: candidato.numero_patrimonio.clone(),
                            error: e.to_string(),
                        }],
                        ..Default::default()
                    });
                }
            }
        }

        tx.commit().await?;
        result.imported = result.inserted + result.updated;
        result.success = true;
        Ok(result)
    }

    // --- 3. Uma linha: procura pelo número de patrimônio, atualiza ou insere ---

    async fn reconcile_one(
        &self,
        conn: &mut SqliteConnection,
        candidato: &BemCandidato,
        cache: &mut HashMap<String, LocalResolvido>,
    ) -> Result<Reconciliado, AppError> {
        let local = self.resolve_local(conn, candidato.localizacao.as_deref(), cache).await?;
        let existente = self
            .bem_repo
            .find_by_numero_patrimonio(&mut *conn, &candidato.numero_patrimonio)
            .await?;

        let mut dados = DadosBem {
            classificacao: candidato.classificacao.clone(),
            numero_patrimonio: candidato.numero_patrimonio.clone(),
            descricao_bem: candidato.descricao_bem.clone(),
            data_aquisicao: candidato.data_aquisicao,
            valor_aquisicao: candidato.valor_aquisicao,
            empenho_siafi: candidato.empenho_siafi.clone(),
            nota_fiscal: candidato.nota_fiscal.clone(),
            br_code: candidato.br_code.clone(),
            estado_conservacao: candidato.estado_conservacao,
            id_servidor_responsavel: local.id_servidor,
            id_ambiente_atual: local.id_ambiente,
        };

        match existente {
            Some(bem) => {
                // Local não resolvido não apaga o que já estava no cadastro
                dados.id_ambiente_atual = dados.id_ambiente_atual.or(bem.id_ambiente_atual);
                dados.id_servidor_responsavel =
                    dados.id_servidor_responsavel.or(bem.id_servidor_responsavel);
                self.bem_repo.update(&mut *conn, bem.id_bem, &dados).await?;
                Ok(Reconciliado::Atualizado)
            }
            None => {
                dados.id_ambiente_atual = dados.id_ambiente_atual.or(self.settings.fallback_ambiente_id);
                dados.id_servidor_responsavel =
                    dados.id_servidor_responsavel.or(self.settings.fallback_servidor_id);
                self.bem_repo.insert(&mut *conn, &dados).await?;
                Ok(Reconciliado::Inserido)
            }
        }
    }

    async fn resolve_local(
        &self,
        conn: &mut SqliteConnection,
        label: Option<&str>,
        cache: &mut HashMap<String, LocalResolvido>,
    ) -> Result<LocalResolvido, AppError> {
        let Some(label) = label else {
            return Ok(LocalResolvido::default());
        };
        let key = label.trim().to_lowercase();
        if let Some(local) = cache.get(&key) {
            return Ok(*local);
        }

        let local = match self.estrutura_repo.find_ambiente_by_label(&mut *conn, label).await? {
            Some(ambiente) => LocalResolvido {
                id_ambiente: Some(ambiente.id_ambiente),
                id_servidor: ambiente.id_servidor_responsavel,
            },
            None => {
                tracing::debug!("Localização '{}' não corresponde a nenhum ambiente", label);
                LocalResolvido::default()
            }
        };
        cache.insert(key, local);
        Ok(local)
    }
}
