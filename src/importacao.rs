// src/importacao.rs
// Pipeline puro de importação (sem banco): parser -> cabeçalhos -> mapeador.

pub mod cabecalho;
pub mod mapeador;
pub mod parser;
