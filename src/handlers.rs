pub mod bens;
pub mod conferencias;
pub mod estrutura;
pub mod importacao;
pub mod relatorio;
