pub mod bem;
pub mod conferencia;
pub mod estrutura;
pub mod filtro;
pub mod importacao;
pub mod relatorio;
