pub mod bem_service;
pub mod conferencia_service;
pub mod estrutura_service;
pub mod importacao_service;
pub mod relatorio_service;
