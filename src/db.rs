pub mod bem_repo;
pub use bem_repo::BemRepository;
pub mod estrutura_repo;
pub use estrutura_repo::EstruturaRepository;
pub mod conferencia_repo;
pub use conferencia_repo::ConferenciaRepository;
pub mod relatorio_repo;
pub use relatorio_repo::RelatorioRepository;
