//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use patrimonio::{build_router, config::{AppState, Config}};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; padrão "info".
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    tracing::info!(
        "Importação: modo {:?}, todos os cabeçalhos obrigatórios: {}",
        config.import.mode,
        config.import.require_all_headers
    );

    let app = build_router(app_state);

    // Só escuta localmente: é o backend da interface do próprio dispositivo.
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
