// src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use till_pos::{create_router, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger. RUST_LOG controla o filtro (padrão: info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;
    let bind_addr = settings.bind_addr;

    let app_state = AppState::new(settings).await?;
    let app = create_router(app_state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Servidor encerrado");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Falha ao aguardar Ctrl+C: {}", e);
    }
}
