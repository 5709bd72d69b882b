use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_core::{TodoApi, TodoApp, TodoClient};
use todo_host::{router, watch_error, Config, ReqwestTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,todo_core=debug,todo_host=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load();

    let app = match config.owner() {
        Some(user_id) => {
            tracing::info!(api = %config.api_url, user_id, "starting");
            let transport = ReqwestTransport::new(config.request_timeout())?;
            let client = TodoClient::new(&config.api_url, user_id);
            let app = TodoApp::new(TodoApi::new(client, transport));
            app.load().await;
            let app = Arc::new(app);
            watch_error(&app).await;
            Some(app)
        }
        None => {
            tracing::warn!("no usable user id configured, serving the warning screen");
            None
        }
    };

    let listener = TcpListener::bind(config.listen).await?;
    tracing::info!("listening on {}", config.listen);
    axum::serve(listener, router(app)).await?;
    Ok(())
}
