use anyhow::Context;
use axum::{Router, routing::get};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{Level, info};
use voicemesh_server::{AppState, RoomRegistry, SignalingService, ws_handler};

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let port = match env::var("PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .with_context(|| format!("invalid PORT value '{raw}'"))?,
        Err(_) => DEFAULT_PORT,
    };

    let state = Arc::new(AppState {
        signaling: SignalingService::new(),
        registry: RoomRegistry::new(),
    });

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Signaling relay listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
