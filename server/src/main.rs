use anyhow::Context;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use futures::{SinkExt, StreamExt};
use livepoll_protocol::{ServerToClient, Stats};
use tokio::sync::mpsc;
use tracing::{info, warn};

mod broadcast;
mod config;
mod dispatch;
mod error;
mod ledger;
mod lifecycle;
mod registry;
mod state;

use config::Config;
use error::PollError;
use state::Coordinator;

#[derive(Clone)]
struct AppState {
    poll: Coordinator,
    allow_reset: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(&config);

    info!("livepoll server v{} starting", env!("CARGO_PKG_VERSION"));

    let state = AppState {
        poll: Coordinator::new(),
        allow_reset: config.allow_reset,
    };
    let poll = state.poll.clone();
    let app = router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("server listening on ws://{addr}/ws");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!(connections = poll.connection_count(), "server stopped");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("livepoll_server=info"));
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/reset", post(reset_handler))
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutting down");
}

async fn stats_handler(State(state): State<AppState>) -> Json<Stats> {
    Json(state.poll.stats())
}

async fn reset_handler(State(state): State<AppState>) -> StatusCode {
    if !state.allow_reset {
        return StatusCode::NOT_FOUND;
    }
    state.poll.reset();
    StatusCode::NO_CONTENT
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.poll))
}

async fn handle_socket(socket: WebSocket, poll: Coordinator) {
    let (mut sender, mut receiver) = socket.split();

    let (tx_out, mut rx_out) = mpsc::unbounded_channel::<ServerToClient>();
    // The registry holds the only sender, so the writer stops once the
    // connection is unregistered.
    let my_id = poll.open(tx_out);

    tokio::spawn(async move {
        while let Some(msg) = rx_out.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(err) => {
                    warn!(conn = %my_id, error = %err, "failed to encode outbound message");
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => poll.handle_text(my_id, &text),
            Ok(Message::Binary(bytes)) => match std::str::from_utf8(&bytes) {
                Ok(text) => poll.handle_text(my_id, text),
                Err(_) => poll.reject(my_id, PollError::MalformedMessage),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(conn = %my_id, error = %err, "websocket error");
                break;
            }
        }
    }

    poll.close(my_id);
}
