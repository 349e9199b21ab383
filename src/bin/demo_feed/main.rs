//! Demo feed server for the courtside client
//!
//! A miniature stand-in for the hardcourt backend: serves the live-matches
//! snapshot, the tournaments query, and a simulated push feed on `/ws`.
//! Run with: `cargo run --bin demo-feed --features demo`

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod state;

use state::FeedState;

/// Interval between simulated points
const TICK_INTERVAL: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "demo_feed=debug,courtside=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = FeedState::new();
    tokio::spawn(state::run_simulator(state.clone(), TICK_INTERVAL));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/matches", get(matches))
        .route("/api/tournaments", get(tournaments))
        .route("/ws", get(feed))
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 8080));
    tracing::info!("demo feed listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "courtside-demo-feed",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn matches(
    State(state): State<FeedState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let status = params.get("status").map(String::as_str);
    Json(state.matches_with_status(status).await)
}

async fn tournaments(
    State(state): State<FeedState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let status = params.get("status").cloned();
    let mut tournaments = state.tournaments();
    if let Some(status) = status {
        tournaments.retain(|t| t.status == status);
    }
    Json(tournaments)
}

async fn feed(ws: WebSocketUpgrade, State(state): State<FeedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| forward_feed(socket, state))
}

/// Forward simulated records to one connected socket until it goes away
async fn forward_feed(socket: WebSocket, state: FeedState) {
    let (mut sink, mut inbound) = socket.split();
    let mut feed = state.subscribe();
    loop {
        tokio::select! {
            update = feed.recv() => {
                match update {
                    Ok(payload) => {
                        if sink.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    // Skipped frames are fine, the feed carries complete records
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            frame = inbound.next() => {
                match frame {
                    Some(Ok(_)) => continue,
                    _ => break,
                }
            }
        }
    }
}
