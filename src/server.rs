//! HTTP surface and WebSocket transport listener.

use crate::error::SignalingError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::router::SignalingRouter;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Builds the application router: `/` info page, `/health` counters, `/ws`
/// signaling endpoint. CORS is permissive so the browser IDE shell can reach
/// the server cross-origin.
pub fn app(router: Arc<SignalingRouter>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(router)
}

async fn index_handler() -> Html<&'static str> {
    Html("<h1>SimCast Signaling Server</h1><p>WebSocket endpoint: /ws</p>")
}

async fn health_handler(State(router): State<Arc<SignalingRouter>>) -> Json<serde_json::Value> {
    let stats = router.stats().await;
    Json(serde_json::json!({
        "status": "ok",
        "connections": stats.connections,
        "rooms": stats.rooms,
    }))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(router): State<Arc<SignalingRouter>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, router))
}

/// Per-connection transport loop. The identity is assigned (and `welcome`
/// queued) before the first inbound frame is read; transport close of any
/// kind funnels into the router's disconnect cleanup.
async fn handle_socket(socket: WebSocket, router: Arc<SignalingRouter>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let client_id = router.connect(tx.clone()).await;

    // Outbound pump: drains the frame queue so a slow peer never stalls the
    // router.
    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&message) {
                if ws_sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        let raw = match result {
            Ok(Message::Text(text)) => text.into_bytes(),
            Ok(Message::Binary(bytes)) => bytes,
            Ok(Message::Close(_)) => break,
            // Ping/pong are answered at the transport layer.
            Ok(_) => continue,
            Err(_) => break,
        };
        match serde_json::from_slice::<ClientMessage>(&raw) {
            Ok(message) => router.handle(&client_id, message).await,
            Err(err) => {
                tracing::debug!(client_id = %client_id, error = %err, "Rejected malformed frame");
                let _ = tx.send(SignalingError::Malformed(err).into_message());
            }
        }
    }

    router.disconnect(&client_id).await;
    send_task.abort();
}
