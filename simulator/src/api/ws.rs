use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State as AxumState,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use liftoff_types::{PlayerId, RecordEvent};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

use super::http::{auth_token, authorize};
use crate::Simulator;

#[derive(Deserialize)]
pub(super) struct RealtimeParams {
    token: Option<String>,
}

/// Realtime feed of changes to one player record.
///
/// The token may be passed as `?token=` (browsers cannot set headers on a
/// WebSocket handshake) or as an `Authorization` header.
pub(super) async fn realtime_ws(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(id): Path<String>,
    Query(params): Query<RealtimeParams>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let id = PlayerId::new(id);
    let token = params.token.as_deref().or_else(|| auth_token(&headers));
    if let Err(response) = authorize(&simulator, token, &id).await {
        return response;
    }

    // Subscribe before the upgrade completes so no update after the
    // handshake is missed.
    let updates = simulator.update_subscriber();
    ws.on_upgrade(move |socket| handle_realtime_ws(socket, simulator, id, updates))
        .into_response()
}

async fn handle_realtime_ws(
    socket: WebSocket,
    simulator: Arc<Simulator>,
    player: PlayerId,
    mut updates: broadcast::Receiver<RecordEvent>,
) {
    tracing::info!(%player, "realtime subscriber connected");
    let (mut sender, mut receiver) = socket.split();

    let (out_tx, mut out_rx) = mpsc::channel::<Message>(simulator.config().ws_outbound_capacity());
    let writer = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(event) => {
                    if event.record.id != player {
                        continue;
                    }
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(err) => {
                            tracing::warn!(?err, "failed to encode record event");
                            continue;
                        }
                    };
                    if out_tx.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(%player, skipped, "realtime subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    drop(out_tx);
    let _ = writer.await;
    tracing::info!(%player, "realtime subscriber disconnected");
}
