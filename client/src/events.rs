use crate::{Error, Result};
use futures_util::{Stream as FutStream, StreamExt};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio_tungstenite::{tungstenite::Message, WebSocketStream};
use tracing::{debug, error, trace, warn};

const CHANNEL_CAPACITY: usize = 1024;

/// Stream of JSON events from a WebSocket connection.
///
/// Dropping the stream closes the connection.
pub struct Stream<T: DeserializeOwned + Send + 'static> {
    receiver: mpsc::Receiver<Result<T>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: DeserializeOwned + Send + 'static> Drop for Stream<T> {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

impl<T: DeserializeOwned + Send + 'static> Stream<T> {
    fn spawn_reader<S>(
        ws: WebSocketStream<S>,
        tx: mpsc::Sender<Result<T>>,
    ) -> tokio::task::JoinHandle<()>
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
    {
        tokio::spawn(async move {
            let mut ws = ws;
            let message_type = std::any::type_name::<T>();
            while let Some(msg) = ws.next().await {
                let decoded = match msg {
                    Ok(Message::Text(text)) => {
                        trace!(message_type, len = text.len(), "received websocket message");
                        serde_json::from_str::<T>(&text)
                    }
                    Ok(Message::Binary(data)) => {
                        trace!(message_type, len = data.len(), "received websocket message");
                        serde_json::from_slice::<T>(&data)
                    }
                    Ok(Message::Close(_)) => {
                        debug!("WebSocket closed");
                        let _ = tx.send(Err(Error::ConnectionClosed)).await;
                        break;
                    }
                    Ok(_) => continue, // Ignore ping/pong frames
                    Err(e) => {
                        error!("WebSocket error: {}", e);
                        let _ = tx.send(Err(e.into())).await;
                        break;
                    }
                };
                let item = decoded.map_err(|e| {
                    warn!(message_type, error = %e, "failed to decode websocket message");
                    Error::Json(e)
                });
                if tx.send(item).await.is_err() {
                    break; // Receiver dropped
                }
            }
        })
    }

    pub(crate) fn new<S>(ws: WebSocketStream<S>) -> Self
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = Self::spawn_reader(ws, tx);
        Self {
            receiver: rx,
            _handle: handle,
        }
    }

    /// Receive the next event from the stream
    pub async fn next(&mut self) -> Option<Result<T>> {
        self.receiver.recv().await
    }
}

impl<T: DeserializeOwned + Send + 'static> FutStream for Stream<T> {
    type Item = Result<T>;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
