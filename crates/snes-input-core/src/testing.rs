//! Loopback Usb2Snes bridge for tests.

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::future::Future;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// Server side of one test connection.
pub struct MockBridge {
    ws: WebSocketStream<TcpStream>,
}

impl MockBridge {
    /// Waits for the next request. Returns `None` once the client closes.
    pub async fn request(&mut self) -> Option<Value> {
        while let Some(message) = self.ws.next().await {
            match message.ok()? {
                Message::Text(text) => {
                    return Some(serde_json::from_str(&text).expect("request is not JSON"))
                }
                Message::Close(_) => return None,
                _ => continue,
            }
        }
        None
    }

    /// Sends a `{"Results": [...]}` reply.
    pub async fn reply_results(&mut self, results: &[&str]) {
        let body = json!({ "Results": results }).to_string();
        self.ws
            .send(Message::text(body))
            .await
            .expect("failed to send reply");
    }

    /// Sends a binary frame.
    pub async fn reply_binary(&mut self, data: &[u8]) {
        self.ws
            .send(Message::binary(data.to_vec()))
            .await
            .expect("failed to send reply");
    }

    /// Closes the connection from the bridge side.
    pub async fn close(&mut self) {
        let _ = self.ws.close(None).await;
    }
}

/// Accepts a single WebSocket connection on an ephemeral port and hands it to
/// `handler`. Returns the `ws://` URL and the server task.
pub async fn serve<F, Fut>(handler: F) -> std::io::Result<(String, JoinHandle<()>)>
where
    F: FnOnce(MockBridge) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("ws://{}", listener.local_addr()?);

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept failed");
        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("WebSocket handshake failed");
        handler(MockBridge { ws }).await;
    });

    Ok((url, handle))
}
