//! WebSocket tunneling between a browser and an upstream service.
//!
//! The client leg is an axum socket, the upstream leg a tungstenite one;
//! frames are converted between the two and relayed without
//! reinterpretation.

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::CloseFrame as UpstreamCloseFrame;
use tokio_tungstenite::tungstenite::Message as UpstreamMessage;
use tracing::{debug, warn};

use crate::proxy::target;
use crate::AppState;

/// Run a tunnel on an already-accepted client socket.
///
/// The handshake is accepted before the service is resolved, so a bad name
/// surfaces as a policy-violation close rather than a refused upgrade.
pub async fn tunnel(mut socket: WebSocket, state: Arc<AppState>, service: String, subpath: String) {
    let descriptor = match state.registry.lookup(&service).await {
        Ok(Some(s)) if s.enabled => s,
        Ok(_) => {
            debug!(service = %service, "WebSocket to unknown or disabled service");
            close_with(&mut socket, close_code::POLICY, "service not found or disabled").await;
            return;
        }
        Err(e) => {
            warn!(service = %service, error = %e, "Registry lookup failed for WebSocket");
            close_with(&mut socket, close_code::ERROR, "registry lookup failed").await;
            return;
        }
    };

    let url = target::ws_target(&descriptor.base_url, &subpath);
    debug!(service = %service, url = %url, "Opening upstream WebSocket");

    let upstream = match connect_async(url.as_str()).await {
        Ok((ws, _response)) => ws,
        Err(e) => {
            warn!(service = %service, url = %url, error = %e, "Upstream WebSocket connect failed");
            close_with(&mut socket, close_code::ERROR, "upstream unreachable").await;
            return;
        }
    };

    let (mut upstream_tx, mut upstream_rx) = upstream.split();
    let (mut client_tx, mut client_rx) = socket.split();

    let client_to_upstream = async {
        while let Some(msg) = client_rx.next().await {
            let msg = match msg {
                Ok(m) => m,
                // Abrupt client disconnects are routine, not relay faults
                Err(_) => return Ok(()),
            };
            if let Message::Close(_) = msg {
                return Ok(());
            }
            if let Err(e) = upstream_tx.send(to_upstream(msg)).await {
                return Err(anyhow::Error::from(e));
            }
        }
        Ok(())
    };

    let upstream_to_client = async {
        while let Some(msg) = upstream_rx.next().await {
            let msg = match msg {
                Ok(m) => m,
                Err(e) => return Err(anyhow::Error::from(e)),
            };
            let Some(forward) = to_client(msg) else { continue };
            let ends_tunnel = matches!(forward, Message::Close(_));
            if client_tx.send(forward).await.is_err() || ends_tunnel {
                return Ok(());
            }
        }
        Ok(())
    };

    // Either direction ending tears the whole tunnel down; the unfinished
    // relay is dropped by the select.
    let result: anyhow::Result<()> = tokio::select! {
        r = client_to_upstream => r,
        r = upstream_to_client => r,
    };

    match result {
        Ok(()) => {
            let _ = client_tx.send(Message::Close(None)).await;
        }
        Err(e) => {
            warn!(service = %service, error = %e, "WebSocket relay failed");
            let _ = client_tx
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::ERROR,
                    reason: "relay failed".into(),
                })))
                .await;
        }
    }
    let _ = upstream_tx.send(UpstreamMessage::Close(None)).await;

    debug!(service = %service, "WebSocket tunnel closed");
}

async fn close_with(socket: &mut WebSocket, code: u16, reason: &'static str) {
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await;
}

fn to_upstream(msg: Message) -> UpstreamMessage {
    match msg {
        Message::Text(text) => UpstreamMessage::Text(text.into()),
        Message::Binary(data) => UpstreamMessage::Binary(data.into()),
        Message::Ping(data) => UpstreamMessage::Ping(data.into()),
        Message::Pong(data) => UpstreamMessage::Pong(data.into()),
        Message::Close(frame) => UpstreamMessage::Close(frame.map(|f| UpstreamCloseFrame {
            code: f.code.into(),
            reason: f.reason.into_owned().into(),
        })),
    }
}

fn to_client(msg: UpstreamMessage) -> Option<Message> {
    match msg {
        UpstreamMessage::Text(text) => Some(Message::Text(text.as_str().to_owned())),
        UpstreamMessage::Binary(data) => Some(Message::Binary(data.to_vec())),
        UpstreamMessage::Ping(data) => Some(Message::Ping(data.to_vec())),
        UpstreamMessage::Pong(data) => Some(Message::Pong(data.to_vec())),
        UpstreamMessage::Close(frame) => Some(Message::Close(frame.map(|f| CloseFrame {
            code: f.code.into(),
            reason: f.reason.as_str().to_owned().into(),
        }))),
        // Raw frames never surface from a message-level read; nothing to relay
        UpstreamMessage::Frame(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_frames_convert_both_ways() {
        let up = to_upstream(Message::Binary(vec![1, 2, 3]));
        assert!(matches!(&up, UpstreamMessage::Binary(b) if b.as_ref() == [1, 2, 3]));

        let back = to_client(up).unwrap();
        assert!(matches!(back, Message::Binary(b) if b == vec![1, 2, 3]));
    }

    #[test]
    fn test_text_frames_convert_both_ways() {
        let up = to_upstream(Message::Text("hello".to_string()));
        assert!(matches!(&up, UpstreamMessage::Text(t) if t.as_str() == "hello"));

        let back = to_client(up).unwrap();
        assert!(matches!(back, Message::Text(t) if t == "hello"));
    }

    #[test]
    fn test_close_frame_keeps_code_and_reason() {
        let up = to_upstream(Message::Close(Some(CloseFrame {
            code: close_code::AWAY,
            reason: "bye".into(),
        })));
        let back = to_client(up).unwrap();
        match back {
            Message::Close(Some(frame)) => {
                assert_eq!(frame.code, close_code::AWAY);
                assert_eq!(frame.reason, "bye");
            }
            other => panic!("expected close frame, got {other:?}"),
        }
    }
}
