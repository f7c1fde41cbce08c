// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket endpoints: observer fan-out and the agent inbound channel.
//!
//! `/ws/ui` pushes every bus event as one JSON text frame. `/ws/agent`
//! receives tagged JSON messages and feeds them to the inbound router;
//! malformed frames are dropped without closing the connection.

use crate::app::App;
use crate::bus::BusSubscriber;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use fleet_core::Clock;
use futures_util::{SinkExt, StreamExt};
use tracing::debug;

pub async fn ui<C: Clock>(State(app): State<App<C>>, ws: WebSocketUpgrade) -> Response {
    let events = app.bus.subscribe();
    ws.on_upgrade(move |socket| observer_stream(socket, events))
}

async fn observer_stream(socket: WebSocket, mut events: BusSubscriber) {
    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let Ok(text) = serde_json::to_string(&event) else { continue };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => {
                match incoming {
                    // Observers only listen; anything else is ignored.
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }
    debug!("observer stream closed");
}

pub async fn agent<C: Clock>(State(app): State<App<C>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| agent_stream(socket, app))
}

async fn agent_stream<C: Clock>(mut socket: WebSocket, app: App<C>) {
    while let Some(frame) = socket.recv().await {
        match frame {
            Ok(Message::Text(text)) => app.router.handle_frame(text.as_str()).await,
            Ok(Message::Close(_)) | Err(_) => break,
            _ => {}
        }
    }
    debug!("agent stream closed");
}
