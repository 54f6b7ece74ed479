//! WebSocket event feed
//!
//! Dashboards connect here to receive every monitor event live:
//! - per-bridge readings (`data-<id>`) and alerts (`alert-<id>`)
//! - calibration start and completion
//! - connectivity changes (`bridges-status`)

use std::net::SocketAddr;
use std::sync::Arc;

use bridgewatch_fleet::BroadcastSink;
use bridgewatch_signal::MonitorEvent;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// WebSocket message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeedMessage {
    /// Connection acknowledgment
    #[serde(rename = "ack")]
    Ack {
        /// Human-readable status message
        message: String,
    },

    /// One monitor event
    #[serde(rename = "event")]
    Event {
        /// Channel the dashboard subscribes to
        channel: String,
        /// Channel-specific body
        payload: Value,
    },
}

impl FeedMessage {
    fn from_event(event: &MonitorEvent) -> serde_json::Result<Self> {
        Ok(FeedMessage::Event {
            channel: event.channel(),
            payload: event.payload()?,
        })
    }
}

/// WebSocket server state
pub struct FeedServer {
    /// Source of monitor events
    events: BroadcastSink,
}

impl FeedServer {
    /// Create new feed server
    pub fn new(events: BroadcastSink) -> Self {
        Self { events }
    }

    /// Bind `addr` and serve until the listener fails
    pub async fn run(self: Arc<Self>, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("Event feed listening on {}", listener.local_addr()?);
        self.serve(listener).await;
        Ok(())
    }

    /// Accept connections from an already bound listener
    pub async fn serve(self: Arc<Self>, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    info!("New feed connection from {}", peer_addr);
                    let server = Arc::clone(&self);

                    tokio::spawn(async move {
                        if let Err(e) = server.handle_connection(stream, peer_addr).await {
                            error!("Feed connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    /// Handle individual WebSocket connection
    async fn handle_connection(&self, stream: TcpStream, peer_addr: SocketAddr) -> anyhow::Result<()> {
        let ws_stream = accept_async(stream).await?;
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        // Subscribe before the ack so nothing published after it is missed
        let mut events_rx = self.events.subscribe();

        let ack = FeedMessage::Ack {
            message: "Connected to bridgewatch event feed".to_string(),
        };
        ws_sender
            .send(Message::Text(serde_json::to_string(&ack)?))
            .await?;

        loop {
            tokio::select! {
                msg = ws_receiver.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            debug!("Received from {}: {}", peer_addr, text);
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Client {} disconnected", peer_addr);
                            break;
                        }
                        Some(Err(e)) => {
                            warn!("Error receiving from {}: {}", peer_addr, e);
                            break;
                        }
                        Some(Ok(_)) => {}
                    }
                }

                event = events_rx.recv() => {
                    match event {
                        Ok(event) => {
                            let json = serde_json::to_string(&FeedMessage::from_event(&event)?)?;
                            if let Err(e) = ws_sender.send(Message::Text(json)).await {
                                warn!("Error sending to {}: {}", peer_addr, e);
                                break;
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, peer = %peer_addr, "Feed client lagged, events dropped");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        }

        Ok(())
    }
}
