use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::ws::Message;
use orderpulse_core::types::{DbId, Timestamp};
use orderpulse_events::{EventSink, OrderCreated, SubscriptionGroups};
use tokio::sync::{mpsc, RwLock};

use crate::ws::protocol::ServerMessage;

struct Client {
    outbound: mpsc::UnboundedSender<Message>,
    connected_at: Timestamp,
}

/// Live WebSocket clients and the customer groups they have joined.
///
/// Shared behind an `Arc`. Order jobs reach it through [`EventSink`], which
/// delivers only to the members of the order's customer group.
#[derive(Default)]
pub struct WsManager {
    clients: RwLock<HashMap<String, Client>>,
    groups: SubscriptionGroups,
}

impl WsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `conn_id` and return the stream of frames to write to it.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (outbound, rx) = mpsc::unbounded_channel();
        let client = Client {
            outbound,
            connected_at: chrono::Utc::now(),
        };
        self.clients.write().await.insert(conn_id, client);
        rx
    }

    /// Forget the connection and every group membership it held.
    pub async fn remove(&self, conn_id: &str) {
        let removed = self.clients.write().await.remove(conn_id);
        let groups = self.groups.leave_all(conn_id).await;
        if let Some(client) = removed {
            let open_for = chrono::Utc::now() - client.connected_at;
            tracing::debug!(
                conn_id,
                groups,
                open_secs = open_for.num_seconds(),
                "Client removed"
            );
        }
    }

    /// `false` if the connection is unknown or its channel is closed.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        self.clients
            .read()
            .await
            .get(conn_id)
            .is_some_and(|client| client.outbound.send(message).is_ok())
    }

    /// Join the customer's group. Idempotent.
    ///
    /// Returns `false`, and joins nothing, for an unregistered connection.
    pub async fn join_group(&self, customer_id: DbId, conn_id: &str) -> bool {
        if !self.clients.read().await.contains_key(conn_id) {
            return false;
        }
        if self.groups.join(customer_id, conn_id).await {
            tracing::debug!(conn_id, customer_id, "Joined customer group");
        }
        true
    }

    pub async fn leave_group(&self, customer_id: DbId, conn_id: &str) {
        if self.groups.leave(customer_id, conn_id).await {
            tracing::debug!(conn_id, customer_id, "Left customer group");
        }
    }

    pub async fn group_members(&self, customer_id: DbId) -> Vec<String> {
        self.groups.members(customer_id).await
    }

    /// Hand `message` to each member of the customer's group.
    ///
    /// A closed member is skipped without affecting the others. Returns how
    /// many members accepted the frame.
    pub async fn send_to_group(&self, customer_id: DbId, message: Message) -> usize {
        let members = self.groups.members(customer_id).await;
        if members.is_empty() {
            return 0;
        }

        let clients = self.clients.read().await;
        let mut delivered = 0;
        for (conn_id, client) in members
            .iter()
            .filter_map(|id| clients.get(id).map(|client| (id, client)))
        {
            if client.outbound.send(message.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!(%conn_id, customer_id, "Skipping closed group member");
            }
        }
        delivered
    }

    /// Heartbeat ping to every client.
    pub async fn ping_all(&self) {
        self.fan_out(|| Message::Ping(Bytes::new())).await;
    }

    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Send Close to every client, then forget all clients and groups.
    pub async fn shutdown_all(&self) {
        let closed = self.fan_out(|| Message::Close(None)).await;
        self.clients.write().await.clear();
        self.groups.clear().await;
        tracing::info!(closed, "WebSocket clients closed");
    }

    /// Send a fresh frame to every client; closed channels are skipped.
    async fn fan_out(&self, frame: impl Fn() -> Message) -> usize {
        self.clients
            .read()
            .await
            .values()
            .filter(|client| client.outbound.send(frame()).is_ok())
            .count()
    }
}

#[async_trait]
impl EventSink for WsManager {
    async fn publish(&self, customer_id: DbId, event: &OrderCreated) -> usize {
        let frame = ServerMessage::OrderCreated { data: event.clone() };
        let message = match frame.to_ws() {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(customer_id, error = %e, "Failed to encode order event");
                return 0;
            }
        };

        let delivered = self.send_to_group(customer_id, message).await;
        tracing::debug!(customer_id, order_id = event.id, delivered, "Published order event");
        delivered
    }
}
