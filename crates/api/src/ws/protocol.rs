//! JSON frames exchanged over `/api/v1/ws`.
//!
//! Every frame is an object with a `type` discriminator:
//!
//! ```text
//! client -> server   {"type":"join_group","customerId":7}
//!                    {"type":"leave_group","customerId":7}
//! server -> client   {"type":"joined_group","customerId":7}
//!                    {"type":"left_group","customerId":7}
//!                    {"type":"order_created","data":{...}}
//!                    {"type":"error","message":"..."}
//! ```

use axum::extract::ws::Message;
use orderpulse_core::types::DbId;
use orderpulse_events::OrderCreated;
use serde::{Deserialize, Serialize};

/// Inbound frame. Group operations always apply to the sending connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinGroup {
        #[serde(rename = "customerId")]
        customer_id: DbId,
    },
    LeaveGroup {
        #[serde(rename = "customerId")]
        customer_id: DbId,
    },
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Outbound frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    OrderCreated {
        data: OrderCreated,
    },
    JoinedGroup {
        #[serde(rename = "customerId")]
        customer_id: DbId,
    },
    LeftGroup {
        #[serde(rename = "customerId")]
        customer_id: DbId,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    /// Encode as a WebSocket text frame.
    pub fn to_ws(&self) -> Result<Message, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(Message::Text(json.into()))
    }
}
