//! Per-customer subscription membership.
//!
//! A connection may belong to any number of groups. Membership is unrelated
//! to whether a job is running for the customer: joining a group with no job
//! simply never receives anything.

use std::collections::{HashMap, HashSet};

use orderpulse_core::types::DbId;
use tokio::sync::RwLock;

/// Maps each customer id to the set of connection ids subscribed to it.
///
/// Thread-safe via interior `RwLock`; share it behind an `Arc` or embed it
/// in a connection manager.
#[derive(Default)]
pub struct SubscriptionGroups {
    groups: RwLock<HashMap<DbId, HashSet<String>>>,
}

impl SubscriptionGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `conn_id` to the group. Joining twice is the same as joining once.
    ///
    /// Returns `true` if the connection was not already a member.
    pub async fn join(&self, customer_id: DbId, conn_id: &str) -> bool {
        self.groups
            .write()
            .await
            .entry(customer_id)
            .or_default()
            .insert(conn_id.to_string())
    }

    /// Remove `conn_id` from the group. No-op if it is not a member.
    ///
    /// Returns `true` if the connection was a member.
    pub async fn leave(&self, customer_id: DbId, conn_id: &str) -> bool {
        let mut groups = self.groups.write().await;
        let Some(members) = groups.get_mut(&customer_id) else {
            return false;
        };
        let removed = members.remove(conn_id);
        if members.is_empty() {
            groups.remove(&customer_id);
        }
        removed
    }

    /// Remove `conn_id` from every group it belongs to.
    ///
    /// Returns the number of groups it was removed from.
    pub async fn leave_all(&self, conn_id: &str) -> usize {
        let mut groups = self.groups.write().await;
        let mut removed = 0;
        groups.retain(|_, members| {
            if members.remove(conn_id) {
                removed += 1;
            }
            !members.is_empty()
        });
        removed
    }

    /// Snapshot of the connections currently in the group.
    pub async fn members(&self, customer_id: DbId) -> Vec<String> {
        self.groups
            .read()
            .await
            .get(&customer_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether `conn_id` is currently in the group.
    pub async fn is_member(&self, customer_id: DbId, conn_id: &str) -> bool {
        self.groups
            .read()
            .await
            .get(&customer_id)
            .is_some_and(|members| members.contains(conn_id))
    }

    /// Number of non-empty groups.
    pub async fn group_count(&self) -> usize {
        self.groups.read().await.len()
    }

    /// Drop every membership.
    pub async fn clear(&self) {
        self.groups.write().await.clear();
    }
}
