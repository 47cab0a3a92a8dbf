//! Entitlement gate: decides whether a user's turn may proceed.
//!
//! The gate only reads. Charging the quota happens in the usage recorder,
//! after the turn was dispatched successfully, so a failed collaborator call
//! never costs the user a free request. A store error here is surfaced to
//! the caller (fail-closed) rather than being mapped to allow or deny.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{domain::UserId, ports::UserStore, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entitlement {
    Allowed,
    Denied(DenyReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    QuotaExceeded,
}

pub struct EntitlementGate {
    store: Arc<dyn UserStore>,
    owner: UserId,
    quota: u32,
}

impl EntitlementGate {
    pub fn new(store: Arc<dyn UserStore>, owner: UserId, quota: u32) -> Self {
        Self {
            store,
            owner,
            quota,
        }
    }

    pub fn is_owner(&self, user_id: UserId) -> bool {
        user_id == self.owner
    }

    /// Policy, in order: owner bypass, active-subscription bypass, daily
    /// quota. The owner path touches no state at all.
    pub async fn check(&self, user_id: UserId, now: DateTime<Utc>) -> Result<Entitlement> {
        if self.is_owner(user_id) {
            return Ok(Entitlement::Allowed);
        }

        if let Some(sub) = self.store.get_active_subscription(user_id).await? {
            if sub.covers(now) {
                return Ok(Entitlement::Allowed);
            }
        }

        let used = self.store.get_requests_today(user_id).await?;
        if used < self.quota {
            Ok(Entitlement::Allowed)
        } else {
            Ok(Entitlement::Denied(DenyReason::QuotaExceeded))
        }
    }
}
