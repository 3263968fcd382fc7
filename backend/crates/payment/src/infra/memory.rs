//! In-Memory Attempt Repository
//!
//! Process-local ledger of payment attempts. Contents are lost on restart;
//! the gateways remain the source of truth for settlement.

use crate::domain::entities::{AttemptStatus, PaymentAttempt, StatusChange};
use crate::domain::repository::PaymentAttemptRepository;
use crate::domain::value_objects::Gateway;
use crate::error::{PaymentError, PaymentResult};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

type AttemptKey = (Gateway, String);

#[derive(Clone, Default)]
pub struct InMemoryAttemptRepository {
    attempts: Arc<RwLock<HashMap<AttemptKey, PaymentAttempt>>>,
}

impl InMemoryAttemptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.attempts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.attempts.read().await.is_empty()
    }
}

fn key(gateway: Gateway, reference: &str) -> AttemptKey {
    (gateway, reference.to_string())
}

impl PaymentAttemptRepository for InMemoryAttemptRepository {
    async fn insert(&self, attempt: &PaymentAttempt) -> PaymentResult<()> {
        let mut attempts = self.attempts.write().await;
        match attempts.entry(key(attempt.gateway, &attempt.reference)) {
            Entry::Occupied(_) => Err(PaymentError::DuplicateReference),
            Entry::Vacant(slot) => {
                slot.insert(attempt.clone());
                Ok(())
            }
        }
    }

    async fn save(&self, attempt: &PaymentAttempt) -> PaymentResult<()> {
        self.attempts
            .write()
            .await
            .insert(key(attempt.gateway, &attempt.reference), attempt.clone());
        Ok(())
    }

    async fn find(
        &self,
        gateway: Gateway,
        reference: &str,
    ) -> PaymentResult<Option<PaymentAttempt>> {
        Ok(self
            .attempts
            .read()
            .await
            .get(&key(gateway, reference))
            .cloned())
    }

    async fn update_status(
        &self,
        gateway: Gateway,
        reference: &str,
        status: Option<AttemptStatus>,
        gateway_ref: Option<String>,
    ) -> PaymentResult<Option<StatusChange>> {
        let mut attempts = self.attempts.write().await;
        Ok(attempts
            .get_mut(&key(gateway, reference))
            .map(|attempt| attempt.apply_report(status, gateway_ref)))
    }
}
