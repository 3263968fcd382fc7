//! Get Attempt Use Case

use crate::domain::entities::PaymentAttempt;
use crate::domain::repository::PaymentAttemptRepository;
use crate::domain::value_objects::Gateway;
use crate::error::{PaymentError, PaymentResult};
use std::sync::Arc;

/// Look up a recorded payment attempt
pub struct GetAttemptUseCase<R>
where
    R: PaymentAttemptRepository,
{
    repo: Arc<R>,
}

impl<R> GetAttemptUseCase<R>
where
    R: PaymentAttemptRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, gateway: Gateway, reference: &str) -> PaymentResult<PaymentAttempt> {
        self.repo
            .find(gateway, reference.trim())
            .await?
            .ok_or(PaymentError::AttemptNotFound)
    }
}
