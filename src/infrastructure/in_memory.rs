use crate::domain::ports::PaymentRepository;
use crate::domain::transition::PaymentSet;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory payment repository.
///
/// Uses `Arc<RwLock<PaymentSet>>` so clones share the same records.
/// Ideal for testing or ephemeral runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<PaymentSet>>,
}

impl InMemoryPaymentRepository {
    /// Creates a new, empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with `payments`.
    pub fn with_payments(payments: PaymentSet) -> Self {
        Self {
            payments: Arc::new(RwLock::new(payments)),
        }
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn load_all(&self) -> Result<PaymentSet> {
        let payments = self.payments.read().await;
        Ok(payments.clone())
    }

    async fn save_all(&self, payments: &PaymentSet) -> Result<()> {
        let mut stored = self.payments.write().await;
        *stored = payments.clone();
        Ok(())
    }
}
