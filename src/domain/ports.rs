use super::transition::PaymentSet;
use crate::error::Result;
use async_trait::async_trait;

/// Loads and saves the whole payment set.
///
/// The service performs one `load_all` / `save_all` pair per request. An
/// implementation must make `save_all` all-or-nothing: a failed write may not
/// leave a mix of old and new records behind.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn load_all(&self) -> Result<PaymentSet>;
    async fn save_all(&self, payments: &PaymentSet) -> Result<()>;
}

pub type PaymentRepositoryBox = Box<dyn PaymentRepository>;
pub type PaymentRepositoryFactory = Box<dyn Fn() -> PaymentRepositoryBox + Send + Sync>;
