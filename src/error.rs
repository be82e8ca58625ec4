use crate::domain::payment::{PaymentId, PaymentState};
use crate::domain::transition::Operation;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Payment '{0}' not found")]
    NotFound(PaymentId),
    #[error("Payment '{0}' already exists")]
    AlreadyExists(PaymentId),
    #[error("Unsupported payment method '{0}'")]
    InvalidMethod(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Cannot {operation} payment '{id}' in state {state}")]
    IllegalTransition {
        id: PaymentId,
        operation: Operation,
        state: PaymentState,
    },
    #[error("Another credit card payment is already registered ('{conflicting}')")]
    ExclusivityViolation { conflicting: PaymentId },
    #[error("Payment '{id}' rejected: {reason}")]
    ValidationRejected { id: PaymentId, reason: String },
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PaymentError {
    /// Business rejections are reported to the caller; everything else is a
    /// failure of the surrounding system.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::StorageUnavailable(_) | Self::Csv(_))
    }
}

impl From<std::io::Error> for PaymentError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageUnavailable(Box::new(err))
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        Self::StorageUnavailable(Box::new(err))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for PaymentError {
    fn from(err: rocksdb::Error) -> Self {
        Self::StorageUnavailable(Box::new(err))
    }
}
