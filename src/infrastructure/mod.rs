//! Repository implementations.
//!
//! All stores share the [`StoredPayment`] record layout: the payment id is the
//! key, everything else is the value.

pub mod in_memory;
pub mod json_file;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

use crate::domain::payment::{Amount, Payment, PaymentId, PaymentMethod, PaymentState};
use serde::{Deserialize, Serialize};

/// On-disk representation of a payment, without its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPayment {
    pub amount: Amount,
    pub payment_method: PaymentMethod,
    pub state: PaymentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl StoredPayment {
    pub fn into_payment(self, id: PaymentId) -> Payment {
        Payment::restore(
            id,
            self.amount,
            self.payment_method,
            self.state,
            self.failure_reason,
        )
    }
}

impl From<&Payment> for StoredPayment {
    fn from(payment: &Payment) -> Self {
        Self {
            amount: payment.amount(),
            payment_method: payment.payment_method(),
            state: payment.state(),
            failure_reason: payment.failure_reason().map(str::to_string),
        }
    }
}
