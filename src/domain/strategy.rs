//! Per-method business rules applied when a payment is paid.
//!
//! Each [`PaymentMethod`] maps to exactly one [`ValidationStrategy`]. Supporting
//! another method means adding a variant, a strategy, and an arm in
//! [`PaymentMethod::strategy`]; the transition functions stay untouched.

use crate::domain::payment::{Amount, PaymentId, PaymentMethod};
use crate::domain::transition::PaymentSet;
use rust_decimal::Decimal;
use std::fmt;

/// Credit card payments must stay strictly below this amount.
pub const CREDIT_CARD_LIMIT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
/// PayPal payments must stay strictly below this amount.
pub const PAYPAL_LIMIT: Decimal = Decimal::from_parts(5_000, 0, 0, false, 0);

pub const REASON_CREDIT_CARD_LIMIT: &str = "amount exceeds credit card limit";
pub const REASON_CREDIT_CARD_PENDING: &str = "another credit card payment is already registered";
pub const REASON_PAYPAL_LIMIT: &str = "amount exceeds PayPal limit";

/// Why a strategy refused a payment. The reason ends up in the payment's
/// `failure_reason`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: String,
}

impl Rejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// A business rule for one payment method.
///
/// Implementations only read `peers`; they never mutate the set.
pub trait ValidationStrategy: Send + Sync {
    fn validate(&self, id: &PaymentId, amount: Amount, peers: &PaymentSet) -> Result<(), Rejection>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CreditCardStrategy;

impl ValidationStrategy for CreditCardStrategy {
    fn validate(&self, id: &PaymentId, amount: Amount, peers: &PaymentSet) -> Result<(), Rejection> {
        if amount.value() >= CREDIT_CARD_LIMIT {
            return Err(Rejection::new(REASON_CREDIT_CARD_LIMIT));
        }
        if peers.pending_credit_card_except(id).is_some() {
            return Err(Rejection::new(REASON_CREDIT_CARD_PENDING));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PaypalStrategy;

impl ValidationStrategy for PaypalStrategy {
    fn validate(&self, _id: &PaymentId, amount: Amount, _peers: &PaymentSet) -> Result<(), Rejection> {
        if amount.value() >= PAYPAL_LIMIT {
            return Err(Rejection::new(REASON_PAYPAL_LIMIT));
        }
        Ok(())
    }
}

static CREDIT_CARD: CreditCardStrategy = CreditCardStrategy;
static PAYPAL: PaypalStrategy = PaypalStrategy;

impl PaymentMethod {
    /// Resolves the validation strategy registered for this method.
    pub fn strategy(&self) -> &'static dyn ValidationStrategy {
        match self {
            Self::CreditCard => &CREDIT_CARD,
            Self::Paypal => &PAYPAL,
        }
    }
}
