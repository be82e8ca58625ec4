use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Externally supplied identifier of a payment. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaymentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PaymentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Represents a positive monetary amount in the single implied currency.
///
/// Deserialization goes through [`Amount::new`], so a stored zero or negative
/// amount is rejected on read as well as on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::InvalidAmount(format!(
                "amount must be positive, got {value}"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl FromStr for Amount {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| PaymentError::InvalidAmount(format!("'{s}': {e}")))?;
        Self::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// Supported payment methods.
///
/// Parsing is case-insensitive and the canonical form is always lower case,
/// so `"Credit_Card"` and `"credit_card"` name the same method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 2] = [PaymentMethod::CreditCard, PaymentMethod::Paypal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::Paypal => "paypal",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == normalized)
            .ok_or_else(|| PaymentError::InvalidMethod(s.to_string()))
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = PaymentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentState {
    Registered,
    Paid,
    Failed,
    Canceled,
}

impl PaymentState {
    /// `PAID` and `CANCELED` accept no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Canceled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "REGISTERED",
            Self::Paid => "PAID",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single payment and its current lifecycle state.
///
/// Fields are only mutated by the transition functions in
/// [`crate::domain::transition`], which own the rules about when each one may
/// change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub(crate) id: PaymentId,
    pub(crate) amount: Amount,
    pub(crate) payment_method: PaymentMethod,
    pub(crate) state: PaymentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) failure_reason: Option<String>,
}

impl Payment {
    /// Creates a freshly registered payment.
    pub fn new(id: PaymentId, amount: Amount, payment_method: PaymentMethod) -> Self {
        Self {
            id,
            amount,
            payment_method,
            state: PaymentState::Registered,
            failure_reason: None,
        }
    }

    /// Builds a registered payment from raw input. The method is checked
    /// first, so an unknown method is reported even when the amount is also bad.
    pub fn try_new(id: impl Into<PaymentId>, amount: Decimal, method: &str) -> Result<Self, PaymentError> {
        let payment_method = method.parse()?;
        let amount = Amount::new(amount)?;
        Ok(Self::new(id.into(), amount, payment_method))
    }

    /// Rebuilds a payment exactly as a repository stored it.
    pub fn restore(
        id: PaymentId,
        amount: Amount,
        payment_method: PaymentMethod,
        state: PaymentState,
        failure_reason: Option<String>,
    ) -> Self {
        Self {
            id,
            amount,
            payment_method,
            state,
            failure_reason,
        }
    }

    pub fn id(&self) -> &PaymentId {
        &self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn state(&self) -> PaymentState {
        self.state
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// True for a credit card payment still waiting in `REGISTERED`.
    pub fn is_pending_credit_card(&self) -> bool {
        self.payment_method == PaymentMethod::CreditCard && self.state == PaymentState::Registered
    }
}
