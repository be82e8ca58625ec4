//! The payment state machine.
//!
//! ```text
//!             register
//!                |
//!                v
//!   +------> REGISTERED --cancel--> CANCELED
//!   |            |
//! revert        pay
//!   |       /        \
//! FAILED <-rejected  accepted-> PAID
//! ```
//!
//! Every function borrows the whole [`PaymentSet`], checks all guards before
//! touching anything, and mutates at most one payment. A returned error means
//! the set is exactly as it was, with one exception: a rejected `pay` is a
//! successful transition to `FAILED` and is reported as [`PayOutcome::Failed`].

use crate::domain::payment::{Amount, Payment, PaymentId, PaymentMethod, PaymentState};
use crate::error::{PaymentError, Result};
use indexmap::IndexMap;
use std::fmt;

/// All payments known to the system, keyed by id, in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentSet {
    payments: IndexMap<PaymentId, Payment>,
}

impl PaymentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a payment. Repositories use this to rebuild a set;
    /// new payments should go through [`register`].
    pub fn insert(&mut self, payment: Payment) -> Option<Payment> {
        self.payments.insert(payment.id.clone(), payment)
    }

    pub fn get(&self, id: &PaymentId) -> Option<&Payment> {
        self.payments.get(id)
    }

    pub fn contains(&self, id: &PaymentId) -> bool {
        self.payments.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Payment> {
        self.payments.values()
    }

    /// Finds a `REGISTERED` credit card payment other than `id`.
    pub fn pending_credit_card_except(&self, id: &PaymentId) -> Option<&Payment> {
        self.iter()
            .find(|payment| payment.is_pending_credit_card() && &payment.id != id)
    }

    fn require(&self, id: &PaymentId) -> Result<&Payment> {
        self.get(id).ok_or_else(|| PaymentError::NotFound(id.clone()))
    }

    fn require_mut(&mut self, id: &PaymentId) -> Result<&mut Payment> {
        self.payments
            .get_mut(id)
            .ok_or_else(|| PaymentError::NotFound(id.clone()))
    }

    fn ensure_no_pending_credit_card(&self, id: &PaymentId) -> Result<()> {
        match self.pending_credit_card_except(id) {
            Some(conflicting) => Err(PaymentError::ExclusivityViolation {
                conflicting: conflicting.id.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl FromIterator<Payment> for PaymentSet {
    fn from_iter<I: IntoIterator<Item = Payment>>(iter: I) -> Self {
        let mut set = Self::new();
        for payment in iter {
            set.insert(payment);
        }
        set
    }
}

impl IntoIterator for PaymentSet {
    type Item = Payment;
    type IntoIter = indexmap::map::IntoValues<PaymentId, Payment>;

    fn into_iter(self) -> Self::IntoIter {
        self.payments.into_values()
    }
}

/// Caller-initiated transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Update,
    Pay,
    Revert,
    Cancel,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Register => "register",
            Self::Update => "update",
            Self::Pay => "pay",
            Self::Revert => "revert",
            Self::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

/// Result of a `pay` that passed its state guard.
#[derive(Debug, Clone, PartialEq)]
pub enum PayOutcome {
    Paid(Payment),
    Failed { payment: Payment, reason: String },
}

impl PayOutcome {
    pub fn payment(&self) -> &Payment {
        match self {
            Self::Paid(payment) | Self::Failed { payment, .. } => payment,
        }
    }
}

fn expect_state(payment: &Payment, operation: Operation, expected: PaymentState) -> Result<()> {
    if payment.state == expected {
        Ok(())
    } else {
        Err(PaymentError::IllegalTransition {
            id: payment.id.clone(),
            operation,
            state: payment.state,
        })
    }
}

/// Creates a new `REGISTERED` payment.
pub fn register(
    set: &mut PaymentSet,
    id: PaymentId,
    amount: Amount,
    method: PaymentMethod,
) -> Result<Payment> {
    if set.contains(&id) {
        return Err(PaymentError::AlreadyExists(id));
    }
    if method == PaymentMethod::CreditCard {
        set.ensure_no_pending_credit_card(&id)?;
    }

    let payment = Payment::new(id, amount, method);
    set.insert(payment.clone());
    Ok(payment)
}

/// Changes amount and/or method of a `REGISTERED` payment.
pub fn update(
    set: &mut PaymentSet,
    id: &PaymentId,
    amount: Option<Amount>,
    method: Option<PaymentMethod>,
) -> Result<Payment> {
    let current = set.require(id)?;
    expect_state(current, Operation::Update, PaymentState::Registered)?;

    let new_method = method.unwrap_or(current.payment_method);
    if new_method == PaymentMethod::CreditCard {
        set.ensure_no_pending_credit_card(id)?;
    }

    let payment = set.require_mut(id)?;
    if let Some(amount) = amount {
        payment.amount = amount;
    }
    payment.payment_method = new_method;
    payment.failure_reason = None;
    Ok(payment.clone())
}

/// Runs the method's validation strategy and moves the payment to `PAID` or
/// `FAILED`.
pub fn pay(set: &mut PaymentSet, id: &PaymentId) -> Result<PayOutcome> {
    let current = set.require(id)?;
    expect_state(current, Operation::Pay, PaymentState::Registered)?;

    let verdict = current
        .payment_method
        .strategy()
        .validate(id, current.amount, set);

    let payment = set.require_mut(id)?;
    match verdict {
        Ok(()) => {
            payment.state = PaymentState::Paid;
            payment.failure_reason = None;
            Ok(PayOutcome::Paid(payment.clone()))
        }
        Err(rejection) => {
            payment.state = PaymentState::Failed;
            payment.failure_reason = Some(rejection.reason.clone());
            Ok(PayOutcome::Failed {
                payment: payment.clone(),
                reason: rejection.reason,
            })
        }
    }
}

/// Returns a `FAILED` payment to `REGISTERED`, clearing its failure reason.
///
/// A reverted credit card payment becomes pending again, so it is subject to
/// the same exclusivity rule as register and update.
pub fn revert(set: &mut PaymentSet, id: &PaymentId) -> Result<Payment> {
    let current = set.require(id)?;
    expect_state(current, Operation::Revert, PaymentState::Failed)?;
    if current.payment_method == PaymentMethod::CreditCard {
        set.ensure_no_pending_credit_card(id)?;
    }

    let payment = set.require_mut(id)?;
    payment.state = PaymentState::Registered;
    payment.failure_reason = None;
    Ok(payment.clone())
}

/// Moves a `REGISTERED` payment to the terminal `CANCELED` state.
pub fn cancel(set: &mut PaymentSet, id: &PaymentId) -> Result<Payment> {
    let current = set.require(id)?;
    expect_state(current, Operation::Cancel, PaymentState::Registered)?;

    let payment = set.require_mut(id)?;
    payment.state = PaymentState::Canceled;
    payment.failure_reason = None;
    Ok(payment.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::{REASON_CREDIT_CARD_LIMIT, REASON_CREDIT_CARD_PENDING};
    use rust_decimal_macros::dec;

    fn id(s: &str) -> PaymentId {
        PaymentId::from(s)
    }

    fn amt(value: rust_decimal::Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    fn registered(set: &mut PaymentSet, key: &str, value: rust_decimal::Decimal, method: PaymentMethod) {
        register(set, id(key), amt(value), method).unwrap();
    }

    #[test]
    fn test_register_rejects_duplicate_id() {
        let mut set = PaymentSet::new();
        registered(&mut set, "p1", dec!(10), PaymentMethod::Paypal);

        let result = register(&mut set, id("p1"), amt(dec!(20)), PaymentMethod::Paypal);
        assert!(matches!(result, Err(PaymentError::AlreadyExists(_))));
        assert_eq!(set.get(&id("p1")).unwrap().amount(), amt(dec!(10)));
    }

    #[test]
    fn test_register_enforces_credit_card_exclusivity() {
        let mut set = PaymentSet::new();
        registered(&mut set, "cc-1", dec!(100), PaymentMethod::CreditCard);

        let result = register(&mut set, id("cc-2"), amt(dec!(50)), PaymentMethod::CreditCard);
        assert!(matches!(
            result,
            Err(PaymentError::ExclusivityViolation { conflicting }) if conflicting == id("cc-1")
        ));
        assert_eq!(set.len(), 1);

        // PayPal payments are not affected by a pending credit card.
        registered(&mut set, "pp-1", dec!(50), PaymentMethod::Paypal);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_update_changes_fields_only_while_registered() {
        let mut set = PaymentSet::new();
        registered(&mut set, "p1", dec!(4000), PaymentMethod::Paypal);

        let updated = update(&mut set, &id("p1"), Some(amt(dec!(4999))), None).unwrap();
        assert_eq!(updated.amount(), amt(dec!(4999)));
        assert_eq!(updated.payment_method(), PaymentMethod::Paypal);

        pay(&mut set, &id("p1")).unwrap();
        let result = update(&mut set, &id("p1"), Some(amt(dec!(100))), None);
        assert!(matches!(
            result,
            Err(PaymentError::IllegalTransition {
                operation: Operation::Update,
                state: PaymentState::Paid,
                ..
            })
        ));
        assert_eq!(set.get(&id("p1")).unwrap().amount(), amt(dec!(4999)));
    }

    #[test]
    fn test_update_to_credit_card_checks_exclusivity_without_partial_write() {
        let mut set = PaymentSet::new();
        registered(&mut set, "cc-1", dec!(100), PaymentMethod::CreditCard);
        registered(&mut set, "pp-1", dec!(100), PaymentMethod::Paypal);

        let result = update(
            &mut set,
            &id("pp-1"),
            Some(amt(dec!(300))),
            Some(PaymentMethod::CreditCard),
        );
        assert!(matches!(result, Err(PaymentError::ExclusivityViolation { .. })));

        let untouched = set.get(&id("pp-1")).unwrap();
        assert_eq!(untouched.amount(), amt(dec!(100)));
        assert_eq!(untouched.payment_method(), PaymentMethod::Paypal);
    }

    #[test]
    fn test_update_credit_card_against_itself_is_allowed() {
        let mut set = PaymentSet::new();
        registered(&mut set, "cc-1", dec!(100), PaymentMethod::CreditCard);

        let updated = update(&mut set, &id("cc-1"), Some(amt(dec!(200))), Some(PaymentMethod::CreditCard)).unwrap();
        assert_eq!(updated.amount(), amt(dec!(200)));
    }

    #[test]
    fn test_pay_success_and_failure() {
        let mut set = PaymentSet::new();
        registered(&mut set, "cc-1", dec!(9999), PaymentMethod::CreditCard);

        let outcome = pay(&mut set, &id("cc-1")).unwrap();
        assert!(matches!(outcome, PayOutcome::Paid(ref p) if p.state() == PaymentState::Paid));

        registered(&mut set, "cc-2", dec!(10500), PaymentMethod::CreditCard);
        let outcome = pay(&mut set, &id("cc-2")).unwrap();
        match outcome {
            PayOutcome::Failed { payment, reason } => {
                assert_eq!(reason, REASON_CREDIT_CARD_LIMIT);
                assert_eq!(payment.state(), PaymentState::Failed);
                assert_eq!(payment.failure_reason(), Some(REASON_CREDIT_CARD_LIMIT));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(set.get(&id("cc-2")).unwrap().state(), PaymentState::Failed);
    }

    #[test]
    fn test_pay_rechecks_pending_credit_cards() {
        // A set loaded from an older store may already violate exclusivity.
        let mut set: PaymentSet = [
            Payment::try_new("cc-1", dec!(10), "credit_card").unwrap(),
            Payment::try_new("cc-2", dec!(10), "credit_card").unwrap(),
        ]
        .into_iter()
        .collect();

        let outcome = pay(&mut set, &id("cc-1")).unwrap();
        assert!(matches!(
            outcome,
            PayOutcome::Failed { ref reason, .. } if reason == REASON_CREDIT_CARD_PENDING
        ));
    }

    #[test]
    fn test_revert_only_from_failed() {
        let mut set = PaymentSet::new();
        registered(&mut set, "pp-1", dec!(6000), PaymentMethod::Paypal);

        let result = revert(&mut set, &id("pp-1"));
        assert!(matches!(
            result,
            Err(PaymentError::IllegalTransition { state: PaymentState::Registered, .. })
        ));

        pay(&mut set, &id("pp-1")).unwrap();
        let reverted = revert(&mut set, &id("pp-1")).unwrap();
        assert_eq!(reverted.state(), PaymentState::Registered);
        assert!(reverted.failure_reason().is_none());
    }

    #[test]
    fn test_revert_credit_card_respects_exclusivity() {
        let mut set = PaymentSet::new();
        registered(&mut set, "cc-1", dec!(20000), PaymentMethod::CreditCard);
        pay(&mut set, &id("cc-1")).unwrap();
        registered(&mut set, "cc-2", dec!(10), PaymentMethod::CreditCard);

        let result = revert(&mut set, &id("cc-1"));
        assert!(matches!(result, Err(PaymentError::ExclusivityViolation { .. })));
        assert_eq!(set.get(&id("cc-1")).unwrap().state(), PaymentState::Failed);
    }

    #[test]
    fn test_cancel_is_terminal() {
        let mut set = PaymentSet::new();
        registered(&mut set, "p1", dec!(10), PaymentMethod::Paypal);

        let canceled = cancel(&mut set, &id("p1")).unwrap();
        assert_eq!(canceled.state(), PaymentState::Canceled);

        assert!(matches!(cancel(&mut set, &id("p1")), Err(PaymentError::IllegalTransition { .. })));
        assert!(matches!(pay(&mut set, &id("p1")), Err(PaymentError::IllegalTransition { .. })));
        assert!(matches!(revert(&mut set, &id("p1")), Err(PaymentError::IllegalTransition { .. })));
        assert!(matches!(
            update(&mut set, &id("p1"), Some(amt(dec!(5))), None),
            Err(PaymentError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let mut set = PaymentSet::new();
        assert!(matches!(pay(&mut set, &id("nope")), Err(PaymentError::NotFound(_))));
        assert!(matches!(cancel(&mut set, &id("nope")), Err(PaymentError::NotFound(_))));
    }

    #[test]
    fn test_set_preserves_registration_order() {
        let mut set = PaymentSet::new();
        for key in ["b", "a", "c"] {
            registered(&mut set, key, dec!(1), PaymentMethod::Paypal);
        }
        let ids: Vec<&str> = set.iter().map(|p| p.id().as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}
