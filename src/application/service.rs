use crate::domain::payment::{Amount, Payment, PaymentId, PaymentMethod};
use crate::domain::ports::PaymentRepositoryBox;
use crate::domain::transition::{self, PayOutcome, PaymentSet};
use crate::error::{PaymentError, Result};
use log::{debug, warn};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

/// The entry point for every payment operation.
///
/// Each mutating call is one read-modify-write cycle: load the whole set from
/// the repository, apply a single transition, save the set back. Cycles are
/// serialized through an internal mutex, so one `PaymentService` can be shared
/// between concurrent callers without breaking credit card exclusivity.
/// Separate services over the same backing store are not coordinated.
pub struct PaymentService {
    repository: PaymentRepositoryBox,
    write_lock: Mutex<()>,
}

impl PaymentService {
    /// Creates a new `PaymentService` on top of `repository`.
    pub fn new(repository: PaymentRepositoryBox) -> Self {
        Self {
            repository,
            write_lock: Mutex::new(()),
        }
    }

    /// Returns every payment in registration order. No rules are checked.
    pub async fn list(&self) -> Result<Vec<Payment>> {
        let payments = self.repository.load_all().await?;
        Ok(payments.into_iter().collect())
    }

    pub async fn get(&self, id: impl Into<PaymentId>) -> Result<Payment> {
        let id = id.into();
        let payments = self.repository.load_all().await?;
        payments
            .get(&id)
            .cloned()
            .ok_or(PaymentError::NotFound(id))
    }

    /// Registers a new payment. The method is parsed (and case-folded) before
    /// anything else, so an unknown method never reaches the store.
    pub async fn register(
        &self,
        id: impl Into<PaymentId>,
        amount: Decimal,
        method: &str,
    ) -> Result<Payment> {
        let method: PaymentMethod = method.parse()?;
        let amount = Amount::new(amount)?;
        let id = id.into();

        let payment = self
            .transact(|payments| transition::register(payments, id, amount, method))
            .await
            .inspect_err(|e| warn!("register rejected: {e}"))?;
        debug!(
            "Registered payment {} ({} via {})",
            payment.id(),
            payment.amount(),
            payment.payment_method()
        );
        Ok(payment)
    }

    /// Changes the amount and/or method of a `REGISTERED` payment.
    pub async fn update(
        &self,
        id: impl Into<PaymentId>,
        amount: Option<Decimal>,
        method: Option<&str>,
    ) -> Result<Payment> {
        let method = method.map(str::parse::<PaymentMethod>).transpose()?;
        let amount = amount.map(Amount::new).transpose()?;
        let id = id.into();

        let payment = self
            .transact(|payments| transition::update(payments, &id, amount, method))
            .await
            .inspect_err(|e| warn!("update rejected: {e}"))?;
        debug!(
            "Updated payment {} to {} via {}",
            payment.id(),
            payment.amount(),
            payment.payment_method()
        );
        Ok(payment)
    }

    /// Pays a `REGISTERED` payment.
    ///
    /// When the method's strategy rejects the payment it is saved as `FAILED`
    /// and the rejection is returned as [`PaymentError::ValidationRejected`].
    pub async fn pay(&self, id: impl Into<PaymentId>) -> Result<Payment> {
        let id = id.into();
        let outcome = self
            .transact(|payments| transition::pay(payments, &id))
            .await
            .inspect_err(|e| warn!("pay rejected: {e}"))?;

        match outcome {
            PayOutcome::Paid(payment) => {
                debug!("Paid payment {}", payment.id());
                Ok(payment)
            }
            PayOutcome::Failed { payment, reason } => {
                warn!("Payment {} failed validation: {}", payment.id(), reason);
                Err(PaymentError::ValidationRejected {
                    id: payment.id().clone(),
                    reason,
                })
            }
        }
    }

    /// Moves a `FAILED` payment back to `REGISTERED`.
    pub async fn revert(&self, id: impl Into<PaymentId>) -> Result<Payment> {
        let id = id.into();
        let payment = self
            .transact(|payments| transition::revert(payments, &id))
            .await
            .inspect_err(|e| warn!("revert rejected: {e}"))?;
        debug!("Reverted payment {}", payment.id());
        Ok(payment)
    }

    /// Cancels a `REGISTERED` payment for good.
    pub async fn cancel(&self, id: impl Into<PaymentId>) -> Result<Payment> {
        let id = id.into();
        let payment = self
            .transact(|payments| transition::cancel(payments, &id))
            .await
            .inspect_err(|e| warn!("cancel rejected: {e}"))?;
        debug!("Canceled payment {}", payment.id());
        Ok(payment)
    }

    /// One serialized load / apply / save cycle. Nothing is saved when `apply`
    /// returns an error.
    async fn transact<T>(&self, apply: impl FnOnce(&mut PaymentSet) -> Result<T>) -> Result<T> {
        let _guard = self.write_lock.lock().await;
        let mut payments = self.repository.load_all().await?;
        let result = apply(&mut payments)?;
        self.repository.save_all(&payments).await?;
        Ok(result)
    }
}
