use crate::application::service::PaymentService;
use crate::domain::payment::Payment;
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Register,
    Update,
    Pay,
    Revert,
    Cancel,
}

/// One row of a command batch: `op, id, amount, method`.
///
/// `amount` and `method` are required for `register`, optional for `update`
/// and ignored by the other operations.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct PaymentCommand {
    pub op: CommandKind,
    pub id: String,
    pub amount: Option<Decimal>,
    pub method: Option<String>,
}

impl PaymentCommand {
    /// Runs this command against `service`.
    pub async fn apply(self, service: &PaymentService) -> Result<Payment> {
        match self.op {
            CommandKind::Register => {
                let amount = self.amount.ok_or_else(|| {
                    PaymentError::InvalidAmount(format!("register '{}' needs an amount", self.id))
                })?;
                let method = self.method.as_deref().unwrap_or_default();
                service.register(self.id, amount, method).await
            }
            CommandKind::Update => {
                service
                    .update(self.id, self.amount, self.method.as_deref())
                    .await
            }
            CommandKind::Pay => service.pay(self.id).await,
            CommandKind::Revert => service.revert(self.id).await,
            CommandKind::Cancel => service.cancel(self.id).await,
        }
    }
}

/// Reads payment commands from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<PaymentCommand>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes commands.
    pub fn commands(self) -> impl Iterator<Item = Result<PaymentCommand>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}
