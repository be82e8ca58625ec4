use crate::domain::payment::Payment;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct PaymentRow<'a> {
    id: &'a str,
    amount: String,
    payment_method: &'static str,
    state: &'static str,
    failure_reason: &'a str,
}

impl<'a> From<&'a Payment> for PaymentRow<'a> {
    fn from(payment: &'a Payment) -> Self {
        Self {
            id: payment.id().as_str(),
            amount: payment.amount().to_string(),
            payment_method: payment.payment_method().as_str(),
            state: payment.state().as_str(),
            failure_reason: payment.failure_reason().unwrap_or_default(),
        }
    }
}

/// Writes payments as CSV with the header
/// `id,amount,payment_method,state,failure_reason`.
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_payments<'a, I>(&mut self, payments: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Payment>,
    {
        let mut wrote_any = false;
        for payment in payments {
            self.writer.serialize(PaymentRow::from(payment))?;
            wrote_any = true;
        }
        if !wrote_any {
            self.writer
                .write_record(["id", "amount", "payment_method", "state", "failure_reason"])?;
        }
        self.writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
