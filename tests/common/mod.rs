use paymgr::PaymentService;
use paymgr::infrastructure::in_memory::InMemoryPaymentRepository;
use std::io::{Error, Write};
use std::path::Path;

pub fn service() -> PaymentService {
    PaymentService::new(Box::new(InMemoryPaymentRepository::new()))
}

/// Writes a command batch with the `op, id, amount, method` header.
pub fn write_commands(path: &Path, rows: &[[&str; 4]]) -> Result<(), Error> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "op, id, amount, method")?;
    for row in rows {
        writeln!(file, "{}", row.join(", "))?;
    }
    Ok(())
}
