use super::StoredPayment;
use crate::domain::payment::PaymentId;
use crate::domain::ports::PaymentRepository;
use crate::domain::transition::PaymentSet;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Column Family holding one entry per payment, keyed by payment id.
pub const CF_PAYMENTS: &str = "payments";

/// Value layout: the stored payment plus its position in registration order,
/// since RocksDB iterates in key order.
#[derive(Serialize, Deserialize)]
struct Entry {
    position: usize,
    payment: StoredPayment,
}

/// A persistent repository implementation using RocksDB.
///
/// `save_all` writes the complete set in a single `WriteBatch`, removing keys
/// that are no longer present, so a crash mid-save leaves the previous set
/// intact.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBPaymentRepository {
    db: Arc<DB>,
}

impl RocksDBPaymentRepository {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "payments" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn payments_cf(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_PAYMENTS).ok_or_else(|| {
            PaymentError::StorageUnavailable(Box::new(std::io::Error::other(
                "Payments column family not found",
            )))
        })
    }
}

#[async_trait]
impl PaymentRepository for RocksDBPaymentRepository {
    async fn load_all(&self) -> Result<PaymentSet> {
        let cf = self.payments_cf()?;

        let mut entries = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            let id = PaymentId::new(String::from_utf8(key.to_vec()).map_err(|e| {
                PaymentError::StorageUnavailable(Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("Invalid payment key: {}", e),
                )))
            })?);
            let entry: Entry = serde_json::from_slice(&value)?;
            entries.push((entry.position, entry.payment.into_payment(id)));
        }

        entries.sort_by_key(|(position, _)| *position);
        Ok(entries.into_iter().map(|(_, payment)| payment).collect())
    }

    async fn save_all(&self, payments: &PaymentSet) -> Result<()> {
        let cf = self.payments_cf()?;
        let mut batch = WriteBatch::default();

        let keep: HashSet<&[u8]> = payments.iter().map(|p| p.id().as_str().as_bytes()).collect();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, _) = item?;
            if !keep.contains(&*key) {
                batch.delete_cf(cf, key);
            }
        }

        for (position, payment) in payments.iter().enumerate() {
            let entry = Entry {
                position,
                payment: StoredPayment::from(payment),
            };
            batch.put_cf(cf, payment.id().as_str().as_bytes(), serde_json::to_vec(&entry)?);
        }

        self.db.write(batch)?;
        Ok(())
    }
}
