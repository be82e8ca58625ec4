use super::StoredPayment;
use crate::domain::payment::PaymentId;
use crate::domain::ports::PaymentRepository;
use crate::domain::transition::PaymentSet;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default location of the payment file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "data.json";

/// A flat-file repository keeping every payment in one JSON object keyed by id.
///
/// ```json
/// {
///   "pay-1": { "amount": "100.5", "payment_method": "credit_card", "state": "PAID" }
/// }
/// ```
///
/// A missing file is created holding `{}`; an empty file reads as no payments.
/// Writes go to a temporary file in the same directory which is then renamed
/// over the original, so readers never observe a half-written set.
#[derive(Debug, Clone)]
pub struct JsonFilePaymentRepository {
    path: PathBuf,
}

impl JsonFilePaymentRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    async fn write_atomically(&self, contents: Vec<u8>) -> Result<()> {
        let path = self.path.clone();
        let directory = self.directory();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut file = tempfile::NamedTempFile::new_in(directory)?;
            file.write_all(&contents)?;
            file.as_file().sync_all()?;
            file.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| PaymentError::StorageUnavailable(Box::new(e)))?
    }
}

#[async_trait]
impl PaymentRepository for JsonFilePaymentRepository {
    async fn load_all(&self) -> Result<PaymentSet> {
        if !tokio::fs::try_exists(&self.path).await? {
            debug!("Creating empty payment file at {}", self.path.display());
            self.write_atomically(b"{}".to_vec()).await?;
            return Ok(PaymentSet::new());
        }

        let raw = tokio::fs::read_to_string(&self.path).await?;
        if raw.trim().is_empty() {
            return Ok(PaymentSet::new());
        }

        let stored: IndexMap<PaymentId, StoredPayment> = serde_json::from_str(&raw)?;
        Ok(stored
            .into_iter()
            .map(|(id, record)| record.into_payment(id))
            .collect())
    }

    async fn save_all(&self, payments: &PaymentSet) -> Result<()> {
        let stored: IndexMap<&PaymentId, StoredPayment> = payments
            .iter()
            .map(|payment| (payment.id(), StoredPayment::from(payment)))
            .collect();
        let contents = serde_json::to_vec_pretty(&stored)?;
        self.write_atomically(contents).await
    }
}
