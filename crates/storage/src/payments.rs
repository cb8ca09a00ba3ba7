use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::StorageError;

/// Payment request handed back to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub reference: String,
    /// Receiver address.
    pub to: String,
    pub amount: f64,
    pub currency: String,
    pub message: String,
}

/// On-disk form: the request plus the wallet it was created for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub request: PaymentRequest,
    pub wallet: String,
}

/// Writes one JSON file per payment reference. Records are never updated.
#[derive(Debug, Clone)]
pub struct PaymentLedger {
    root: PathBuf,
    receiver: String,
    currency: String,
}

impl PaymentLedger {
    pub async fn open(
        root: impl Into<PathBuf>,
        receiver: impl Into<String>,
        currency: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            receiver: receiver.into(),
            currency: currency.into(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    /// Create and persist a payment reference for `wallet`.
    pub async fn create(
        &self,
        wallet: &str,
        rental_hours: u32,
        amount: f64,
    ) -> Result<PaymentRequest, StorageError> {
        let reference = Uuid::new_v4().to_string();
        let request = PaymentRequest {
            reference: reference.clone(),
            to: self.receiver.clone(),
            amount,
            currency: self.currency.clone(),
            message: format!("Rental for {wallet}"),
        };
        let record = PaymentRecord {
            request: request.clone(),
            wallet: wallet.to_string(),
        };

        let bytes = serde_json::to_vec(&record)?;
        tokio::fs::write(self.record_path(&reference), bytes).await?;

        info!(
            reference = %reference,
            wallet = %wallet,
            rental_hours,
            amount,
            "created payment reference"
        );
        Ok(request)
    }

    /// Read back a stored record.
    pub async fn load(&self, reference: &str) -> Result<PaymentRecord, StorageError> {
        if Uuid::parse_str(reference).is_err() {
            return Err(StorageError::InvalidName(reference.to_string()));
        }
        let bytes = tokio::fs::read(self.record_path(reference)).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn record_path(&self, reference: &str) -> PathBuf {
        self.root.join(format!("{reference}.json"))
    }
}
