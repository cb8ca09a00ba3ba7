//! docgate storage
//!
//! Artifacts are written as individual files with no index and no
//! recovery:
//!
//! - [`DocumentStore`] keeps uploaded documents as `<uuid>_<name>`.
//! - [`PaymentLedger`] keeps payment references as `<reference>.json`.

mod documents;
mod error;
mod payments;

pub use crate::documents::{DocumentStore, StoredDocument, MAX_NAME_BYTES};
pub use crate::error::StorageError;
pub use crate::payments::{PaymentLedger, PaymentRecord, PaymentRequest};
