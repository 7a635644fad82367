use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::transaction::Transaction;

/// Tag identifying a transaction snapshot document.
pub const FORMAT_TAG: &str = "portfolio-transactions";

/// Current snapshot format version.
pub const CURRENT_VERSION: u16 = 1;

/// JSON document holding a full copy of the transaction list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSnapshot {
    pub format: String,
    pub version: u16,
    pub exported_at: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
}

/// Accepted input shapes: a tagged snapshot, or a bare transaction array.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotInput {
    Tagged(TransactionSnapshot),
    Bare(Vec<Transaction>),
}

/// Serialize `transactions` into a snapshot document.
pub fn export_json(transactions: &[Transaction]) -> Result<String, CoreError> {
    let snapshot = TransactionSnapshot {
        format: FORMAT_TAG.to_string(),
        version: CURRENT_VERSION,
        exported_at: Utc::now(),
        transactions: transactions.to_vec(),
    };
    serde_json::to_string_pretty(&snapshot)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize transactions: {e}")))
}

/// Parse a snapshot document (or a bare array of transactions).
///
/// The transactions are returned as stored; validation happens when they
/// are inserted into a store.
pub fn import_json(json: &str) -> Result<Vec<Transaction>, CoreError> {
    let input: SnapshotInput = serde_json::from_str(json)
        .map_err(|e| CoreError::Deserialization(format!("Not a transaction snapshot: {e}")))?;

    match input {
        SnapshotInput::Bare(transactions) => Ok(transactions),
        SnapshotInput::Tagged(snapshot) => {
            if snapshot.format != FORMAT_TAG {
                return Err(CoreError::Deserialization(format!(
                    "Unknown snapshot format '{}'",
                    snapshot.format
                )));
            }
            if snapshot.version > CURRENT_VERSION {
                return Err(CoreError::Deserialization(format!(
                    "Snapshot version {} is newer than supported version {CURRENT_VERSION}",
                    snapshot.version
                )));
            }
            Ok(snapshot.transactions)
        }
    }
}
