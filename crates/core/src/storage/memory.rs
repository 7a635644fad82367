use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::transaction::{normalize_symbol, Transaction};

use super::traits::TransactionStore;

/// Check a transaction before it enters a store.
///
/// Quantity and price must be positive and finite, the symbol non-empty, and
/// the purchase date no later than tomorrow (one day of timezone slack).
pub fn validate_transaction(transaction: &Transaction, today: NaiveDate) -> Result<(), CoreError> {
    if transaction.symbol.trim().is_empty() {
        return Err(CoreError::ValidationError("Symbol must not be empty".into()));
    }
    if !transaction.quantity.is_finite() || transaction.quantity <= 0.0 {
        return Err(CoreError::ValidationError(format!(
            "Quantity must be positive (got {})",
            transaction.quantity
        )));
    }
    if !transaction.purchase_price.is_finite() || transaction.purchase_price <= 0.0 {
        return Err(CoreError::ValidationError(format!(
            "Purchase price must be positive (got {})",
            transaction.purchase_price
        )));
    }
    if let Some(tomorrow) = today.succ_opt() {
        if transaction.purchase_date > tomorrow {
            return Err(CoreError::ValidationError(format!(
                "Purchase date {} is in the future",
                transaction.purchase_date
            )));
        }
    }
    Ok(())
}

/// Transaction store held in memory, kept sorted by purchase date.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionStore {
    transactions: Vec<Transaction>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing transactions, validating each.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Result<Self, CoreError> {
        let mut store = Self::new();
        for transaction in transactions {
            store.insert(transaction)?;
        }
        Ok(store)
    }

    fn insert_validated(&mut self, mut transaction: Transaction, today: NaiveDate) -> Result<Uuid, CoreError> {
        transaction.symbol = normalize_symbol(&transaction.symbol);
        validate_transaction(&transaction, today)?;
        if self.transactions.iter().any(|t| t.id == transaction.id) {
            return Err(CoreError::ValidationError(format!(
                "Duplicate transaction id {}",
                transaction.id
            )));
        }

        let id = transaction.id;
        // Upper bound keeps same-day transactions in insertion order
        let pos = self
            .transactions
            .partition_point(|t| t.purchase_date <= transaction.purchase_date);
        self.transactions.insert(pos, transaction);
        tracing::debug!("Stored transaction {id}");
        Ok(id)
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn list(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    fn get(&self, id: Uuid) -> Option<Transaction> {
        self.transactions.iter().find(|t| t.id == id).cloned()
    }

    fn insert(&mut self, transaction: Transaction) -> Result<Uuid, CoreError> {
        self.insert_validated(transaction, Utc::now().date_naive())
    }

    fn delete(&mut self, id: Uuid) -> Result<Transaction, CoreError> {
        let idx = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;
        Ok(self.transactions.remove(idx))
    }

    fn len(&self) -> usize {
        self.transactions.len()
    }
}
