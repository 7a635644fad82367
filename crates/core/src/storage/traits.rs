use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::transaction::Transaction;

/// Where buy transactions live.
///
/// The engine only ever reads snapshots through `list`; inserts and
/// deletes come from the caller.
pub trait TransactionStore: Send + Sync {
    /// All transactions, oldest purchase first.
    fn list(&self) -> Vec<Transaction>;

    fn get(&self, id: Uuid) -> Option<Transaction>;

    /// Validate and store a transaction, returning its id.
    fn insert(&mut self, transaction: Transaction) -> Result<Uuid, CoreError>;

    /// Remove a transaction, returning it.
    fn delete(&mut self, id: Uuid) -> Result<Transaction, CoreError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
