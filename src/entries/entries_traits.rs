use async_trait::async_trait;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;

use super::entries_model::{CreditEntry, CreditEntryUpdate, NewCreditEntry};
use crate::errors::Result;

/// Trait defining the contract for credit-entry repository operations.
///
/// Mutations take an explicit connection: the ledger façade runs them inside
/// the same transaction that recomputes the owning customer's totals.
#[async_trait]
pub trait EntryRepositoryTrait: Send + Sync {
    fn create_with_conn(
        &self,
        conn: &mut SqliteConnection,
        new_entry: NewCreditEntry,
    ) -> Result<CreditEntry>;
    fn update_with_conn(
        &self,
        conn: &mut SqliteConnection,
        entry_update: CreditEntryUpdate,
    ) -> Result<CreditEntry>;
    fn set_payment_status_with_conn(
        &self,
        conn: &mut SqliteConnection,
        entry_id: &str,
        paid: bool,
        amount_paid: Decimal,
    ) -> Result<CreditEntry>;
    fn delete_with_conn(&self, conn: &mut SqliteConnection, entry_id: &str) -> Result<CreditEntry>;
    fn delete_by_customer_with_conn(
        &self,
        conn: &mut SqliteConnection,
        customer_id: &str,
    ) -> Result<usize>;
    async fn delete_by_customer(&self, customer_id: &str) -> Result<usize>;
    fn get_by_id(&self, entry_id: &str) -> Result<CreditEntry>;
    fn list_by_customer(&self, customer_id: &str) -> Result<Vec<CreditEntry>>;
    fn list_by_customer_with_conn(
        &self,
        conn: &mut SqliteConnection,
        customer_id: &str,
    ) -> Result<Vec<CreditEntry>>;
    fn count(&self) -> Result<i64>;
    fn count_by_customer(&self, customer_id: &str) -> Result<i64>;
}

/// Trait defining the read-side contract for credit-entry service operations.
/// Mutating operations live on the ledger façade, which owns the
/// mutate-then-recompute protocol.
pub trait EntryServiceTrait: Send + Sync {
    fn get_entry(&self, entry_id: &str) -> Result<CreditEntry>;
    fn get_entries_by_customer(&self, customer_id: &str) -> Result<Vec<CreditEntry>>;
}
