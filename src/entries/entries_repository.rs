use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::constants::DECIMAL_PRECISION;
use crate::db::{get_connection, DbPool};
use crate::entries::entries_errors::EntryError;
use crate::entries::entries_model::*;
use crate::errors::Result;
use crate::schema::credit_entries;

use super::entries_traits::EntryRepositoryTrait;

/// Repository for managing credit-entry data in the database
pub struct EntryRepository {
    pool: Arc<DbPool>,
}

impl EntryRepository {
    /// Creates a new EntryRepository instance
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn load_by_id(conn: &mut SqliteConnection, entry_id: &str) -> Result<CreditEntryDB> {
        credit_entries::table
            .find(entry_id)
            .first::<CreditEntryDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => EntryError::NotFound(format!(
                    "Credit entry with id {} not found",
                    entry_id
                ))
                .into(),
                _ => EntryError::DatabaseError(e.to_string()).into(),
            })
    }
}

#[async_trait::async_trait]
impl EntryRepositoryTrait for EntryRepository {
    /// Inserts a new credit entry inside an ongoing transaction
    fn create_with_conn(
        &self,
        conn: &mut SqliteConnection,
        new_entry: NewCreditEntry,
    ) -> Result<CreditEntry> {
        new_entry.validate()?;

        let mut entry_db: CreditEntryDB = new_entry.into();
        entry_db.id = Uuid::new_v4().to_string();

        diesel::insert_into(credit_entries::table)
            .values(&entry_db)
            .get_result::<CreditEntryDB>(conn)
            .map(CreditEntry::from)
            .map_err(|e| EntryError::from(e).into())
    }

    /// Updates an existing credit entry inside an ongoing transaction.
    /// Only the supplied fields change; `customer_id` is never touched.
    fn update_with_conn(
        &self,
        conn: &mut SqliteConnection,
        entry_update: CreditEntryUpdate,
    ) -> Result<CreditEntry> {
        entry_update.validate()?;

        let mut existing = Self::load_by_id(conn, &entry_update.id)?;
        entry_update.apply_to(&mut existing);

        diesel::update(credit_entries::table.find(&existing.id))
            .set(&existing)
            .get_result::<CreditEntryDB>(conn)
            .map(CreditEntry::from)
            .map_err(|e| EntryError::from(e).into())
    }

    /// Records a payment-status transition. The supplied `paid_amount` is
    /// stored as-is, including values above the entry amount.
    fn set_payment_status_with_conn(
        &self,
        conn: &mut SqliteConnection,
        entry_id: &str,
        paid: bool,
        amount_paid: Decimal,
    ) -> Result<CreditEntry> {
        // Existence check first so a missing id surfaces as NotFound
        Self::load_by_id(conn, entry_id)?;

        diesel::update(credit_entries::table.find(entry_id))
            .set((
                credit_entries::is_paid.eq(paid),
                credit_entries::paid_amount.eq(amount_paid
                    .round_dp(DECIMAL_PRECISION)
                    .to_string()),
                credit_entries::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .get_result::<CreditEntryDB>(conn)
            .map(CreditEntry::from)
            .map_err(|e| EntryError::from(e).into())
    }

    /// Deletes a credit entry inside an ongoing transaction and returns it
    fn delete_with_conn(&self, conn: &mut SqliteConnection, entry_id: &str) -> Result<CreditEntry> {
        let entry = Self::load_by_id(conn, entry_id)?;

        diesel::delete(credit_entries::table.find(entry_id))
            .execute(conn)
            .map_err(|e| EntryError::DatabaseError(e.to_string()))?;

        Ok(entry.into())
    }

    /// Deletes all entries belonging to a customer inside an ongoing
    /// transaction, returning the number of deleted records
    fn delete_by_customer_with_conn(
        &self,
        conn: &mut SqliteConnection,
        customer_id: &str,
    ) -> Result<usize> {
        diesel::delete(credit_entries::table.filter(credit_entries::customer_id.eq(customer_id)))
            .execute(conn)
            .map_err(|e| EntryError::DatabaseError(e.to_string()).into())
    }

    /// Compensating cleanup for a cascade delete that left orphans behind
    async fn delete_by_customer(&self, customer_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(credit_entries::table.filter(credit_entries::customer_id.eq(customer_id)))
            .execute(&mut conn)
            .map_err(|e| EntryError::DatabaseError(e.to_string()).into())
    }

    /// Retrieves a credit entry by its ID
    fn get_by_id(&self, entry_id: &str) -> Result<CreditEntry> {
        let mut conn = get_connection(&self.pool)?;
        Self::load_by_id(&mut conn, entry_id).map(CreditEntry::from)
    }

    /// Lists a customer's entries, newest entry date first. Date ties are
    /// broken by creation order so the sequence is stable.
    fn list_by_customer(&self, customer_id: &str) -> Result<Vec<CreditEntry>> {
        let mut conn = get_connection(&self.pool)?;
        self.list_by_customer_with_conn(&mut conn, customer_id)
    }

    /// Same listing inside an ongoing transaction
    fn list_by_customer_with_conn(
        &self,
        conn: &mut SqliteConnection,
        customer_id: &str,
    ) -> Result<Vec<CreditEntry>> {
        credit_entries::table
            .filter(credit_entries::customer_id.eq(customer_id))
            .select(CreditEntryDB::as_select())
            .order((
                credit_entries::entry_date.desc(),
                credit_entries::created_at.asc(),
                credit_entries::id.asc(),
            ))
            .load::<CreditEntryDB>(conn)
            .map(|rows| rows.into_iter().map(CreditEntry::from).collect())
            .map_err(|e| EntryError::from(e).into())
    }

    /// Counts all credit entries in the store
    fn count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        credit_entries::table
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(|e| EntryError::from(e).into())
    }

    /// Counts the entries belonging to one customer
    fn count_by_customer(&self, customer_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        credit_entries::table
            .filter(credit_entries::customer_id.eq(customer_id))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(|e| EntryError::from(e).into())
    }
}
