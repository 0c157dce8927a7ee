use dashmap::DashMap;
use diesel::Connection;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::aggregation::{
    AggregationService, AggregationServiceTrait, CustomerTotals, DashboardSummary,
};
use crate::customers::{
    Customer, CustomerError, CustomerRepository, CustomerRepositoryTrait, CustomerService,
    CustomerServiceTrait, CustomerUpdate, NewCustomer,
};
use crate::db::{get_connection, DbPool};
use crate::entries::{
    CreditEntry, CreditEntryUpdate, EntryRepository, EntryRepositoryTrait, EntryService,
    EntryServiceTrait, NewCreditEntry, PaymentUpdate,
};
use crate::errors::ValidationError;
use crate::{Error, Result};

/// Orchestration façade over the ledger.
///
/// Every state-changing operation follows the same two-phase protocol:
/// validate and mutate, then recompute the affected customer's totals —
/// both inside one transaction, under that customer's lock. A successful
/// return therefore always reflects consistent derived totals, and an
/// aborted call leaves neither the write nor stale totals visible.
pub struct LedgerService {
    pool: Arc<DbPool>,
    customer_service: Arc<dyn CustomerServiceTrait>,
    entry_service: Arc<dyn EntryServiceTrait>,
    customer_repository: Arc<dyn CustomerRepositoryTrait>,
    entry_repository: Arc<dyn EntryRepositoryTrait>,
    aggregation: Arc<dyn AggregationServiceTrait>,
    // Serializes mutations per customer aggregate. Different customers
    // proceed in parallel.
    customer_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl LedgerService {
    /// Creates a LedgerService wired with the default sqlite-backed
    /// components
    pub fn new(pool: Arc<DbPool>) -> Self {
        let customer_repository: Arc<dyn CustomerRepositoryTrait> =
            Arc::new(CustomerRepository::new(pool.clone()));
        let entry_repository: Arc<dyn EntryRepositoryTrait> =
            Arc::new(EntryRepository::new(pool.clone()));
        let aggregation: Arc<dyn AggregationServiceTrait> = Arc::new(AggregationService::new(
            pool.clone(),
            customer_repository.clone(),
            entry_repository.clone(),
        ));
        let customer_service: Arc<dyn CustomerServiceTrait> =
            Arc::new(CustomerService::new(customer_repository.clone()));
        let entry_service: Arc<dyn EntryServiceTrait> =
            Arc::new(EntryService::new(entry_repository.clone()));

        Self::with_components(
            pool,
            customer_service,
            entry_service,
            customer_repository,
            entry_repository,
            aggregation,
        )
    }

    /// Creates a LedgerService with injected components
    pub fn with_components(
        pool: Arc<DbPool>,
        customer_service: Arc<dyn CustomerServiceTrait>,
        entry_service: Arc<dyn EntryServiceTrait>,
        customer_repository: Arc<dyn CustomerRepositoryTrait>,
        entry_repository: Arc<dyn EntryRepositoryTrait>,
        aggregation: Arc<dyn AggregationServiceTrait>,
    ) -> Self {
        Self {
            pool,
            customer_service,
            entry_service,
            customer_repository,
            entry_repository,
            aggregation,
            customer_locks: DashMap::new(),
        }
    }

    fn customer_lock(&self, customer_id: &str) -> Arc<Mutex<()>> {
        self.customer_locks
            .entry(customer_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // ----- Customer operations -----

    /// Creates a new customer
    pub async fn create_customer(&self, new_customer: NewCustomer) -> Result<Customer> {
        self.customer_service.create_customer(new_customer).await
    }

    /// Updates a customer's identity fields
    pub async fn update_customer(&self, customer_update: CustomerUpdate) -> Result<Customer> {
        self.customer_service.update_customer(customer_update).await
    }

    /// Retrieves a customer with its current derived totals
    pub fn get_customer(&self, customer_id: &str) -> Result<Customer> {
        self.customer_service.get_customer(customer_id)
    }

    /// Lists all customers, newest first
    pub fn list_customers(&self) -> Result<Vec<Customer>> {
        self.customer_service.list_customers()
    }

    /// Deletes a customer and all of its credit entries as one unit.
    ///
    /// If orphan entries somehow survive the transaction, compensating
    /// cleanup runs and a remaining orphan surfaces as `PartialDelete`
    /// rather than a claimed success.
    pub async fn delete_customer(&self, customer_id: &str) -> Result<()> {
        let lock = self.customer_lock(customer_id);
        let guard = lock.lock().await;

        let mut conn = get_connection(&self.pool)?;
        conn.transaction::<_, Error, _>(|tx_conn| {
            self.customer_repository
                .get_by_id_with_conn(tx_conn, customer_id)?;
            let removed = self
                .entry_repository
                .delete_by_customer_with_conn(tx_conn, customer_id)?;
            self.customer_repository
                .delete_with_conn(tx_conn, customer_id)?;
            debug!(
                "Deleted customer {} and {} credit entries",
                customer_id, removed
            );
            Ok(())
        })?;

        let remaining = self.entry_repository.count_by_customer(customer_id)?;
        if remaining > 0 {
            warn!(
                "{} orphan entries left after deleting customer {}, running cleanup",
                remaining, customer_id
            );
            self.entry_repository.delete_by_customer(customer_id).await?;

            let still_remaining = self.entry_repository.count_by_customer(customer_id)?;
            if still_remaining > 0 {
                return Err(Error::PartialDelete(format!(
                    "{} entries for customer {} could not be removed",
                    still_remaining, customer_id
                )));
            }
        }

        drop(guard);
        self.customer_locks.remove(customer_id);
        Ok(())
    }

    // ----- Credit entry operations -----

    /// Creates a credit entry against an existing customer and recomputes
    /// that customer's totals in the same transaction
    pub async fn create_entry(&self, new_entry: NewCreditEntry) -> Result<CreditEntry> {
        new_entry.validate()?;

        let lock = self.customer_lock(&new_entry.customer_id);
        let _guard = lock.lock().await;

        let mut conn = get_connection(&self.pool)?;
        conn.transaction(|tx_conn| {
            match self
                .customer_repository
                .get_by_id_with_conn(tx_conn, &new_entry.customer_id)
            {
                Ok(_) => {}
                Err(Error::Customer(CustomerError::NotFound(_))) => {
                    return Err(Error::Validation(ValidationError::InvalidReference(
                        format!("customer {}", new_entry.customer_id),
                    )));
                }
                Err(e) => return Err(e),
            }

            let entry = self
                .entry_repository
                .create_with_conn(tx_conn, new_entry.clone())?;
            self.aggregation
                .recompute_customer_with_conn(tx_conn, &entry.customer_id)?;
            Ok(entry)
        })
    }

    /// Updates a credit entry and recomputes the owning customer's totals
    pub async fn update_entry(&self, entry_update: CreditEntryUpdate) -> Result<CreditEntry> {
        entry_update.validate()?;

        let existing = self.entry_repository.get_by_id(&entry_update.id)?;
        let lock = self.customer_lock(&existing.customer_id);
        let _guard = lock.lock().await;

        let mut conn = get_connection(&self.pool)?;
        conn.transaction(|tx_conn| {
            let entry = self
                .entry_repository
                .update_with_conn(tx_conn, entry_update.clone())?;
            self.aggregation
                .recompute_customer_with_conn(tx_conn, &entry.customer_id)?;
            Ok(entry)
        })
    }

    /// Deletes a credit entry and recomputes the owning customer's totals.
    /// Deleting a nonexistent id is NotFound, not a silent no-op.
    pub async fn delete_entry(&self, entry_id: &str) -> Result<CreditEntry> {
        let existing = self.entry_repository.get_by_id(entry_id)?;
        let lock = self.customer_lock(&existing.customer_id);
        let _guard = lock.lock().await;

        let mut conn = get_connection(&self.pool)?;
        conn.transaction(|tx_conn| {
            let entry = self.entry_repository.delete_with_conn(tx_conn, entry_id)?;
            self.aggregation
                .recompute_customer_with_conn(tx_conn, &entry.customer_id)?;
            Ok(entry)
        })
    }

    /// Sole entry point for payment transitions. Marking paid records the
    /// caller-supplied paid amount as-is (conventionally the full amount,
    /// but not enforced); marking unpaid conventionally resets it to zero.
    pub async fn set_payment_status(
        &self,
        entry_id: &str,
        payment: PaymentUpdate,
    ) -> Result<CreditEntry> {
        payment.validate()?;

        let existing = self.entry_repository.get_by_id(entry_id)?;
        let lock = self.customer_lock(&existing.customer_id);
        let _guard = lock.lock().await;

        let mut conn = get_connection(&self.pool)?;
        conn.transaction(|tx_conn| {
            let entry = self.entry_repository.set_payment_status_with_conn(
                tx_conn,
                entry_id,
                payment.is_paid,
                payment.paid_amount,
            )?;
            self.aggregation
                .recompute_customer_with_conn(tx_conn, &entry.customer_id)?;
            Ok(entry)
        })
    }

    /// Retrieves a credit entry by its ID
    pub fn get_entry(&self, entry_id: &str) -> Result<CreditEntry> {
        self.entry_service.get_entry(entry_id)
    }

    /// Lists a customer's entries, newest entry date first
    pub fn get_entries(&self, customer_id: &str) -> Result<Vec<CreditEntry>> {
        self.entry_service.get_entries_by_customer(customer_id)
    }

    // ----- Aggregates -----

    /// Recomputes one customer's totals on demand
    pub async fn recompute_customer(&self, customer_id: &str) -> Result<CustomerTotals> {
        let lock = self.customer_lock(customer_id);
        let _guard = lock.lock().await;
        self.aggregation.recompute_customer(customer_id).await
    }

    /// Reads the dashboard totals. Takes no customer lock: the summary may
    /// trail a concurrent write slightly but never observes torn fields,
    /// since it reads each customer row in a single select.
    pub fn dashboard(&self) -> Result<DashboardSummary> {
        self.aggregation.recompute_dashboard()
    }
}
