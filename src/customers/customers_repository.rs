use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::aggregation::CustomerTotals;
use crate::constants::DECIMAL_PRECISION;
use crate::customers::CustomerError;
use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::customers;
use crate::schema::customers::dsl::*;

use super::customers_model::{Customer, CustomerDB, CustomerUpdate, NewCustomer};
use super::customers_traits::CustomerRepositoryTrait;

/// Repository for managing customer data in the database
pub struct CustomerRepository {
    pool: Arc<DbPool>,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository instance
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn load_by_id(conn: &mut SqliteConnection, customer_id: &str) -> Result<CustomerDB> {
        customers
            .find(customer_id)
            .first::<CustomerDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => CustomerError::NotFound(format!(
                    "Customer with id {} not found",
                    customer_id
                ))
                .into(),
                _ => CustomerError::DatabaseError(e.to_string()).into(),
            })
    }
}

#[async_trait::async_trait]
impl CustomerRepositoryTrait for CustomerRepository {
    /// Creates a new customer in the database
    async fn create(&self, new_customer: NewCustomer) -> Result<Customer> {
        new_customer.validate()?;

        let mut customer_db: CustomerDB = new_customer.into();
        customer_db.id = uuid::Uuid::new_v4().to_string();

        let mut conn = get_connection(&self.pool)?;

        diesel::insert_into(customers::table)
            .values(&customer_db)
            .execute(&mut conn)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        Ok(customer_db.into())
    }

    /// Updates an existing customer's identity fields. Only the identity
    /// columns are written, so a concurrently recomputed balance is never
    /// overwritten by this path.
    async fn update(&self, customer_update: CustomerUpdate) -> Result<Customer> {
        customer_update.validate()?;

        let customer_id = customer_update.id.clone().unwrap_or_default();
        let mut conn = get_connection(&self.pool)?;

        let affected = diesel::update(customers.find(&customer_id))
            .set((
                name.eq(customer_update.name),
                phone.eq(customer_update.phone),
                address.eq(customer_update.address),
                updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(CustomerError::NotFound(format!(
                "Customer with id {} not found",
                customer_id
            ))
            .into());
        }

        Self::load_by_id(&mut conn, &customer_id).map(Customer::from)
    }

    /// Retrieves a customer by its ID
    fn get_by_id(&self, customer_id: &str) -> Result<Customer> {
        let mut conn = get_connection(&self.pool)?;
        Self::load_by_id(&mut conn, customer_id).map(Customer::from)
    }

    /// Retrieves a customer by its ID inside an ongoing transaction
    fn get_by_id_with_conn(
        &self,
        conn: &mut SqliteConnection,
        customer_id: &str,
    ) -> Result<Customer> {
        Self::load_by_id(conn, customer_id).map(Customer::from)
    }

    /// Lists all customers, newest first
    fn list(&self) -> Result<Vec<Customer>> {
        let mut conn = get_connection(&self.pool)?;

        customers::table
            .order(created_at.desc())
            .load::<CustomerDB>(&mut conn)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()).into())
            .map(|results| results.into_iter().map(Customer::from).collect())
    }

    /// Deletes a customer row inside an ongoing transaction and returns the
    /// number of deleted records
    fn delete_with_conn(&self, conn: &mut SqliteConnection, customer_id: &str) -> Result<usize> {
        let affected = diesel::delete(customers.find(customer_id))
            .execute(conn)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(CustomerError::NotFound(format!(
                "Customer with id {} not found",
                customer_id
            ))
            .into());
        }

        Ok(affected)
    }

    /// Persists recomputed totals onto the customer row. This is the only
    /// write path for the derived balance fields.
    fn save_totals_with_conn(
        &self,
        conn: &mut SqliteConnection,
        customer_id: &str,
        totals: &CustomerTotals,
    ) -> Result<()> {
        let affected = diesel::update(customers.find(customer_id))
            .set((
                total_credit.eq(totals.total_credit.round_dp(DECIMAL_PRECISION).to_string()),
                total_paid.eq(totals.total_paid.round_dp(DECIMAL_PRECISION).to_string()),
                outstanding_balance.eq(totals
                    .outstanding_balance
                    .round_dp(DECIMAL_PRECISION)
                    .to_string()),
                updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(CustomerError::NotFound(format!(
                "Customer with id {} not found",
                customer_id
            ))
            .into());
        }

        Ok(())
    }
}
