use async_trait::async_trait;
use diesel::sqlite::SqliteConnection;

use super::customers_model::{Customer, CustomerUpdate, NewCustomer};
use crate::aggregation::CustomerTotals;
use crate::errors::Result;

/// Trait defining the contract for Customer repository operations.
#[async_trait]
pub trait CustomerRepositoryTrait: Send + Sync {
    async fn create(&self, new_customer: NewCustomer) -> Result<Customer>;
    async fn update(&self, customer_update: CustomerUpdate) -> Result<Customer>;
    fn get_by_id(&self, customer_id: &str) -> Result<Customer>;
    fn get_by_id_with_conn(
        &self,
        conn: &mut SqliteConnection,
        customer_id: &str,
    ) -> Result<Customer>;
    fn list(&self) -> Result<Vec<Customer>>;
    fn delete_with_conn(&self, conn: &mut SqliteConnection, customer_id: &str) -> Result<usize>;
    fn save_totals_with_conn(
        &self,
        conn: &mut SqliteConnection,
        customer_id: &str,
        totals: &CustomerTotals,
    ) -> Result<()>;
}

/// Trait defining the contract for Customer service operations.
#[async_trait]
pub trait CustomerServiceTrait: Send + Sync {
    async fn create_customer(&self, new_customer: NewCustomer) -> Result<Customer>;
    async fn update_customer(&self, customer_update: CustomerUpdate) -> Result<Customer>;
    fn get_customer(&self, customer_id: &str) -> Result<Customer>;
    fn list_customers(&self) -> Result<Vec<Customer>>;
}
