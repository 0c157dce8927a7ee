use log::debug;
use std::sync::Arc;

use super::customers_model::{Customer, CustomerUpdate, NewCustomer};
use super::customers_traits::{CustomerRepositoryTrait, CustomerServiceTrait};
use crate::Result;

/// Service for managing customer identity records.
///
/// Cascade deletion lives on the ledger façade, since it spans the customer
/// row and its credit entries as one unit.
pub struct CustomerService {
    customer_repository: Arc<dyn CustomerRepositoryTrait>,
}

impl CustomerService {
    /// Creates a new CustomerService instance
    pub fn new(customer_repository: Arc<dyn CustomerRepositoryTrait>) -> Self {
        Self {
            customer_repository,
        }
    }
}

#[async_trait::async_trait]
impl CustomerServiceTrait for CustomerService {
    /// Creates a new customer. A fresh customer starts with zero totals, so
    /// no recompute is needed here.
    async fn create_customer(&self, new_customer: NewCustomer) -> Result<Customer> {
        debug!("Creating customer {}", new_customer.name);
        self.customer_repository.create(new_customer).await
    }

    /// Updates a customer's identity fields
    async fn update_customer(&self, customer_update: CustomerUpdate) -> Result<Customer> {
        self.customer_repository.update(customer_update).await
    }

    /// Retrieves a customer by its ID
    fn get_customer(&self, customer_id: &str) -> Result<Customer> {
        self.customer_repository.get_by_id(customer_id)
    }

    /// Lists all customers
    fn list_customers(&self) -> Result<Vec<Customer>> {
        self.customer_repository.list()
    }
}
