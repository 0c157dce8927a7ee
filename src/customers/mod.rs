// Module declarations
pub(crate) mod customers_errors;
pub(crate) mod customers_model;
pub(crate) mod customers_repository;
pub(crate) mod customers_service;
pub(crate) mod customers_traits;

// Re-export the public interface
pub use customers_errors::CustomerError;
pub use customers_model::{Customer, CustomerDB, CustomerUpdate, NewCustomer};
pub use customers_repository::CustomerRepository;
pub use customers_service::CustomerService;
pub use customers_traits::{CustomerRepositoryTrait, CustomerServiceTrait};
