// Module declarations
pub(crate) mod entries_errors;
pub(crate) mod entries_model;
pub(crate) mod entries_repository;
pub(crate) mod entries_service;
pub(crate) mod entries_traits;

// Re-export the public interface
pub use entries_errors::EntryError;
pub use entries_model::{
    CreditEntry, CreditEntryDB, CreditEntryUpdate, NewCreditEntry, PaymentUpdate,
};
pub use entries_repository::EntryRepository;
pub use entries_service::EntryService;
pub use entries_traits::{EntryRepositoryTrait, EntryServiceTrait};
