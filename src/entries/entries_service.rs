use std::sync::Arc;

use super::entries_model::CreditEntry;
use super::entries_traits::{EntryRepositoryTrait, EntryServiceTrait};
use crate::Result;

/// Read-side service for credit entries
pub struct EntryService {
    entry_repository: Arc<dyn EntryRepositoryTrait>,
}

impl EntryService {
    /// Creates a new EntryService instance
    pub fn new(entry_repository: Arc<dyn EntryRepositoryTrait>) -> Self {
        Self { entry_repository }
    }
}

impl EntryServiceTrait for EntryService {
    /// Retrieves a credit entry by its ID
    fn get_entry(&self, entry_id: &str) -> Result<CreditEntry> {
        self.entry_repository.get_by_id(entry_id)
    }

    /// Retrieves a customer's entries, newest first
    fn get_entries_by_customer(&self, customer_id: &str) -> Result<Vec<CreditEntry>> {
        self.entry_repository.list_by_customer(customer_id)
    }
}
