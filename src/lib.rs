pub mod db;

pub mod aggregation;
pub mod customers;
pub mod entries;
pub mod ledger;

pub mod constants;
pub mod errors;
pub mod schema;

pub use errors::{Error, Result};
pub use ledger::LedgerService;
