pub(crate) mod ledger_service;

pub use ledger_service::LedgerService;
