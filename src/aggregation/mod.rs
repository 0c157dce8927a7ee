// Module declarations
pub(crate) mod aggregation_model;
pub(crate) mod aggregation_service;
pub(crate) mod aggregation_traits;
pub(crate) mod totals_calculator;


// Re-export the public interface
pub use aggregation_model::{CustomerTotals, DashboardSummary};
pub use aggregation_service::AggregationService;
pub use aggregation_traits::AggregationServiceTrait;
pub use totals_calculator::TotalsCalculator;
