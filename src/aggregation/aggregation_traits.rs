use async_trait::async_trait;
use diesel::sqlite::SqliteConnection;

use super::aggregation_model::{CustomerTotals, DashboardSummary};
use crate::errors::Result;

/// Trait defining the contract for the aggregation engine.
#[async_trait]
pub trait AggregationServiceTrait: Send + Sync {
    /// Recomputes one customer's totals in its own transaction.
    async fn recompute_customer(&self, customer_id: &str) -> Result<CustomerTotals>;

    /// Recomputes one customer's totals inside an ongoing transaction, so a
    /// mutation and its recompute commit as one unit.
    fn recompute_customer_with_conn(
        &self,
        conn: &mut SqliteConnection,
        customer_id: &str,
    ) -> Result<CustomerTotals>;

    /// Recomputes the dashboard totals from the persisted per-customer
    /// derived fields.
    fn recompute_dashboard(&self) -> Result<DashboardSummary>;
}
