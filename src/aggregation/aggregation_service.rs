use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use crate::customers::CustomerRepositoryTrait;
use crate::db::{get_connection, DbPool};
use crate::entries::EntryRepositoryTrait;
use crate::Result;

use super::aggregation_model::{CustomerTotals, DashboardSummary};
use super::aggregation_traits::AggregationServiceTrait;
use super::totals_calculator::TotalsCalculator;

/// The aggregation engine. Recomputes a customer's derived totals from its
/// entries and persists them, and rolls the persisted per-customer fields up
/// into the dashboard summary.
pub struct AggregationService {
    pool: Arc<DbPool>,
    customer_repository: Arc<dyn CustomerRepositoryTrait>,
    entry_repository: Arc<dyn EntryRepositoryTrait>,
    calculator: TotalsCalculator,
}

impl AggregationService {
    /// Creates a new AggregationService instance
    pub fn new(
        pool: Arc<DbPool>,
        customer_repository: Arc<dyn CustomerRepositoryTrait>,
        entry_repository: Arc<dyn EntryRepositoryTrait>,
    ) -> Self {
        Self {
            pool,
            customer_repository,
            entry_repository,
            calculator: TotalsCalculator::new(),
        }
    }
}

#[async_trait::async_trait]
impl AggregationServiceTrait for AggregationService {
    /// Recomputes one customer's totals as a standalone transaction
    async fn recompute_customer(&self, customer_id: &str) -> Result<CustomerTotals> {
        let mut conn = get_connection(&self.pool)?;
        conn.transaction(|tx_conn| self.recompute_customer_with_conn(tx_conn, customer_id))
    }

    /// Recomputes one customer's totals inside an ongoing transaction.
    /// Touches only that customer's entries, never the full entry set.
    fn recompute_customer_with_conn(
        &self,
        conn: &mut SqliteConnection,
        customer_id: &str,
    ) -> Result<CustomerTotals> {
        let entries = self
            .entry_repository
            .list_by_customer_with_conn(conn, customer_id)?;
        let totals = self.calculator.calculate(&entries);

        debug!(
            "Recomputed totals for customer {}: credit={} paid={} outstanding={}",
            customer_id, totals.total_credit, totals.total_paid, totals.outstanding_balance
        );

        self.customer_repository
            .save_totals_with_conn(conn, customer_id, &totals)?;

        Ok(totals)
    }

    /// Recomputes the dashboard from the already-persisted per-customer
    /// derived fields. Entries are only touched for the overall count, never
    /// re-summed, so each customer's row stays the single source of truth.
    fn recompute_dashboard(&self) -> Result<DashboardSummary> {
        let customers = self.customer_repository.list()?;
        let total_credit_entries = self.entry_repository.count()?;

        let mut summary = DashboardSummary {
            total_customers: customers.len() as i64,
            total_credit_entries,
            ..Default::default()
        };

        for customer in &customers {
            summary.total_credit += customer.total_credit;
            summary.total_paid += customer.total_paid;
            summary.total_outstanding += customer.outstanding_balance;
        }

        Ok(summary)
    }
}
