use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Derived totals for one customer, recomputed from its credit entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomerTotals {
    pub total_credit: Decimal,
    pub total_paid: Decimal,
    /// `total_credit - total_paid`, never floored at zero. A negative value
    /// signals an overpayment and is passed through unchanged.
    pub outstanding_balance: Decimal,
}

impl CustomerTotals {
    pub fn is_overpaid(&self) -> bool {
        self.outstanding_balance < Decimal::ZERO
    }
}

/// System-wide dashboard totals. Not persisted as its own entity; recomputed
/// on demand from the per-customer derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_customers: i64,
    pub total_credit_entries: i64,
    pub total_credit: Decimal,
    pub total_paid: Decimal,
    pub total_outstanding: Decimal,
}
