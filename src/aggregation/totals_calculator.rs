use log::warn;
use rust_decimal::Decimal;

use crate::entries::CreditEntry;

use super::aggregation_model::CustomerTotals;

/// Calculates a customer's derived totals from its credit entries.
///
/// Pure summation over exact decimals; it carries no storage state and
/// recomputing with the same entries yields identical results bit-for-bit.
/// The outstanding balance is not floored: overpayment flows through so
/// callers can detect it.
#[derive(Debug, Clone, Default)]
pub struct TotalsCalculator;

impl TotalsCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate(&self, entries: &[CreditEntry]) -> CustomerTotals {
        let mut total_credit = Decimal::ZERO;
        let mut total_paid = Decimal::ZERO;

        for entry in entries {
            if entry.is_overpaid() {
                warn!(
                    "Entry {} has paid_amount {} above amount {}",
                    entry.id, entry.paid_amount, entry.amount
                );
            }
            total_credit += entry.amount;
            total_paid += entry.paid_amount;
        }

        CustomerTotals {
            total_credit,
            total_paid,
            outstanding_balance: total_credit - total_paid,
        }
    }
}
