use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::DECIMAL_PRECISION;
use crate::customers::Customer;
use crate::{errors::ValidationError, Error, Result};

/// Domain model representing a single credit entry (a debt a customer owes).
///
/// `paid_amount` records the settled portion as a plain numeric fact. It may
/// exceed `amount`; that is an overpayment anomaly the aggregation engine
/// passes through, not a rejected state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditEntry {
    pub id: String,
    pub customer_id: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub entry_date: DateTime<Utc>,
    /// Opaque attachment blob (receipt/bill image); never parsed by the core.
    pub image_data: Option<String>,
    pub is_paid: bool,
    pub paid_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreditEntry {
    pub fn is_overpaid(&self) -> bool {
        self.paid_amount > self.amount
    }

    pub fn outstanding(&self) -> Decimal {
        self.amount - self.paid_amount
    }
}

/// Database model for credit entries
#[derive(
    Queryable,
    Selectable,
    Identifiable,
    Associations,
    Insertable,
    AsChangeset,
    PartialEq,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::credit_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(belongs_to(Customer))]
pub struct CreditEntryDB {
    pub id: String,
    pub customer_id: String,
    // Decimals are stored as TEXT
    pub amount: String,
    pub description: Option<String>,
    pub entry_date: NaiveDateTime,
    pub image_data: Option<String>,
    pub is_paid: bool,
    pub paid_amount: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new credit entry
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewCreditEntry {
    pub id: Option<String>,
    pub customer_id: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub entry_date: DateTime<Utc>,
    pub image_data: Option<String>,
}

impl NewCreditEntry {
    /// Validates the new entry data
    pub fn validate(&self) -> Result<()> {
        if self.customer_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "customer_id".to_string(),
            )));
        }
        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Credit amount must be greater than zero".to_string(),
            )));
        }
        Ok(())
    }
}

/// Input model for updating an existing credit entry. Only supplied fields
/// are changed; `customer_id` is immutable (entries are never reparented).
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreditEntryUpdate {
    pub id: String,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub entry_date: Option<DateTime<Utc>>,
    pub image_data: Option<String>,
}

impl CreditEntryUpdate {
    /// Validates the entry update data
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if let Some(new_amount) = self.amount {
            if new_amount <= Decimal::ZERO {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Credit amount must be greater than zero".to_string(),
                )));
            }
        }
        Ok(())
    }

    /// Applies the supplied fields onto an existing DB row
    pub fn apply_to(&self, existing: &mut CreditEntryDB) {
        if let Some(new_amount) = self.amount {
            existing.amount = new_amount.round_dp(DECIMAL_PRECISION).to_string();
        }
        if let Some(new_description) = &self.description {
            existing.description = Some(new_description.clone());
        }
        if let Some(new_date) = self.entry_date {
            existing.entry_date = new_date.naive_utc();
        }
        if let Some(new_image) = &self.image_data {
            existing.image_data = Some(new_image.clone());
        }
        existing.updated_at = chrono::Utc::now().naive_utc();
    }
}

/// Input model for a payment-status transition
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    pub is_paid: bool,
    pub paid_amount: Decimal,
}

impl PaymentUpdate {
    /// Validates the payment update. A `paid_amount` above the entry amount
    /// is deliberately accepted; only negative values are rejected.
    pub fn validate(&self) -> Result<()> {
        if self.paid_amount < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Paid amount cannot be negative".to_string(),
            )));
        }
        Ok(())
    }
}

// Conversion implementations
impl From<CreditEntryDB> for CreditEntry {
    fn from(db: CreditEntryDB) -> Self {
        Self {
            id: db.id,
            customer_id: db.customer_id,
            amount: Decimal::from_str(&db.amount).unwrap_or_default(),
            description: db.description,
            entry_date: Utc.from_utc_datetime(&db.entry_date),
            image_data: db.image_data,
            is_paid: db.is_paid,
            paid_amount: Decimal::from_str(&db.paid_amount).unwrap_or_default(),
            created_at: Utc.from_utc_datetime(&db.created_at),
            updated_at: Utc.from_utc_datetime(&db.updated_at),
        }
    }
}

impl From<NewCreditEntry> for CreditEntryDB {
    fn from(domain: NewCreditEntry) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            customer_id: domain.customer_id,
            amount: domain.amount.round_dp(DECIMAL_PRECISION).to_string(),
            description: domain.description,
            entry_date: domain.entry_date.naive_utc(),
            image_data: domain.image_data,
            is_paid: false,
            paid_amount: Decimal::ZERO.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
