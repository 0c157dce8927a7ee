use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{errors::ValidationError, Error, Result};

/// Domain model representing a customer in the system.
///
/// The three balance fields are derived from the customer's credit entries
/// and are only ever written by the aggregation engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub total_credit: Decimal,
    pub total_paid: Decimal,
    pub outstanding_balance: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Customer {
    /// A negative outstanding balance signals an overpayment. It is passed
    /// through as-is so callers can flag it.
    pub fn is_overpaid(&self) -> bool {
        self.outstanding_balance < Decimal::ZERO
    }
}

/// Input model for creating a new customer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl NewCustomer {
    /// Validates the new customer data
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Customer name cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

/// Input model for updating an existing customer.
///
/// Carries identity fields only; the derived balance fields cannot be
/// supplied by callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdate {
    pub id: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl CustomerUpdate {
    /// Validates the customer update data
    pub fn validate(&self) -> Result<()> {
        if self.id.is_none() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Customer ID is required for updates".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Customer name cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

/// Database model for customers
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::customers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CustomerDB {
    #[diesel(column_name = id)]
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    // Decimals are stored as TEXT
    pub total_credit: String,
    pub total_paid: String,
    pub outstanding_balance: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// Conversion implementations
impl From<CustomerDB> for Customer {
    fn from(db: CustomerDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            phone: db.phone,
            address: db.address,
            total_credit: Decimal::from_str(&db.total_credit).unwrap_or_default(),
            total_paid: Decimal::from_str(&db.total_paid).unwrap_or_default(),
            outstanding_balance: Decimal::from_str(&db.outstanding_balance).unwrap_or_default(),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewCustomer> for CustomerDB {
    fn from(domain: NewCustomer) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            name: domain.name,
            phone: domain.phone,
            address: domain.address,
            total_credit: Decimal::ZERO.to_string(),
            total_paid: Decimal::ZERO.to_string(),
            outstanding_balance: Decimal::ZERO.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
