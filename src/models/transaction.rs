use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

use crate::models::errors::IngestError;
use crate::types::{parse_timestamp, CustomerId, Hour, YearMonth};

/// Invoice numbers starting with this marker belong to cancelled orders.
pub const CANCELLED_MARKER: char = 'C';

//NOTE: Bounds keep every line total and every aggregate over a realistic extract inside Decimal and i64
pub const MAX_ABS_QUANTITY: i64 = 1_000_000_000;
pub const MAX_UNIT_PRICE: i64 = 1_000_000_000;

/// Represents a single row from one of the transaction extracts.
///
/// Only the base columns are read; derived columns written by the cleaning
/// notebook (`TotalPrice`, `IsReturn`, ...) are ignored and recomputed by
/// [`Transaction`] so that every view derives them the same way.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRow {
    #[serde(rename = "InvoiceNo")]
    pub invoice_id: String,
    #[serde(rename = "StockCode")]
    pub stock_code: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    #[serde(rename = "InvoiceDate")]
    pub invoice_date: String,
    #[serde(rename = "UnitPrice")]
    pub unit_price: String,
    /// Empty for anonymous transactions. Pandas writes the column as a float (`17850.0`).
    #[serde(rename = "CustomerID", default)]
    pub customer_id: Option<String>,
    #[serde(rename = "Country")]
    pub country: String
}

/// A validated transaction line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub invoice_id: String,
    pub stock_code: String,
    pub description: String,
    /// Negative quantities are returns.
    pub quantity: i64,
    /// Always strictly positive once ingested.
    pub unit_price: Decimal,
    pub invoice_timestamp: NaiveDateTime,
    pub customer_id: Option<CustomerId>,
    pub country: String
}

impl Transaction {
    pub fn total_price(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }

    pub fn is_return(&self) -> bool {
        self.quantity < 0
    }

    pub fn is_cancelled(&self) -> bool {
        self.invoice_id.starts_with(CANCELLED_MARKER)
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth::from(self.invoice_timestamp)
    }

    pub fn invoice_hour(&self) -> Hour {
        // hour() is always within 0..=23
        self.invoice_timestamp.hour() as Hour
    }

    pub fn invoice_date(&self) -> NaiveDate {
        self.invoice_timestamp.date()
    }
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = IngestError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        if !(-MAX_ABS_QUANTITY..=MAX_ABS_QUANTITY).contains(&row.quantity) {
            return Err(IngestError::quantity_out_of_range(&row));
        }

        let unit_price = Decimal::from_str(row.unit_price.trim())
            .map_err(|_| IngestError::invalid_price(&row))?;

        if unit_price <= Decimal::ZERO {
            return Err(IngestError::non_positive_price(&row));
        }

        if unit_price > Decimal::from(MAX_UNIT_PRICE) {
            return Err(IngestError::price_out_of_range(&row));
        }

        let invoice_timestamp = parse_timestamp(&row.invoice_date)
            .map_err(|error| IngestError::invalid_timestamp(&row, error))?;

        let customer_id = parse_customer_id(row.customer_id.as_deref())
            .ok_or_else(|| IngestError::invalid_customer(&row))?;

        Ok(Self {
            invoice_id: row.invoice_id,
            stock_code: row.stock_code,
            description: row.description.unwrap_or_default(),
            quantity: row.quantity,
            unit_price,
            invoice_timestamp,
            customer_id,
            country: row.country
        })
    }
}

/// Returns `None` when the value is present but not a customer number.
fn parse_customer_id(value: Option<&str>) -> Option<Option<CustomerId>> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Some(None);
    };

    let digits = value.strip_suffix(".0").unwrap_or(value);

    digits.parse::<CustomerId>().ok().map(Some)
}
