use chrono::NaiveDate;
use thiserror::Error;

use crate::models::criteria::{DateRange, HourRange, OrderCountRange};
use crate::models::transaction::TransactionRow;
use crate::models::ViewKind;
use crate::types::{CustomerId, Hour, TimestampError};

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Date range start [{start}] is after its end [{end}]")]
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate
    },
    #[error("Hour range [{from}]-[{to}] is not a valid span of 0-23")]
    InvalidHourRange {
        from: Hour,
        to: Hour
    },
    #[error("Order count range [{min}]-[{max}] must start at 1 or more and not be inverted")]
    InvalidOrderCountRange {
        min: usize,
        max: usize
    },
    #[error("Country [{country}] is not present in the {view} view")]
    UnknownCountry {
        country: String,
        view: ViewKind
    },
    #[error("Customer [{customer_id}] is not present in the {view} view")]
    UnknownCustomer {
        customer_id: CustomerId,
        view: ViewKind
    }
}

impl FilterError {
    pub fn invalid_range(range: &DateRange) -> Self {
        Self::InvalidRange { start: range.start, end: range.end }
    }

    pub fn invalid_hour_range(range: &HourRange) -> Self {
        Self::InvalidHourRange { from: range.from, to: range.to }
    }

    pub fn invalid_order_count_range(range: &OrderCountRange) -> Self {
        Self::InvalidOrderCountRange { min: range.min, max: range.max }
    }

    pub fn unknown_country(country: &str, view: ViewKind) -> Self {
        Self::UnknownCountry { country: country.to_string(), view }
    }

    pub fn unknown_customer(customer_id: CustomerId, view: ViewKind) -> Self {
        Self::UnknownCustomer { customer_id, view }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unit price [{unit_price}] is not a decimal for invoice [{invoice_id}]:[{stock_code}]")]
    InvalidPrice {
        invoice_id: String,
        stock_code: String,
        unit_price: String
    },
    #[error("Unit price [{unit_price}] must be positive for invoice [{invoice_id}]:[{stock_code}]")]
    NonPositivePrice {
        invoice_id: String,
        stock_code: String,
        unit_price: String
    },
    #[error("Unit price [{unit_price}] exceeds the supported maximum for invoice [{invoice_id}]:[{stock_code}]")]
    PriceOutOfRange {
        invoice_id: String,
        stock_code: String,
        unit_price: String
    },
    #[error("Quantity [{quantity}] exceeds the supported magnitude for invoice [{invoice_id}]:[{stock_code}]")]
    QuantityOutOfRange {
        invoice_id: String,
        stock_code: String,
        quantity: i64
    },
    #[error("Invoice date is invalid for invoice [{invoice_id}]:[{stock_code}]: {source}")]
    InvalidTimestamp {
        invoice_id: String,
        stock_code: String,
        #[source]
        source: TimestampError
    },
    #[error("Customer id [{customer_id}] is invalid for invoice [{invoice_id}]:[{stock_code}]")]
    InvalidCustomer {
        invoice_id: String,
        stock_code: String,
        customer_id: String
    },
    #[error("Customer id is required in the {view} view for invoice [{invoice_id}]:[{stock_code}]")]
    CustomerRequired {
        invoice_id: String,
        stock_code: String,
        view: ViewKind
    }
}

impl IngestError {
    pub fn invalid_price(row: &TransactionRow) -> Self {
        Self::InvalidPrice {
            invoice_id: row.invoice_id.clone(),
            stock_code: row.stock_code.clone(),
            unit_price: row.unit_price.clone()
        }
    }

    pub fn non_positive_price(row: &TransactionRow) -> Self {
        Self::NonPositivePrice {
            invoice_id: row.invoice_id.clone(),
            stock_code: row.stock_code.clone(),
            unit_price: row.unit_price.clone()
        }
    }

    pub fn price_out_of_range(row: &TransactionRow) -> Self {
        Self::PriceOutOfRange {
            invoice_id: row.invoice_id.clone(),
            stock_code: row.stock_code.clone(),
            unit_price: row.unit_price.clone()
        }
    }

    pub fn quantity_out_of_range(row: &TransactionRow) -> Self {
        Self::QuantityOutOfRange {
            invoice_id: row.invoice_id.clone(),
            stock_code: row.stock_code.clone(),
            quantity: row.quantity
        }
    }

    pub fn invalid_timestamp(row: &TransactionRow, source: TimestampError) -> Self {
        Self::InvalidTimestamp {
            invoice_id: row.invoice_id.clone(),
            stock_code: row.stock_code.clone(),
            source
        }
    }

    pub fn invalid_customer(row: &TransactionRow) -> Self {
        Self::InvalidCustomer {
            invoice_id: row.invoice_id.clone(),
            stock_code: row.stock_code.clone(),
            customer_id: row.customer_id.clone().unwrap_or_default()
        }
    }

    pub fn customer_required(invoice_id: &str, stock_code: &str, view: ViewKind) -> Self {
        Self::CustomerRequired {
            invoice_id: invoice_id.to_string(),
            stock_code: stock_code.to_string(),
            view
        }
    }
}
