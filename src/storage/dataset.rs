use std::collections::BTreeSet;

use crate::models::{DateRange, IngestError, Transaction, ViewKind};
use crate::types::CustomerId;

/// An immutable, loaded view over the transaction population.
#[derive(Debug)]
pub struct Dataset {
    view: ViewKind,
    transactions: Vec<Transaction>
}

impl Dataset {
    /// Wraps validated transactions as a view.
    ///
    /// # Errors
    /// Returns `IngestError::CustomerRequired` if the identified-customers view
    /// is given a transaction without a customer id.
    pub fn new(view: ViewKind, transactions: Vec<Transaction>) -> Result<Self, IngestError> {
        if view == ViewKind::IdentifiedCustomers {
            if let Some(anonymous) = transactions.iter().find(|transaction| transaction.customer_id.is_none()) {
                return Err(IngestError::customer_required(&anonymous.invoice_id, &anonymous.stock_code, view));
            }
        }

        Ok(Self { view, transactions })
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Distinct countries, sorted, as offered in a selection list.
    pub fn countries(&self) -> Vec<&str> {
        self.transactions.iter()
            .map(|transaction| transaction.country.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct customer ids, sorted.
    pub fn customers(&self) -> Vec<CustomerId> {
        self.transactions.iter()
            .filter_map(|transaction| transaction.customer_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn contains_country(&self, country: &str) -> bool {
        self.transactions.iter().any(|transaction| transaction.country == country)
    }

    pub fn contains_customer(&self, customer_id: CustomerId) -> bool {
        self.transactions.iter().any(|transaction| transaction.customer_id == Some(customer_id))
    }

    /// The first and last invoice days, or `None` for an empty view.
    pub fn date_span(&self) -> Option<DateRange> {
        let start = self.transactions.iter().map(Transaction::invoice_date).min()?;
        let end = self.transactions.iter().map(Transaction::invoice_date).max()?;

        Some(DateRange::new(start, end))
    }
}
