use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::engine::metrics::{self, CustomerRanking, LoyaltyMetrics, NumericSummary, ProductRanking, Summary};
use crate::models::{FilterCriteria, FilterError, OrderCountRange, Selection, Transaction, ViewKind};
use crate::storage::Dataset;
use crate::types::{Hour, YearMonth};

/// Applies `criteria` to a dataset view.
///
/// The view is only borrowed; the result references the surviving rows and
/// computes every aggregate from them on demand, so repeated calls with the
/// same inputs always agree.
///
/// # Errors
/// Returns `FilterError` if the date or hour range is malformed. Nothing is
/// filtered in that case.
pub fn apply_filters<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> Result<FilteredResult<'a>, FilterError> {
    criteria.validate()?;

    let view = dataset.view();
    let mut rows: Vec<&Transaction> = dataset.transactions().iter().collect();

    rows.retain(|transaction| criteria.country.matches(&transaction.country));
    debug!("{} rows after country filter [{:?}]", rows.len(), criteria.country);

    if view == ViewKind::IdentifiedCustomers {
        rows.retain(|transaction| {
            transaction.customer_id.is_some_and(|customer_id| criteria.customer.matches(&customer_id))
        });
        debug!("{} rows after customer filter [{:?}]", rows.len(), criteria.customer);
    }

    rows.retain(|transaction| criteria.date_range.contains(transaction.invoice_date()));
    debug!("{} rows after date filter [{} to {}]", rows.len(), criteria.date_range.start, criteria.date_range.end);

    if view == ViewKind::AllTransactions {
        if !criteria.include_returns {
            rows.retain(|transaction| !transaction.is_return());
            debug!("{} rows after dropping returns", rows.len());
        }

        if !criteria.include_cancelled {
            rows.retain(|transaction| !transaction.is_cancelled());
            debug!("{} rows after dropping cancellations", rows.len());
        }
    }

    if let Some(hour_range) = &criteria.hour_range {
        rows.retain(|transaction| hour_range.contains(transaction.invoice_hour()));
        debug!("{} rows after hour filter [{}-{}]", rows.len(), hour_range.from, hour_range.to);
    }

    Ok(FilteredResult {
        view,
        rows,
        breakdown_countries: criteria.breakdown_countries.clone(),
        order_count_range: criteria.order_count_range
    })
}

/// The rows of one view surviving a set of criteria.
#[derive(Debug, Clone)]
pub struct FilteredResult<'a> {
    view: ViewKind,
    rows: Vec<&'a Transaction>,
    breakdown_countries: Selection<BTreeSet<String>>,
    order_count_range: Option<OrderCountRange>
}

impl<'a> FilteredResult<'a> {
    pub fn view(&self) -> ViewKind {
        self.view
    }

    /// Surviving rows in their original view order.
    pub fn rows(&self) -> &[&'a Transaction] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> Summary {
        metrics::summarize(&self.rows)
    }

    /// Count, mean, spread and quartiles of the numeric columns.
    pub fn describe(&self) -> Vec<NumericSummary> {
        metrics::describe(&self.rows)
    }

    pub fn monthly_revenue(&self) -> BTreeMap<YearMonth, Decimal> {
        let mut revenue = BTreeMap::new();

        for transaction in &self.rows {
            *revenue.entry(transaction.year_month()).or_insert(Decimal::ZERO) += transaction.total_price();
        }

        revenue
    }

    pub fn daily_revenue(&self) -> BTreeMap<NaiveDate, Decimal> {
        let mut revenue = BTreeMap::new();

        for transaction in &self.rows {
            *revenue.entry(transaction.invoice_date()).or_insert(Decimal::ZERO) += transaction.total_price();
        }

        revenue
    }

    /// Row count per invoice hour; hours without rows are absent.
    pub fn hourly_order_distribution(&self) -> BTreeMap<Hour, usize> {
        let mut distribution = BTreeMap::new();

        for transaction in &self.rows {
            *distribution.entry(transaction.invoice_hour()).or_insert(0) += 1;
        }

        distribution
    }

    /// Revenue per country, restricted to the breakdown countries of the criteria.
    pub fn revenue_by_country(&self) -> BTreeMap<String, Decimal> {
        let mut revenue = BTreeMap::new();

        for transaction in self.rows.iter().filter(|transaction| self.breakdown_countries.includes(&transaction.country)) {
            *revenue.entry(transaction.country.clone()).or_insert(Decimal::ZERO) += transaction.total_price();
        }

        revenue
    }

    pub fn top_products(&self, limit: usize) -> Vec<ProductRanking> {
        metrics::rank_products(&self.rows, limit)
    }

    /// `None` outside the identified-customers view.
    pub fn top_customers(&self, limit: usize) -> Option<Vec<CustomerRanking>> {
        (self.view == ViewKind::IdentifiedCustomers).then(|| metrics::rank_customers(&self.rows, limit))
    }

    /// `None` outside the identified-customers view.
    pub fn loyalty(&self) -> Option<LoyaltyMetrics> {
        (self.view == ViewKind::IdentifiedCustomers).then(|| metrics::loyalty_metrics(&self.rows, self.order_count_range))
    }
}
