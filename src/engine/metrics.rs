use std::collections::{BTreeMap, HashSet};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{OrderCountRange, Transaction};
use crate::types::CustomerId;

/// Headline figures over a filtered row set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub row_count: usize,
    pub order_count: usize,
    pub item_count: i64,
    pub product_count: usize,
    pub country_count: usize,
    pub total_revenue: Decimal
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRanking {
    pub stock_code: String,
    pub description: String,
    pub quantity: i64,
    pub revenue: Decimal
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRanking {
    pub customer_id: CustomerId,
    pub revenue: Decimal,
    pub orders: usize
}

/// Customer-level aggregates, all zero when no customer is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoyaltyMetrics {
    pub customer_count: usize,
    /// Percentage of customers with more than one distinct invoice.
    pub repeat_customer_rate: Decimal,
    pub avg_orders_per_customer: Decimal,
    pub avg_customer_lifetime_value: Decimal,
    /// Mean over customers of their spend divided by their order count.
    pub avg_basket_value: Decimal,
    /// Number of customers having placed exactly `k` orders, keyed by `k`.
    /// Only `k` within the requested order-count range are kept.
    pub orders_per_customer_distribution: BTreeMap<usize, usize>
}

/// Count, mean, sample standard deviation, extremes and quartiles of one numeric column.
///
/// Quartiles interpolate linearly between the closest ranks. Statistics that
/// cannot be computed (an empty column, or the deviation of a single value) are zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericSummary {
    pub column: &'static str,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64
}

impl NumericSummary {
    /// Statistic labels paired with their values, in display order.
    pub fn statistics(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.median),
            ("75%", self.q75),
            ("max", self.max)
        ]
    }
}

#[derive(Default)]
struct CustomerTotals<'a> {
    invoices: HashSet<&'a str>,
    spent: Decimal
}

pub(crate) fn summarize(rows: &[&Transaction]) -> Summary {
    let mut invoices = HashSet::new();
    let mut products = HashSet::new();
    let mut countries = HashSet::new();
    let mut summary = Summary { row_count: rows.len(), ..Summary::default() };

    for transaction in rows {
        invoices.insert(transaction.invoice_id.as_str());
        products.insert(transaction.description.as_str());
        countries.insert(transaction.country.as_str());
        summary.item_count += transaction.quantity;
        summary.total_revenue += transaction.total_price();
    }

    summary.order_count = invoices.len();
    summary.product_count = products.len();
    summary.country_count = countries.len();

    summary
}

/// Ranks products by quantity sold, then revenue, then stock code.
pub(crate) fn rank_products(rows: &[&Transaction], limit: usize) -> Vec<ProductRanking> {
    let mut totals: BTreeMap<(&str, &str), (i64, Decimal)> = BTreeMap::new();

    for transaction in rows {
        let entry = totals
            .entry((transaction.stock_code.as_str(), transaction.description.as_str()))
            .or_default();

        entry.0 += transaction.quantity;
        entry.1 += transaction.total_price();
    }

    let mut rankings: Vec<ProductRanking> = totals.into_iter()
        .map(|((stock_code, description), (quantity, revenue))| ProductRanking {
            stock_code: stock_code.to_string(),
            description: description.to_string(),
            quantity,
            revenue
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.quantity.cmp(&a.quantity)
            .then_with(|| b.revenue.cmp(&a.revenue))
            .then_with(|| a.stock_code.cmp(&b.stock_code))
            .then_with(|| a.description.cmp(&b.description))
    });

    rankings.truncate(limit);
    rankings
}

/// Ranks customers by revenue, then customer id.
pub(crate) fn rank_customers(rows: &[&Transaction], limit: usize) -> Vec<CustomerRanking> {
    let mut rankings: Vec<CustomerRanking> = customer_totals(rows).into_iter()
        .map(|(customer_id, totals)| CustomerRanking {
            customer_id,
            revenue: totals.spent,
            orders: totals.invoices.len()
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.revenue.cmp(&a.revenue)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });

    rankings.truncate(limit);
    rankings
}

pub(crate) fn loyalty_metrics(rows: &[&Transaction], order_count_range: Option<OrderCountRange>) -> LoyaltyMetrics {
    let totals = customer_totals(rows);

    if totals.is_empty() {
        return LoyaltyMetrics::default();
    }

    let customers = Decimal::from(totals.len());
    let mut repeat_customers = 0usize;
    let mut orders = 0usize;
    let mut spent = Decimal::ZERO;
    let mut baskets = Decimal::ZERO;
    let mut distribution = BTreeMap::new();

    for customer in totals.values() {
        let invoice_count = customer.invoices.len();

        if invoice_count > 1 {
            repeat_customers += 1;
        }

        orders += invoice_count;
        spent += customer.spent;
        // Every customer present has at least one invoice
        baskets += customer.spent / Decimal::from(invoice_count);

        if order_count_range.is_none_or(|range| range.contains(invoice_count)) {
            *distribution.entry(invoice_count).or_insert(0) += 1;
        }
    }

    LoyaltyMetrics {
        customer_count: totals.len(),
        repeat_customer_rate: Decimal::from(repeat_customers) * Decimal::ONE_HUNDRED / customers,
        avg_orders_per_customer: Decimal::from(orders) / customers,
        avg_customer_lifetime_value: spent / customers,
        avg_basket_value: baskets / customers,
        orders_per_customer_distribution: distribution
    }
}

pub(crate) fn describe(rows: &[&Transaction]) -> Vec<NumericSummary> {
    vec![
        summarize_column("Quantity", rows.iter().map(|transaction| transaction.quantity as f64).collect()),
        summarize_column("UnitPrice", rows.iter().map(|transaction| to_f64(transaction.unit_price)).collect()),
        summarize_column("TotalPrice", rows.iter().map(|transaction| to_f64(transaction.total_price())).collect()),
        summarize_column("InvoiceHour", rows.iter().map(|transaction| f64::from(transaction.invoice_hour())).collect())
    ]
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn summarize_column(column: &'static str, mut values: Vec<f64>) -> NumericSummary {
    if values.is_empty() {
        return NumericSummary { column, ..NumericSummary::default() };
    }

    values.sort_by(f64::total_cmp);

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let squares: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
        (squares / (count - 1) as f64).sqrt()
    } else {
        0.0
    };

    NumericSummary {
        column,
        count,
        mean,
        std,
        min: values[0],
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values[count - 1]
    }
}

//NOTE: `sorted` must be non-empty and ascending
fn quantile(sorted: &[f64], fraction: f64) -> f64 {
    let position = fraction * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;

    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

fn customer_totals<'a>(rows: &[&'a Transaction]) -> BTreeMap<CustomerId, CustomerTotals<'a>> {
    let mut totals: BTreeMap<CustomerId, CustomerTotals<'a>> = BTreeMap::new();

    for &transaction in rows {
        let Some(customer_id) = transaction.customer_id else {
            continue;
        };

        let customer = totals.entry(customer_id).or_default();
        customer.invoices.insert(transaction.invoice_id.as_str());
        customer.spent += transaction.total_price();
    }

    totals
}
