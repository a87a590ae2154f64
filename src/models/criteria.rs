use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::errors::FilterError;
use crate::types::{CustomerId, Hour};

/// A selection list entry: either everything, or one specific value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection<T> {
    #[default]
    All,
    Specific(T)
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Specific(expected) => expected == value
        }
    }

    pub fn specific(&self) -> Option<&T> {
        match self {
            Selection::All => None,
            Selection::Specific(value) => Some(value)
        }
    }
}

impl<T: Ord> Selection<BTreeSet<T>> {
    /// Membership test for a multi-value selection.
    pub fn includes(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Specific(values) => values.contains(value)
        }
    }
}

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.start > self.end {
            return Err(FilterError::invalid_range(self));
        }

        Ok(())
    }
}

/// Inclusive range of invoice hours within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourRange {
    pub from: Hour,
    pub to: Hour
}

impl HourRange {
    pub fn new(from: Hour, to: Hour) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, hour: Hour) -> bool {
        self.from <= hour && hour <= self.to
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.from > self.to || self.to > 23 {
            return Err(FilterError::invalid_hour_range(self));
        }

        Ok(())
    }
}

/// Inclusive bounds on the number of distinct orders a customer placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderCountRange {
    pub min: usize,
    pub max: usize
}

impl OrderCountRange {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, orders: usize) -> bool {
        self.min <= orders && orders <= self.max
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.min == 0 || self.min > self.max {
            return Err(FilterError::invalid_order_count_range(self));
        }

        Ok(())
    }
}

/// The filter conditions selected for one query against a dataset view.
///
/// `customer` only narrows the identified-customers view, while
/// `include_returns` and `include_cancelled` only narrow the all-transactions view.
/// `breakdown_countries` and `order_count_range` never drop rows: they only
/// narrow the per-country revenue breakdown and the orders-per-customer histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub date_range: DateRange,
    pub country: Selection<String>,
    pub customer: Selection<CustomerId>,
    pub include_returns: bool,
    pub include_cancelled: bool,
    pub hour_range: Option<HourRange>,
    pub breakdown_countries: Selection<BTreeSet<String>>,
    pub order_count_range: Option<OrderCountRange>
}

impl FilterCriteria {
    /// Criteria selecting everything within `date_range`.
    pub fn new(date_range: DateRange) -> Self {
        Self {
            date_range,
            country: Selection::All,
            customer: Selection::All,
            include_returns: true,
            include_cancelled: true,
            hour_range: None,
            breakdown_countries: Selection::All,
            order_count_range: None
        }
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Selection::Specific(country.into());
        self
    }

    #[must_use]
    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer = Selection::Specific(customer_id);
        self
    }

    #[must_use]
    pub fn include_returns(mut self, include: bool) -> Self {
        self.include_returns = include;
        self
    }

    #[must_use]
    pub fn include_cancelled(mut self, include: bool) -> Self {
        self.include_cancelled = include;
        self
    }

    #[must_use]
    pub fn with_hour_range(mut self, hour_range: HourRange) -> Self {
        self.hour_range = Some(hour_range);
        self
    }

    #[must_use]
    pub fn with_breakdown_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        self.breakdown_countries = Selection::Specific(countries.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_order_count_range(mut self, order_count_range: OrderCountRange) -> Self {
        self.order_count_range = Some(order_count_range);
        self
    }

    /// Checks the ranges before any filtering work starts.
    pub fn validate(&self) -> Result<(), FilterError> {
        self.date_range.validate()?;

        if let Some(hour_range) = &self.hour_range {
            hour_range.validate()?;
        }

        if let Some(order_count_range) = &self.order_count_range {
            order_count_range.validate()?;
        }

        Ok(())
    }
}
