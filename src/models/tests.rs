use super::{DateRange, FilterCriteria, FilterError, HourRange, IngestError, OrderCountRange, Selection, Transaction, TransactionRow};
use super::transaction::{MAX_ABS_QUANTITY, MAX_UNIT_PRICE};

use std::collections::BTreeSet;

use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn create_row(invoice_id: &str, quantity: i64, unit_price: &str, customer_id: Option<&str>) -> TransactionRow {
    TransactionRow {
        invoice_id: invoice_id.to_string(),
        stock_code: "85123A".to_string(),
        description: Some("WHITE HANGING HEART T-LIGHT HOLDER".to_string()),
        quantity,
        invoice_date: "2010-12-01 08:26:00".to_string(),
        unit_price: unit_price.to_string(),
        customer_id: customer_id.map(str::to_string),
        country: "United Kingdom".to_string()
    }
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| anyhow!("invalid date {year}-{month}-{day}"))
}

#[test]
fn test_valid_row_converts_with_derived_fields() -> Result<()> {
    let transaction = Transaction::try_from(create_row("536365", 6, "2.55", Some("17850")))?;

    assert_eq!(transaction.total_price(), Decimal::from_str("15.30")?);
    assert_eq!(transaction.customer_id, Some(17850));
    assert_eq!(transaction.year_month().to_string(), "2010-12");
    assert_eq!(transaction.invoice_hour(), 8);
    assert_eq!(transaction.invoice_date(), date(2010, 12, 1)?);
    assert!(!transaction.is_return());
    assert!(!transaction.is_cancelled());

    Ok(())
}

#[test]
fn test_negative_quantity_on_cancelled_invoice_is_a_cancelled_return() -> Result<()> {
    let transaction = Transaction::try_from(create_row("C536379", -1, "27.50", Some("14527")))?;

    assert!(transaction.is_return());
    assert!(transaction.is_cancelled());
    assert_eq!(transaction.total_price(), Decimal::from_str("-27.50")?);

    Ok(())
}

#[test]
fn test_float_rendered_customer_id_is_accepted() -> Result<()> {
    let transaction = Transaction::try_from(create_row("536365", 1, "1.00", Some("17850.0")))?;

    assert_eq!(transaction.customer_id, Some(17850));

    Ok(())
}

#[test]
fn test_missing_customer_id_is_anonymous() -> Result<()> {
    let empty = Transaction::try_from(create_row("536365", 1, "1.00", Some("  ")))?;
    let absent = Transaction::try_from(create_row("536365", 1, "1.00", None))?;

    assert_eq!(empty.customer_id, None);
    assert_eq!(absent.customer_id, None);

    Ok(())
}

#[test]
fn test_missing_description_defaults_to_empty() -> Result<()> {
    let mut row = create_row("536365", 1, "1.00", None);
    row.description = None;

    assert_eq!(Transaction::try_from(row)?.description, "");

    Ok(())
}

#[test]
fn test_non_positive_price_is_rejected() {
    let zero = Transaction::try_from(create_row("536365", 1, "0", None));
    let negative = Transaction::try_from(create_row("536365", 1, "-11062.06", None));

    assert!(matches!(zero, Err(IngestError::NonPositivePrice { .. })));
    assert!(matches!(negative, Err(IngestError::NonPositivePrice { .. })));
}

#[test]
fn test_malformed_values_are_rejected() {
    let price = Transaction::try_from(create_row("536365", 1, "abc", None));
    let customer = Transaction::try_from(create_row("536365", 1, "1.00", Some("17850.5")));

    let mut row = create_row("536365", 1, "1.00", None);
    row.invoice_date = "not a date".to_string();
    let timestamp = Transaction::try_from(row);

    assert!(matches!(price, Err(IngestError::InvalidPrice { .. })));
    assert!(matches!(customer, Err(IngestError::InvalidCustomer { .. })));
    assert!(matches!(timestamp, Err(IngestError::InvalidTimestamp { .. })));
}

#[test]
fn test_extreme_quantities_and_prices_are_rejected() {
    let huge_line = Transaction::try_from(create_row("536365", 9_000_000_000_000_000_000, "90000000000", None));
    let max_quantity = Transaction::try_from(create_row("536365", i64::MAX, "1.00", None));
    let min_quantity = Transaction::try_from(create_row("C536365", i64::MIN, "1.00", None));
    let huge_price = Transaction::try_from(create_row("536365", 1, "1000000000.01", None));

    assert!(matches!(huge_line, Err(IngestError::QuantityOutOfRange { .. })));
    assert!(matches!(max_quantity, Err(IngestError::QuantityOutOfRange { .. })));
    assert!(matches!(min_quantity, Err(IngestError::QuantityOutOfRange { .. })));
    assert!(matches!(huge_price, Err(IngestError::PriceOutOfRange { .. })));
}

#[test]
fn test_quantity_and_price_bounds_are_inclusive() -> Result<()> {
    let largest = Transaction::try_from(create_row("536365", MAX_ABS_QUANTITY, &MAX_UNIT_PRICE.to_string(), None))?;
    let largest_return = Transaction::try_from(create_row("C536365", -MAX_ABS_QUANTITY, "1.00", None))?;

    assert_eq!(largest.total_price(), Decimal::from(MAX_ABS_QUANTITY) * Decimal::from(MAX_UNIT_PRICE));
    assert!(largest_return.is_return());

    Ok(())
}

#[test]
fn test_selection_matches_everything_or_one_value() {
    let all: Selection<String> = Selection::All;
    let france = Selection::Specific("France".to_string());

    assert!(all.matches(&"Germany".to_string()));
    assert!(france.matches(&"France".to_string()));
    assert!(!france.matches(&"france".to_string()));
    assert_eq!(france.specific().map(String::as_str), Some("France"));
    assert_eq!(Selection::<u32>::from(None), Selection::All);
}

#[test]
fn test_country_set_selection_checks_membership() {
    let everything: Selection<BTreeSet<String>> = Selection::All;
    let chosen = Selection::Specific(BTreeSet::from(["France".to_string(), "EIRE".to_string()]));
    let nothing: Selection<BTreeSet<String>> = Selection::Specific(BTreeSet::new());

    assert!(everything.includes(&"Germany".to_string()));
    assert!(chosen.includes(&"EIRE".to_string()));
    assert!(!chosen.includes(&"Germany".to_string()));
    assert!(!nothing.includes(&"France".to_string()));
}

#[test]
fn test_date_range_is_inclusive_on_both_ends() -> Result<()> {
    let range = DateRange::new(date(2011, 1, 1)?, date(2011, 3, 31)?);

    assert!(range.contains(date(2011, 1, 1)?));
    assert!(range.contains(date(2011, 3, 31)?));
    assert!(!range.contains(date(2010, 12, 31)?));
    assert!(!range.contains(date(2011, 4, 1)?));

    Ok(())
}

#[test]
fn test_inverted_date_range_fails_validation() -> Result<()> {
    let criteria = FilterCriteria::new(DateRange::new(date(2011, 3, 1)?, date(2011, 1, 1)?));

    assert!(matches!(criteria.validate(), Err(FilterError::InvalidRange { .. })));

    Ok(())
}

#[test]
fn test_single_day_range_is_valid() -> Result<()> {
    let criteria = FilterCriteria::new(DateRange::new(date(2011, 3, 1)?, date(2011, 3, 1)?));

    assert!(criteria.validate().is_ok());

    Ok(())
}

#[test]
fn test_invalid_hour_ranges_fail_validation() -> Result<()> {
    let range = DateRange::new(date(2011, 1, 1)?, date(2011, 1, 31)?);

    let inverted = FilterCriteria::new(range).with_hour_range(HourRange::new(18, 8));
    let overflowing = FilterCriteria::new(range).with_hour_range(HourRange::new(8, 24));
    let valid = FilterCriteria::new(range).with_hour_range(HourRange::new(0, 23));

    assert!(matches!(inverted.validate(), Err(FilterError::InvalidHourRange { .. })));
    assert!(matches!(overflowing.validate(), Err(FilterError::InvalidHourRange { .. })));
    assert!(valid.validate().is_ok());

    Ok(())
}

#[test]
fn test_order_count_ranges_must_start_at_one_and_not_be_inverted() -> Result<()> {
    let range = DateRange::new(date(2011, 1, 1)?, date(2011, 1, 31)?);

    let from_zero = FilterCriteria::new(range).with_order_count_range(OrderCountRange::new(0, 20));
    let inverted = FilterCriteria::new(range).with_order_count_range(OrderCountRange::new(20, 1));
    let valid = FilterCriteria::new(range).with_order_count_range(OrderCountRange::new(1, 100));

    assert!(matches!(from_zero.validate(), Err(FilterError::InvalidOrderCountRange { .. })));
    assert!(matches!(inverted.validate(), Err(FilterError::InvalidOrderCountRange { .. })));
    assert!(valid.validate().is_ok());
    assert!(OrderCountRange::new(1, 20).contains(20));
    assert!(!OrderCountRange::new(1, 20).contains(21));

    Ok(())
}

#[test]
fn test_criteria_defaults_include_everything() -> Result<()> {
    let criteria = FilterCriteria::new(DateRange::new(date(2011, 1, 1)?, date(2011, 1, 31)?));

    assert_eq!(criteria.country, Selection::All);
    assert_eq!(criteria.customer, Selection::All);
    assert!(criteria.include_returns);
    assert!(criteria.include_cancelled);
    assert!(criteria.hour_range.is_none());
    assert_eq!(criteria.breakdown_countries, Selection::All);
    assert!(criteria.order_count_range.is_none());

    Ok(())
}
