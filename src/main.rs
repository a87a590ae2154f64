mod engine;
mod export;
mod models;
mod storage;
mod types;

use std::fmt::Display;
use std::fs::{create_dir_all, File};
use std::io::{stderr, stdout, BufWriter, StdoutLock, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use csv::Writer;
use rust_decimal::Decimal;
use tracing::{info, warn};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::engine::{FilteredResult, Session, SessionConfig};
use crate::export::{export_rows, export_top_customers, export_top_products};
use crate::models::{DateRange, FilterCriteria, HourRange, OrderCountRange, ViewKind};
use crate::storage::{Dataset, DatasetProfile, DatasetStorage, Encoding};
use crate::types::{CustomerId, Hour};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ViewArg {
    /// Every cleaned transaction
    All,
    /// Only transactions with a customer id
    Clients
}

impl From<ViewArg> for ViewKind {
    fn from(value: ViewArg) -> Self {
        match value {
            ViewArg::All => ViewKind::AllTransactions,
            ViewArg::Clients => ViewKind::IdentifiedCustomers
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum EncodingArg {
    Utf8,
    /// ISO-8859-1, as written by the original export
    Latin1
}

impl From<EncodingArg> for Encoding {
    fn from(value: EncodingArg) -> Self {
        match value {
            EncodingArg::Utf8 => Encoding::Utf8,
            EncodingArg::Latin1 => Encoding::Latin1
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "retail-insights", version, about = "Filter an e-commerce transaction log and summarise it")]
struct Cli {
    /// Cleaned extract holding every transaction
    #[arg(long = "all")]
    all: PathBuf,

    /// Cleaned extract holding only identified customers
    #[arg(long = "clients")]
    clients: PathBuf,

    /// Raw export, profiled only
    #[arg(long = "raw")]
    raw: Option<PathBuf>,

    /// Character encoding of the raw export
    #[arg(long, value_enum, default_value_t = EncodingArg::Latin1)]
    raw_encoding: EncodingArg,

    /// View to query
    #[arg(long, value_enum, default_value_t = ViewArg::All)]
    view: ViewArg,

    /// First day to include (YYYY-MM-DD), defaults to the first day of the view
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD), defaults to the last day of the view
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Exact country name
    #[arg(long)]
    country: Option<String>,

    /// Customer id, clients view only
    #[arg(long)]
    customer: Option<CustomerId>,

    /// Drop returned lines, all view only
    #[arg(long)]
    exclude_returns: bool,

    /// Drop cancelled invoices, all view only
    #[arg(long)]
    exclude_cancelled: bool,

    /// Invoice hours to keep, e.g. 8-18
    #[arg(long, value_parser = parse_hour_range)]
    hours: Option<HourRange>,

    /// Countries kept in the revenue-by-country breakdown, comma separated
    #[arg(long, value_delimiter = ',')]
    breakdown_countries: Vec<String>,

    /// Order counts kept in the orders-per-customer histogram, e.g. 1-20
    #[arg(long, value_parser = parse_order_count_range)]
    orders: Option<OrderCountRange>,

    /// Length of the product and customer rankings
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Fail on a country or customer the view does not contain
    #[arg(long)]
    strict: bool,

    /// Directory receiving the filtered rows and rankings as CSV
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Print the countries, customers and date span of the view instead of a report
    #[arg(long)]
    list: bool,

    /// Logging verbosity, written to stderr
    #[arg(long, value_enum, default_value_t = LogLevel::Error)]
    log_level: LogLevel
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(LevelFilter::from(cli.log_level));

    let storage = DatasetStorage::new();
    let config = SessionConfig {
        all_transactions: cli.all.clone(),
        identified_customers: cli.clients.clone(),
        raw_export: cli.raw.clone(),
        raw_encoding: Encoding::from(cli.raw_encoding)
    };

    let timer = Instant::now();
    let session = Session::open(&config, &storage)?;
    info!("Loaded session in: {:?}", timer.elapsed());

    let view = ViewKind::from(cli.view);

    if cli.list {
        return write_selection_lists_to_stdout(session.view(view));
    }

    let criteria = build_criteria(&cli, &session, view);

    if cli.strict {
        session.validate(view, &criteria)?;
    }

    let timer = Instant::now();
    let result = session.apply_filters(view, &criteria)?;
    info!("Kept {} of {} rows in: {:?}", result.len(), session.view(view).len(), timer.elapsed());

    if result.is_empty() {
        warn!("No transaction of the {view} view matches the criteria");
    }

    write_report_to_stdout(&result, cli.top, session.raw_profile())?;

    if let Some(directory) = &cli.export_dir {
        export_to_directory(directory, &result, cli.top)?;
    }

    Ok(())
}

fn setup_logging(level: LevelFilter) {
    //NOTE: stdout carries the report, so logging goes to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

fn parse_hour_range(value: &str) -> Result<HourRange, String> {
    let (from, to) = value.split_once('-')
        .ok_or_else(|| format!("expected FROM-TO, got [{value}]"))?;

    let from: Hour = from.trim().parse().map_err(|error| format!("invalid start hour [{from}]: {error}"))?;
    let to: Hour = to.trim().parse().map_err(|error| format!("invalid end hour [{to}]: {error}"))?;

    Ok(HourRange::new(from, to))
}

fn parse_order_count_range(value: &str) -> Result<OrderCountRange, String> {
    let (min, max) = value.split_once('-')
        .ok_or_else(|| format!("expected MIN-MAX, got [{value}]"))?;

    let min: usize = min.trim().parse().map_err(|error| format!("invalid minimum order count [{min}]: {error}"))?;
    let max: usize = max.trim().parse().map_err(|error| format!("invalid maximum order count [{max}]: {error}"))?;

    Ok(OrderCountRange::new(min, max))
}

fn build_criteria(cli: &Cli, session: &Session, view: ViewKind) -> FilterCriteria {
    let defaults = session.default_criteria(view).date_range;
    let range = DateRange::new(cli.from.unwrap_or(defaults.start), cli.to.unwrap_or(defaults.end));

    let mut criteria = FilterCriteria::new(range)
        .include_returns(!cli.exclude_returns)
        .include_cancelled(!cli.exclude_cancelled);

    if let Some(country) = &cli.country {
        criteria = criteria.with_country(country.as_str());
    }

    if let Some(customer_id) = cli.customer {
        criteria = criteria.with_customer(customer_id);
    }

    if let Some(hour_range) = cli.hours {
        criteria = criteria.with_hour_range(hour_range);
    }

    if !cli.breakdown_countries.is_empty() {
        criteria = criteria.with_breakdown_countries(cli.breakdown_countries.iter().map(String::as_str));
    }

    if let Some(order_count_range) = cli.orders {
        criteria = criteria.with_order_count_range(order_count_range);
    }

    criteria
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

struct Report<W: Write> {
    output: Writer<W>
}

impl<W: Write> Report<W> {
    fn line(&mut self, section: &str, key: impl Display, value: impl Display) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();

        self.output.write_record([section, key.as_str(), value.as_str()])?;

        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        self.output.flush()?;
        Ok(())
    }
}

fn stdout_report() -> Report<BufWriter<StdoutLock<'static>>> {
    Report {
        output: Writer::from_writer(BufWriter::new(stdout().lock()))
    }
}

fn write_report_to_stdout(result: &FilteredResult<'_>, top: usize, raw_profile: Option<&DatasetProfile>) -> Result<()> {
    let mut report = stdout_report();

    report.line("section", "key", "value")?;

    let summary = result.summary();

    report.line("summary", "view", result.view())?;
    report.line("summary", "rows", summary.row_count)?;
    report.line("summary", "orders", summary.order_count)?;
    report.line("summary", "items", summary.item_count)?;
    report.line("summary", "products", summary.product_count)?;
    report.line("summary", "countries", summary.country_count)?;
    report.line("summary", "total_revenue", money(summary.total_revenue))?;

    for column in result.describe() {
        for (statistic, value) in column.statistics() {
            report.line("describe", format!("{}.{statistic}", column.column), format!("{value:.2}"))?;
        }
    }

    for (month, revenue) in result.monthly_revenue() {
        report.line("monthly_revenue", month, money(revenue))?;
    }

    for (day, revenue) in result.daily_revenue() {
        report.line("daily_revenue", day, money(revenue))?;
    }

    for (hour, rows) in result.hourly_order_distribution() {
        report.line("hourly_orders", hour, rows)?;
    }

    for (country, revenue) in result.revenue_by_country() {
        report.line("country_revenue", country, money(revenue))?;
    }

    for product in result.top_products(top) {
        report.line("top_product", product.stock_code, product.quantity)?;
    }

    if let Some(customers) = result.top_customers(top) {
        for customer in customers {
            report.line("top_customer", customer.customer_id, money(customer.revenue))?;
        }
    }

    if let Some(loyalty) = result.loyalty() {
        report.line("loyalty", "customers", loyalty.customer_count)?;
        report.line("loyalty", "repeat_customer_rate", money(loyalty.repeat_customer_rate))?;
        report.line("loyalty", "avg_orders_per_customer", money(loyalty.avg_orders_per_customer))?;
        report.line("loyalty", "avg_customer_lifetime_value", money(loyalty.avg_customer_lifetime_value))?;
        report.line("loyalty", "avg_basket_value", money(loyalty.avg_basket_value))?;

        for (orders, customers) in &loyalty.orders_per_customer_distribution {
            report.line("orders_per_customer", orders, customers)?;
        }
    }

    if let Some(profile) = raw_profile {
        report.line("raw_profile", "rows", profile.rows)?;
        report.line("raw_profile", "columns", profile.columns())?;
        report.line("raw_profile", "missing_cells", profile.total_missing())?;

        for (column, missing) in profile.columns_with_missing() {
            report.line("raw_missing", column, missing)?;
        }
    }

    report.finish()
}

fn write_selection_lists_to_stdout(dataset: &Dataset) -> Result<()> {
    let mut report = stdout_report();

    report.line("section", "key", "value")?;

    for country in dataset.countries() {
        report.line("country", country, dataset.view())?;
    }

    for customer_id in dataset.customers() {
        report.line("customer", customer_id, dataset.view())?;
    }

    if let Some(span) = dataset.date_span() {
        report.line("date_span", "from", span.start)?;
        report.line("date_span", "to", span.end)?;
    }

    report.finish()
}

fn export_to_directory(directory: &Path, result: &FilteredResult<'_>, top: usize) -> Result<()> {
    create_dir_all(directory)
        .with_context(|| format!("Error creating export directory: {}", directory.display()))?;

    export_rows(create_file(&directory.join("filtered_rows.csv"))?, result.rows())?;
    export_top_products(create_file(&directory.join("top_products.csv"))?, &result.top_products(top))?;

    if let Some(customers) = result.top_customers(top) {
        export_top_customers(create_file(&directory.join("top_customers.csv"))?, &customers)?;
    }

    info!("Exported filtered data to {}", directory.display());

    Ok(())
}

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("Error creating export file: {}", path.display()))?;

    Ok(BufWriter::new(file))
}
