use std::env;
use std::fs::{create_dir_all, File};
use std::io::{self, stdout, Write};
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;

const PROBABILITY_ANONYMOUS: f64 = 0.25;
const PROBABILITY_CANCELLED: f64 = 0.02;
const PROBABILITY_RETURN: f64 = 0.03;
const PROBABILITY_INVALID: f64 = 0.005;

const MAX_LINES_PER_INVOICE: usize = 6;
const FIRST_CUSTOMER_ID: u32 = 12_346;
const SPAN_MINUTES: i64 = 373 * 24 * 60;

const PRODUCTS: [(&str, &str, i64); 8] = [
    ("85123A", "WHITE HANGING HEART T-LIGHT HOLDER", 255),
    ("71053", "WHITE METAL LANTERN", 339),
    ("22633", "HAND WARMER UNION JACK", 185),
    ("22728", "ALARM CLOCK BAKELIKE PINK", 375),
    ("21773", "DECORATIVE ROSE BATHROOM BOTTLE", 251),
    ("22386", "JUMBO BAG PINK POLKADOT", 195),
    ("84879", "ASSORTED COLOUR BIRD ORNAMENT", 169),
    ("POST", "POSTAGE", 1800)
];

const COUNTRIES: [&str; 6] = ["United Kingdom", "United Kingdom", "United Kingdom", "Germany", "France", "EIRE"];

struct GeneratorConfig {
    num_records: usize,
    num_customers: usize,
    output_path: String,
}

impl GeneratorConfig {
    fn from_args() -> Self {
        let args: Vec<String> = env::args().collect();
        let num_records = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(100_000);
        let num_customers = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(4_000);

        Self {
            num_records,
            num_customers: num_customers.max(1),
            output_path: "samples/generated.csv".to_string(),
        }
    }
}

struct Invoice {
    number: u32,
    timestamp: NaiveDateTime,
    customer_id: Option<u32>,
    country: &'static str,
    cancelled: bool
}

fn main() -> io::Result<()> {
    let config = GeneratorConfig::from_args();

    println!(
        "Generating {} transaction lines for {} customers in {}...",
        config.num_records, config.num_customers, config.output_path
    );

    if let Some(parent) = Path::new(&config.output_path).parent() {
        create_dir_all(parent)?;
    }

    let file = File::create(&config.output_path)?;
    let mut writer = io::BufWriter::new(file);

    writeln!(writer, "InvoiceNo,StockCode,Description,Quantity,InvoiceDate,UnitPrice,CustomerID,Country")?;

    let mut rng = rand::thread_rng();
    let start = NaiveDate::from_ymd_opt(2010, 12, 1)
        .and_then(|date| date.and_hms_opt(8, 0, 0))
        .unwrap_or_default();

    let mut written = 0;
    let mut invoice_number = 536_365;

    while written < config.num_records {
        let invoice = generate_invoice(&mut rng, invoice_number, start, config.num_customers);
        let lines = rng.gen_range(1..=MAX_LINES_PER_INVOICE).min(config.num_records - written);

        for _ in 0..lines {
            if rng.gen_bool(PROBABILITY_INVALID) {
                generate_invalid_line(&mut writer, &mut rng, &invoice)?;
            } else {
                generate_line(&mut writer, &mut rng, &invoice)?;
            }

            written += 1;

            if written % 100_000 == 0 {
                print!(".");
                stdout().flush()?;
            }
        }

        invoice_number += 1;
    }

    println!("\nGeneration complete.");

    Ok(())
}

fn generate_invoice<R: Rng>(rng: &mut R, number: u32, start: NaiveDateTime, num_customers: usize) -> Invoice {
    let customer_id = if rng.gen_bool(PROBABILITY_ANONYMOUS) {
        None
    } else {
        Some(FIRST_CUSTOMER_ID + rng.gen_range(0..num_customers as u32))
    };

    Invoice {
        number,
        timestamp: start + Duration::minutes(rng.gen_range(0..SPAN_MINUTES)),
        customer_id,
        country: COUNTRIES.choose(rng).copied().unwrap_or("United Kingdom"),
        cancelled: rng.gen_bool(PROBABILITY_CANCELLED)
    }
}

fn invoice_id(invoice: &Invoice) -> String {
    if invoice.cancelled {
        format!("C{}", invoice.number)
    } else {
        invoice.number.to_string()
    }
}

fn customer_field(invoice: &Invoice) -> String {
    invoice.customer_id.map(|id| format!("{id}.0")).unwrap_or_default()
}

fn generate_line<W: Write, R: Rng>(writer: &mut W, rng: &mut R, invoice: &Invoice) -> io::Result<()> {
    let (stock_code, description, cents) = PRODUCTS.choose(rng).copied().unwrap_or(PRODUCTS[0]);
    let quantity: i64 = rng.gen_range(1..=24);
    let quantity = if invoice.cancelled || rng.gen_bool(PROBABILITY_RETURN) { -quantity } else { quantity };

    writeln!(
        writer,
        "{},{},{},{},{},{},{},{}",
        invoice_id(invoice),
        stock_code,
        description,
        quantity,
        invoice.timestamp.format("%Y-%m-%d %H:%M:%S"),
        Decimal::new(cents, 2),
        customer_field(invoice),
        invoice.country
    )
}

fn generate_invalid_line<W: Write, R: Rng>(writer: &mut W, rng: &mut R, invoice: &Invoice) -> io::Result<()> {
    let id = invoice_id(invoice);
    let customer = customer_field(invoice);

    let invalid_lines = [
        format!("{id},22633,HAND WARMER UNION JACK,6,2011-01-04 10:00:00,0,{customer},{}", invoice.country),
        format!("{id},22633,HAND WARMER UNION JACK,6,2011-01-04 10:00:00,-1.85,{customer},{}", invoice.country),
        format!("{id},22633,HAND WARMER UNION JACK,6,not a date,1.85,{customer},{}", invoice.country),
        format!("{id},22633,HAND WARMER UNION JACK,six,2011-01-04 10:00:00,1.85,{customer},{}", invoice.country),
        format!("{id},22633,HAND WARMER UNION JACK,6,2011-01-04 10:00:00,1.85,bad_id,{}", invoice.country)
    ];

    match invalid_lines.choose(rng) {
        Some(line) => writeln!(writer, "{line}"),
        None => Ok(())
    }
}
