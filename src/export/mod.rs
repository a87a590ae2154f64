
use std::io::Write;

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;

use crate::engine::{CustomerRanking, ProductRanking};
use crate::models::Transaction;
use crate::types::{CustomerId, Hour};

const ROW_HEADERS: [&str; 13] = [
    "InvoiceNo",
    "StockCode",
    "Description",
    "Quantity",
    "InvoiceDate",
    "UnitPrice",
    "CustomerID",
    "Country",
    "TotalPrice",
    "IsReturn",
    "IsCancelled",
    "YearMonth",
    "InvoiceHour"
];

const PRODUCT_HEADERS: [&str; 4] = ["StockCode", "Description", "Quantity", "TotalPrice"];

const CUSTOMER_HEADERS: [&str; 3] = ["CustomerID", "TotalPrice", "NumOrders"];

#[derive(Serialize)]
struct RowRecord<'a> {
    invoice_id: &'a str,
    stock_code: &'a str,
    description: &'a str,
    quantity: i64,
    invoice_date: String,
    unit_price: String,
    customer_id: Option<CustomerId>,
    country: &'a str,
    total_price: String,
    is_return: bool,
    is_cancelled: bool,
    year_month: String,
    invoice_hour: Hour
}

impl<'a> From<&'a Transaction> for RowRecord<'a> {
    fn from(transaction: &'a Transaction) -> Self {
        Self {
            invoice_id: &transaction.invoice_id,
            stock_code: &transaction.stock_code,
            description: &transaction.description,
            quantity: transaction.quantity,
            invoice_date: transaction.invoice_timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            unit_price: transaction.unit_price.to_string(),
            customer_id: transaction.customer_id,
            country: &transaction.country,
            total_price: transaction.total_price().to_string(),
            is_return: transaction.is_return(),
            is_cancelled: transaction.is_cancelled(),
            year_month: transaction.year_month().to_string(),
            invoice_hour: transaction.invoice_hour()
        }
    }
}

#[derive(Serialize)]
struct ProductRecord<'a> {
    stock_code: &'a str,
    description: &'a str,
    quantity: i64,
    total_price: String
}

#[derive(Serialize)]
struct CustomerRecord {
    customer_id: CustomerId,
    total_price: String,
    orders: usize
}

/// Writes the filtered rows in the extract layout, so an export can be loaded back as a view.
pub fn export_rows<W: Write>(writer: W, rows: &[&Transaction]) -> Result<()> {
    write_records(writer, &ROW_HEADERS, rows.iter().map(|transaction| RowRecord::from(*transaction)))
}

pub fn export_top_products<W: Write>(writer: W, products: &[ProductRanking]) -> Result<()> {
    write_records(writer, &PRODUCT_HEADERS, products.iter().map(|product| ProductRecord {
        stock_code: &product.stock_code,
        description: &product.description,
        quantity: product.quantity,
        total_price: product.revenue.to_string()
    }))
}

pub fn export_top_customers<W: Write>(writer: W, customers: &[CustomerRanking]) -> Result<()> {
    write_records(writer, &CUSTOMER_HEADERS, customers.iter().map(|customer| CustomerRecord {
        customer_id: customer.customer_id,
        total_price: customer.revenue.to_string(),
        orders: customer.orders
    }))
}

//NOTE: Headers are written by hand because serde-driven headers are skipped entirely for an empty export
fn write_records<W, T, I>(writer: W, headers: &[&str], records: I) -> Result<()>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(headers)?;

    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()?;

    Ok(())
}
