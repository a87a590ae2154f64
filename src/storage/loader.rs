use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, Trim};
use tracing::{error, info, warn};

use crate::models::{IngestError, Transaction, TransactionRow, ViewKind};
use crate::storage::Dataset;

const REQUIRED_COLUMNS: [&str; 8] = [
    "InvoiceNo",
    "StockCode",
    "Description",
    "Quantity",
    "InvoiceDate",
    "UnitPrice",
    "CustomerID",
    "Country"
];

/// Loads a cleaned extract from disk as the given view.
pub fn load_view(path: &Path, view: ViewKind) -> Result<Dataset> {
    let file = File::open(path)
        .with_context(|| format!("Error opening CSV at path: {}", path.display()))?;

    let dataset = read_view(BufReader::new(file), view)
        .with_context(|| format!("Error reading CSV at path: {}", path.display()))?;

    info!("Loaded {} transactions into the {view} view from {}", dataset.len(), path.display());

    Ok(dataset)
}

/// Reads a headered transaction table.
///
/// Rows that cannot be deserialized or fail validation are logged and skipped;
/// a header lacking one of the base columns fails the whole read.
pub fn read_view<R: Read>(reader: R, view: ViewKind) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            bail!("CSV header is missing the [{column}] column");
        }
    }

    let mut transactions = Vec::new();
    let mut skipped = 0usize;

    for result in reader.deserialize::<TransactionRow>() {
        let row = match result {
            Ok(row) => row,
            Err(error) => {
                error!("CSV deserialization error: {error}");
                skipped += 1;
                continue;
            }
        };

        match accept(row, view) {
            Ok(transaction) => transactions.push(transaction),
            Err(error) => {
                warn!("{error}");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} rows while reading the {view} view");
    }

    Ok(Dataset::new(view, transactions)?)
}

fn accept(row: TransactionRow, view: ViewKind) -> Result<Transaction, IngestError> {
    let transaction = Transaction::try_from(row)?;

    if view == ViewKind::IdentifiedCustomers && transaction.customer_id.is_none() {
        return Err(IngestError::customer_required(&transaction.invoice_id, &transaction.stock_code, view));
    }

    Ok(transaction)
}
