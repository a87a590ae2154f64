use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use tracing::error;

/// Character encoding of a CSV file on disk.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Encoding {
    Utf8,
    /// The raw export is written as ISO-8859-1.
    Latin1
}

/// Shape of a CSV file: its size and the empty cells per column.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DatasetProfile {
    pub rows: usize,
    pub headers: Vec<String>,
    /// Empty cell count for each header, in header order.
    pub missing: Vec<(String, usize)>
}

impl DatasetProfile {
    pub fn columns(&self) -> usize {
        self.headers.len()
    }

    pub fn total_missing(&self) -> usize {
        self.missing.iter().map(|(_, count)| count).sum()
    }

    /// Only the columns with at least one empty cell.
    pub fn columns_with_missing(&self) -> impl Iterator<Item = (&str, usize)> {
        self.missing.iter()
            .filter(|(_, count)| *count > 0)
            .map(|(column, count)| (column.as_str(), *count))
    }
}

pub fn profile_file(path: &Path, encoding: Encoding) -> Result<DatasetProfile> {
    let bytes = fs::read(path)
        .with_context(|| format!("Error opening CSV at path: {}", path.display()))?;

    let text = match encoding {
        Encoding::Utf8 => String::from_utf8(bytes)
            .with_context(|| format!("CSV at path {} is not valid UTF-8", path.display()))?,
        Encoding::Latin1 => decode_latin1(&bytes)
    };

    profile_reader(text.as_bytes())
}

pub fn profile_reader<R: Read>(reader: R) -> Result<DatasetProfile> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut missing = vec![0usize; headers.len()];
    let mut rows = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(error) => {
                error!("CSV record error: {error}");
                continue;
            }
        };

        rows += 1;

        for (index, count) in missing.iter_mut().enumerate() {
            if record.get(index).is_none_or(str::is_empty) {
                *count += 1;
            }
        }
    }

    Ok(DatasetProfile {
        rows,
        missing: headers.iter().cloned().zip(missing).collect(),
        headers
    })
}

//NOTE: Every ISO-8859-1 byte maps onto the Unicode code point of the same value
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}
