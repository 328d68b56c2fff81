//! CSV table sources for the catalog and the user store.
//!
//! Rows come back as [`RawRow`]s with empty cells left out, which is how the
//! normalizers tell a missing value from a present one.

use crate::error::Result;
use crate::models::RawRow;
use std::io;
use std::path::Path;
use tracing::{info, warn};

pub fn load_rows(path: impl AsRef<Path>) -> Result<Vec<RawRow>> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let rows = collect_rows(reader)?;

    info!(path = %path.display(), rows = rows.len(), "Table loaded");
    Ok(rows)
}

pub fn read_rows<R: io::Read>(input: R) -> Result<Vec<RawRow>> {
    let reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    collect_rows(reader)
}

fn collect_rows<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<RawRow>> {
    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for (position, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                warn!(position, error = %err, "Skipping unreadable CSV record");
                continue;
            }
        };

        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            // unnamed index columns written by dataframe exports carry no data
            .filter(|(header, value)| !header.trim().is_empty() && !value.trim().is_empty())
            .map(|(header, value)| (header.trim().to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}
