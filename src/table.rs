//! CSV tables exchanged between pipeline stages

use crate::error::{BoardnetError, BoardnetResult};
use indexmap::{IndexMap, IndexSet};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.trim(csv::Trim::All).has_headers(true);
    builder
}

/// Read every row of a CSV stream into `T`.
pub fn read_from<T: DeserializeOwned, R: Read>(reader: R) -> BoardnetResult<Vec<T>> {
    let mut rdr = reader_builder().from_reader(reader);
    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Read every row of a CSV file into `T`.
pub fn read_records<T: DeserializeOwned>(path: impl AsRef<Path>) -> BoardnetResult<Vec<T>> {
    let path = path.as_ref();
    let csv_err = |source| BoardnetError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = reader_builder().from_path(path).map_err(csv_err)?;
    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row.map_err(csv_err)?);
    }
    debug!("Read {} rows from {:?}", rows.len(), path);
    Ok(rows)
}

/// Write rows of `T` (with header) to a CSV stream.
pub fn write_to<T: Serialize, W: Write>(writer: W, rows: &[T]) -> BoardnetResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write rows of `T` (with header) to a CSV file, creating parent directories.
pub fn write_records<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> BoardnetResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    write_to(file, rows).map_err(|e| match e {
        BoardnetError::CsvBuffer(source) => BoardnetError::Csv {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    debug!("Wrote {} rows to {:?}", rows.len(), path);
    Ok(())
}

/// Render rows with heterogeneous keys (e.g. match API output) as CSV.
///
/// The header is the union of all keys in first-seen order; missing cells are empty.
pub fn write_dynamic_to<W: Write>(
    writer: W,
    rows: &[IndexMap<String, String>],
) -> BoardnetResult<()> {
    let header: IndexSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut wtr = csv::Writer::from_writer(writer);
    if header.is_empty() {
        wtr.flush()?;
        return Ok(());
    }
    wtr.write_record(header.iter())?;
    for row in rows {
        wtr.write_record(
            header
                .iter()
                .map(|key| row.get(*key).map(String::as_str).unwrap_or("")),
        )?;
    }
    wtr.flush()?;
    Ok(())
}

/// File variant of [`write_dynamic_to`].
pub fn write_dynamic(
    path: impl AsRef<Path>,
    rows: &[IndexMap<String, String>],
) -> BoardnetResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    write_dynamic_to(File::create(path)?, rows)
}

/// Serialize rows into an in-memory CSV string.
pub fn to_csv_string<T: Serialize>(rows: &[T]) -> BoardnetResult<String> {
    let mut buf = Vec::new();
    write_to(&mut buf, rows)?;
    String::from_utf8(buf).map_err(|e| BoardnetError::InvalidRecord(e.to_string()))
}
