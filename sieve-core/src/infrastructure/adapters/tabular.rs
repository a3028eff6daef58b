// sieve-core/src/infrastructure/adapters/tabular.rs
//
// CSV <-> Dataset. Gzipped inputs (`.gz`) are decoded on the fly.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use flate2::read::MultiGzDecoder;
use tracing::{debug, instrument};

use crate::domain::dataset::Dataset;
use crate::error::SieveError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write_with;

#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub has_header: bool,
    /// Column names to use instead of (or in the absence of) a header row.
    pub columns: Option<Vec<String>>,
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            columns: None,
            delimiter: b',',
        }
    }
}

pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

#[instrument(skip(options), fields(gzip = is_gzip(path)))]
pub fn read_dataset(path: &Path, options: &CsvOptions) -> Result<Dataset, SieveError> {
    let file = BufReader::new(File::open(path)?);
    let dataset = if is_gzip(path) {
        read_dataset_from(MultiGzDecoder::new(file), options)?
    } else {
        read_dataset_from(file, options)?
    };
    debug!(rows = dataset.len(), columns = dataset.columns().len(), "Dataset loaded");
    Ok(dataset)
}

pub fn read_dataset_from<R: Read>(reader: R, options: &CsvOptions) -> Result<Dataset, SieveError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(options.has_header)
        .delimiter(options.delimiter)
        .from_reader(reader);

    let header: Option<Vec<String>> = if options.has_header {
        let headers = rdr.headers().map_err(InfrastructureError::from)?;
        Some(headers.iter().map(|h| h.trim().to_string()).collect())
    } else {
        None
    };

    let mut records = rdr.records().peekable();
    let columns = match (&options.columns, header) {
        (Some(names), _) => names.clone(),
        (None, Some(names)) => names,
        // Header-less without names: column_0, column_1, ...
        (None, None) => {
            let width = match records.peek() {
                Some(Ok(first)) => first.len(),
                _ => 0,
            };
            (0..width).map(|i| format!("column_{i}")).collect()
        }
    };

    let mut dataset = Dataset::new(columns);
    for record in records {
        let record = record.map_err(InfrastructureError::from)?;
        dataset.push_row(record.iter().map(str::to_string).collect())?;
    }
    Ok(dataset)
}

/// Writes `dataset` as CSV with a header row. Cells are written as read.
pub fn write_dataset<W: Write>(dataset: &Dataset, writer: W) -> Result<(), InfrastructureError> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(dataset.columns())?;
    for row in dataset.rows() {
        wtr.write_record(row.cells())?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn dataset_to_csv(dataset: &Dataset) -> Result<Vec<u8>, InfrastructureError> {
    let mut buf = Vec::new();
    write_dataset(dataset, &mut buf)?;
    Ok(buf)
}

pub fn write_dataset_file(path: &Path, dataset: &Dataset) -> Result<(), InfrastructureError> {
    atomic_write_with(path, |out| write_dataset(dataset, out))
}
