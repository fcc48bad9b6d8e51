//! CSV Data Loader Module
//! Reads the share price file into a Polars DataFrame.

use polars::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub const DATE: &str = "Date";
pub const OPEN: &str = "Open";
pub const HIGH: &str = "High";
pub const LOW: &str = "Low";
pub const CLOSE: &str = "Close";
pub const ADJ_CLOSE: &str = "Adj Close";
pub const VOLUME: &str = "Volume";
pub const COMPANY: &str = "Company Name";

/// Price columns in display order.
pub const PRICE_COLUMNS: [&str; 4] = [OPEN, HIGH, LOW, CLOSE];

/// Columns the dashboard cannot work without. `Adj Close` is optional since
/// the cleaner drops it anyway.
pub const REQUIRED_COLUMNS: [&str; 7] = [DATE, OPEN, HIGH, LOW, CLOSE, VOLUME, COMPANY];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Required column '{0}' is missing")]
    MissingColumn(String),
}

/// Hash of the raw file content, used as the memoization key.
pub fn content_hash(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write(bytes);
    hasher.finish()
}

/// Loads the share price CSV with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file, inferring column types.
    ///
    /// Numeric-looking columns come back as numbers, everything else as
    /// strings. Volume is always read as text and coerced later by the
    /// cleaner, so a bad cell keeps its raw content.
    ///
    /// The file is read once; the returned hash describes exactly the bytes
    /// that were parsed.
    pub fn load_csv(file_path: &Path) -> Result<(DataFrame, u64), LoaderError> {
        let bytes = Self::read_file(file_path)?;
        let hash = content_hash(&bytes);
        let df = Self::parse_csv(bytes)?;

        log::info!(
            "Loaded {} rows, {} columns from {}",
            df.height(),
            df.width(),
            file_path.display()
        );
        Ok((df, hash))
    }

    fn read_file(file_path: &Path) -> Result<Vec<u8>, LoaderError> {
        if !file_path.is_file() {
            return Err(LoaderError::NotFound(file_path.to_path_buf()));
        }
        std::fs::read(file_path).map_err(|e| LoaderError::Io(file_path.to_path_buf(), e))
    }

    /// Parse CSV content and check the required columns.
    fn parse_csv(bytes: Vec<u8>) -> Result<DataFrame, LoaderError> {
        let mut options = CsvReadOptions::default()
            .with_has_header(true)
            // Whole-file inference: a late bad cell must not be nulled by a
            // schema guessed from the first rows
            .with_infer_schema_length(None)
            .with_ignore_errors(true);

        if Self::header_has(&bytes, VOLUME) {
            let overwrite = Schema::from_iter([Field::new(VOLUME.into(), DataType::String)]);
            options = options.with_schema_overwrite(Some(Arc::new(overwrite)));
        }

        let df = options
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;

        Self::check_columns(&df)?;
        Ok(df)
    }

    fn header_has(bytes: &[u8], column: &str) -> bool {
        let header = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
        String::from_utf8_lossy(header)
            .split(',')
            .any(|name| name.trim().trim_matches('"') == column)
    }

    /// Verify every required column is present.
    pub fn check_columns(df: &DataFrame) -> Result<(), LoaderError> {
        let names = Self::column_names(df);
        match REQUIRED_COLUMNS
            .iter()
            .find(|required| !names.iter().any(|n| n == *required))
        {
            Some(missing) => Err(LoaderError::MissingColumn(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Get list of column names.
    pub fn column_names(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Date,Open,High,Low,Close,Adj Close,Volume,Company Name";

    fn write_csv(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        write!(file, "{}", body).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_preserves_row_order() {
        let file = write_csv(
            "2024-01-02,100.5,110,90,105,104,1000,Apple Inc.\n\
             2024-01-02,50,55,45,52,51,2000,Netflix Inc.\n\
             2024-01-03,101,111,91,106,105,1500,Apple Inc.\n",
        );

        let (df, _) = DataLoader::load_csv(file.path()).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 8);

        let companies: Vec<Option<&str>> = df.column(COMPANY).unwrap().str().unwrap().into_iter().collect();
        assert_eq!(
            companies,
            vec![Some("Apple Inc."), Some("Netflix Inc."), Some("Apple Inc.")]
        );
    }

    #[test]
    fn test_load_infers_numeric_columns() {
        let file = write_csv("2024-01-02,100.5,110,90,105,104,1000,Apple Inc.\n");

        let (df, _) = DataLoader::load_csv(file.path()).unwrap();
        assert!(df.column(OPEN).unwrap().dtype().is_float());
        assert_eq!(df.column(DATE).unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_volume_always_read_as_text() {
        let file = write_csv(
            "2024-01-02,100,110,90,105,104,n/a,Apple Inc.\n\
             2024-01-03,100,110,90,105,104,1200,Apple Inc.\n",
        );
        let (df, _) = DataLoader::load_csv(file.path()).unwrap();
        assert_eq!(df.column(VOLUME).unwrap().dtype(), &DataType::String);

        let file = write_csv("2024-01-02,100,110,90,105,104,1200,Apple Inc.\n");
        let (df, _) = DataLoader::load_csv(file.path()).unwrap();
        let volume: Vec<Option<&str>> = df.column(VOLUME).unwrap().str().unwrap().into_iter().collect();
        assert_eq!(volume, vec![Some("1200")]);
    }

    #[test]
    fn test_late_bad_cells_keep_raw_text() {
        let mut body = String::new();
        for _ in 0..10_000 {
            body.push_str("2024-01-02,100.5,110,90,105,104,1000,Apple Inc.\n");
        }
        body.push_str("2024-01-03,oops,110,90,105,104,abc,Apple Inc.\n");
        let file = write_csv(&body);

        let (df, _) = DataLoader::load_csv(file.path()).unwrap();
        assert_eq!(df.height(), 10_001);

        let volume = df.column(VOLUME).unwrap().str().unwrap();
        assert_eq!(volume.get(10_000), Some("abc"));
        // Open is inferred over every row, so the bad cell keeps the column text
        assert_eq!(df.column(OPEN).unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_hash_matches_file_content() {
        let body = "2024-01-02,100,110,90,105,104,1200,Apple Inc.\n";
        let file = write_csv(body);
        let (_, hash) = DataLoader::load_csv(file.path()).unwrap();
        assert_eq!(hash, content_hash(format!("{}\n{}", HEADER, body).as_bytes()));
    }

    #[test]
    fn test_empty_file_is_csv_error() {
        let file = NamedTempFile::new().unwrap();
        let err = DataLoader::load_csv(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::Csv(_)), "unexpected error: {err}");
    }

    #[test]
    fn test_missing_file() {
        let err = DataLoader::load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
    }

    #[test]
    fn test_missing_required_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Date,Open,High,Low,Close,Company Name").unwrap();
        writeln!(file, "2024-01-02,1,2,0.5,1.5,Apple Inc.").unwrap();
        file.flush().unwrap();

        let err = DataLoader::load_csv(file.path()).unwrap_err();
        match err {
            LoaderError::MissingColumn(name) => assert_eq!(name, VOLUME),
            other => panic!("unexpected error: {other}"),
        }
    }
}
