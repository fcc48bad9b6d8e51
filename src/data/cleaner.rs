//! Data Cleaner Module
//! Turns the raw table into the numeric table the rest of the pipeline reads.

use super::loader::{ADJ_CLOSE, PRICE_COLUMNS, VOLUME};
use polars::prelude::*;
use thiserror::Error;

/// Decimal places kept for every floating-point column.
pub const PRICE_DECIMALS: i32 = 2;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Outcome of coercing one Volume cell to a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeCell {
    /// Parsed and rounded to the nearest whole share count.
    Valid(i64),
    /// The cell was empty in the source file.
    Missing,
    /// The cell held something that is not a number.
    Unparsable(String),
}

impl VolumeCell {
    /// Values outside the `i64` range are unparsable, not clamped.
    pub fn from_number(value: f64) -> Self {
        let rounded = value.round_ties_even();
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
            VolumeCell::Valid(rounded as i64)
        } else {
            VolumeCell::Unparsable(value.to_string())
        }
    }

    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return VolumeCell::Missing;
        }
        match trimmed.parse::<f64>().map(VolumeCell::from_number) {
            Ok(VolumeCell::Valid(v)) => VolumeCell::Valid(v),
            _ => VolumeCell::Unparsable(raw.to_string()),
        }
    }

    pub fn value(&self) -> Option<i64> {
        match self {
            VolumeCell::Valid(v) => Some(*v),
            _ => None,
        }
    }
}

/// A Volume cell that did not coerce to a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionFailure {
    pub row: usize,
    pub cell: VolumeCell,
}

/// What the cleaner had to degrade.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub volume_failures: Vec<CoercionFailure>,
}

/// Cleaned numeric table plus the coercion report.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub df: DataFrame,
    pub report: CleanReport,
}

/// Round half-to-even at the given number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

pub(crate) fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Handles data cleaning operations.
pub struct DataCleaner;

impl DataCleaner {
    /// Clean a freshly loaded table.
    ///
    /// Column order is preserved apart from the dropped `Adj Close`. Text
    /// columns get `""` for missing cells, Volume becomes a nullable integer
    /// column and float columns are rounded to two decimals.
    pub fn clean(df: &DataFrame) -> Result<CleanedTable, CleanerError> {
        let mut columns: Vec<Column> = Vec::with_capacity(df.width());
        let mut report = CleanReport::default();

        for column in df.get_columns() {
            let name = column.name().as_str();
            if name == ADJ_CLOSE {
                continue;
            }

            let cleaned = if name == VOLUME {
                let cells = Self::coerce_volume(column)?;
                let values: Vec<Option<i64>> = cells.iter().map(VolumeCell::value).collect();
                for (row, cell) in cells.into_iter().enumerate() {
                    if cell.value().is_none() {
                        log::warn!("Volume in row {} could not be coerced: {:?}", row, cell);
                        report.volume_failures.push(CoercionFailure { row, cell });
                    }
                }
                Column::new(column.name().clone(), values)
            } else if PRICE_COLUMNS.contains(&name) || column.dtype().is_float() {
                let as_f64 = column.cast(&DataType::Float64)?;
                let lost = as_f64.null_count().saturating_sub(column.null_count());
                if lost > 0 {
                    log::warn!("{} cells in {} are not numbers", lost, name);
                }
                let values: Vec<Option<f64>> = as_f64
                    .f64()?
                    .into_iter()
                    .map(|v| v.map(|v| round_to(v, PRICE_DECIMALS)))
                    .collect();
                Column::new(column.name().clone(), values)
            } else if is_numeric_dtype(column.dtype()) {
                // Integers are already rounded
                column.clone()
            } else {
                let text = column.cast(&DataType::String)?;
                let values: Vec<&str> = text
                    .str()?
                    .into_iter()
                    .map(|v| v.unwrap_or(""))
                    .collect();
                Column::new(column.name().clone(), values)
            };

            columns.push(cleaned);
        }

        let df = DataFrame::new(columns)?;
        log::info!(
            "Cleaned table: {} rows, {} volume cells degraded",
            df.height(),
            report.volume_failures.len()
        );
        Ok(CleanedTable { df, report })
    }

    /// Coerce every Volume cell, never failing on bad content.
    pub fn coerce_volume(column: &Column) -> Result<Vec<VolumeCell>, CleanerError> {
        if is_numeric_dtype(column.dtype()) {
            let as_f64 = column.cast(&DataType::Float64)?;
            Ok(as_f64
                .f64()?
                .into_iter()
                .map(|v| v.map_or(VolumeCell::Missing, VolumeCell::from_number))
                .collect())
        } else {
            let text = column.cast(&DataType::String)?;
            Ok(text
                .str()?
                .into_iter()
                .map(|v| v.map_or(VolumeCell::Missing, VolumeCell::parse))
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{CLOSE, COMPANY, DATE, HIGH, LOW, OPEN};
    use pretty_assertions::assert_eq;

    fn raw_frame() -> DataFrame {
        df!(
            DATE => ["2024-01-02", "2024-01-03", "2024-01-04"],
            OPEN => [100.456, 99.991, 101.0],
            HIGH => [110.0, 111.004, 112.0],
            LOW => [90.0, 91.0, 92.0],
            CLOSE => [105.0, 106.0, 107.0],
            ADJ_CLOSE => [104.0, 105.0, 106.0],
            VOLUME => ["1234.5", "abc", ""],
            COMPANY => [Some("Apple Inc."), None, Some("Apple Inc.")]
        )
        .unwrap()
    }

    #[test]
    fn test_drops_adj_close_and_keeps_order() {
        let cleaned = DataCleaner::clean(&raw_frame()).unwrap();
        let names: Vec<String> = cleaned
            .df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec![DATE, OPEN, HIGH, LOW, CLOSE, VOLUME, COMPANY]);
    }

    #[test]
    fn test_clean_without_adj_close() {
        let df = raw_frame().drop(ADJ_CLOSE).unwrap();
        let cleaned = DataCleaner::clean(&df).unwrap();
        assert!(cleaned.df.column(ADJ_CLOSE).is_err());
        assert_eq!(cleaned.df.width(), 7);
    }

    #[test]
    fn test_missing_text_becomes_empty_string() {
        let cleaned = DataCleaner::clean(&raw_frame()).unwrap();
        let companies: Vec<Option<&str>> =
            cleaned.df.column(COMPANY).unwrap().str().unwrap().into_iter().collect();
        assert_eq!(companies, vec![Some("Apple Inc."), Some(""), Some("Apple Inc.")]);
    }

    #[test]
    fn test_volume_coercion_is_tagged() {
        let cleaned = DataCleaner::clean(&raw_frame()).unwrap();
        let volume: Vec<Option<i64>> =
            cleaned.df.column(VOLUME).unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(volume, vec![Some(1234), None, None]);

        assert_eq!(
            cleaned.report.volume_failures,
            vec![
                CoercionFailure { row: 1, cell: VolumeCell::Unparsable("abc".to_string()) },
                CoercionFailure { row: 2, cell: VolumeCell::Missing },
            ]
        );
    }

    #[test]
    fn test_numeric_volume_rounds_half_to_even() {
        let df = df!(VOLUME => [Some(2.5), Some(3.5), Some(1_000_000.4), None]).unwrap();
        let cleaned = DataCleaner::clean(&df).unwrap();
        let volume: Vec<Option<i64>> =
            cleaned.df.column(VOLUME).unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(volume, vec![Some(2), Some(4), Some(1_000_000), None]);
        assert_eq!(cleaned.report.volume_failures.len(), 1);
    }

    #[test]
    fn test_prices_rounded_to_two_decimals() {
        let cleaned = DataCleaner::clean(&raw_frame()).unwrap();
        let open: Vec<Option<f64>> =
            cleaned.df.column(OPEN).unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(open, vec![Some(100.46), Some(99.99), Some(101.0)]);
    }

    #[test]
    fn test_text_prices_become_numbers() {
        let df = df!(
            OPEN => ["100.456", "oops", ""],
            HIGH => [Some(110i64), None, Some(112)]
        )
        .unwrap();
        let cleaned = DataCleaner::clean(&df).unwrap();
        let open: Vec<Option<f64>> =
            cleaned.df.column(OPEN).unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(open, vec![Some(100.46), None, None]);
        let high: Vec<Option<f64>> =
            cleaned.df.column(HIGH).unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(high, vec![Some(110.0), None, Some(112.0)]);
    }

    #[test]
    fn test_out_of_range_volume_is_unparsable() {
        assert_eq!(VolumeCell::parse("9e18"), VolumeCell::Valid(9_000_000_000_000_000_000));
        assert!(matches!(VolumeCell::parse("1e30"), VolumeCell::Unparsable(_)));
        assert!(matches!(VolumeCell::from_number(-1e19), VolumeCell::Unparsable(_)));
        assert!(matches!(VolumeCell::from_number(i64::MAX as f64), VolumeCell::Unparsable(_)));

        let df = df!(VOLUME => ["1e30", "42"]).unwrap();
        let cleaned = DataCleaner::clean(&df).unwrap();
        let volume: Vec<Option<i64>> =
            cleaned.df.column(VOLUME).unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(volume, vec![None, Some(42)]);
        assert_eq!(
            cleaned.report.volume_failures,
            vec![CoercionFailure { row: 0, cell: VolumeCell::Unparsable("1e30".to_string()) }]
        );
    }

    #[test]
    fn test_rounding_is_idempotent() {
        for value in [0.0, 1.005, 2.675, 100.456, 123456.789, -42.125, 3.14159] {
            let once = round_to(value, PRICE_DECIMALS);
            assert_eq!(round_to(once, PRICE_DECIMALS), once, "value {value}");
        }
    }

    #[test]
    fn test_volume_cell_parse() {
        assert_eq!(VolumeCell::parse(" 1500 "), VolumeCell::Valid(1500));
        assert_eq!(VolumeCell::parse("1e3"), VolumeCell::Valid(1000));
        assert_eq!(VolumeCell::parse("   "), VolumeCell::Missing);
        assert_eq!(VolumeCell::parse("NaN"), VolumeCell::Unparsable("NaN".to_string()));
        assert_eq!(VolumeCell::Valid(0).value(), Some(0));
        assert_eq!(VolumeCell::Missing.value(), None);
    }
}
