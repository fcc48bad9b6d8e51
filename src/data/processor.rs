//! Data Processor Module
//! Reshapes the cleaned table into chart series (melt and group-sum).

use super::loader::{CLOSE, COMPANY, DATE, HIGH, LOW, OPEN, VOLUME};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// One of the four price columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriceType {
    Open,
    High,
    Low,
    Close,
}

impl PriceType {
    pub const ALL: [PriceType; 4] = [PriceType::Open, PriceType::High, PriceType::Low, PriceType::Close];

    pub fn column(self) -> &'static str {
        match self {
            PriceType::Open => OPEN,
            PriceType::High => HIGH,
            PriceType::Low => LOW,
            PriceType::Close => CLOSE,
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Long-form price row: (Date, Price Type, Price).
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: String,
    pub price_type: PriceType,
    pub price: Option<f64>,
}

/// Summed volume for one (Date, Company Name) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumePoint {
    pub date: String,
    pub company: String,
    pub volume: i64,
}

/// How Volume cells that failed coercion enter the group sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumePolicy {
    /// Leave them out; a group with no valid cell is dropped.
    #[default]
    Exclude,
    /// Count them as zero; every group is kept.
    TreatAsZero,
}

/// Handles reshaping of the cleaned table.
pub struct DataProcessor;

impl DataProcessor {
    /// Rows of a single company.
    pub fn filter_company(df: &DataFrame, company: &str) -> Result<DataFrame, ProcessorError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(col(COMPANY).eq(lit(company)))
            .collect()?;
        Ok(filtered)
    }

    /// Melt the four price columns of one company into long form.
    ///
    /// N rows produce exactly 4N points, all Open first, then High, Low and
    /// Close, each in row order.
    pub fn melt_prices(df: &DataFrame, company: &str) -> Result<Vec<PricePoint>, ProcessorError> {
        let company_df = Self::filter_company(df, company)?;
        let dates = Self::string_values(company_df.column(DATE)?)?;

        let mut points = Vec::with_capacity(dates.len() * PriceType::ALL.len());
        for price_type in PriceType::ALL {
            let prices = company_df.column(price_type.column())?.cast(&DataType::Float64)?;
            for (date, price) in dates.iter().zip(prices.f64()?.into_iter()) {
                points.push(PricePoint {
                    date: date.clone(),
                    price_type,
                    price,
                });
            }
        }

        Ok(points)
    }

    /// Sum Volume per (Date, Company Name), ordered by date then company.
    ///
    /// A sum beyond the `i64` range saturates at the bound.
    pub fn volume_over_time(
        df: &DataFrame,
        policy: VolumePolicy,
    ) -> Result<Vec<VolumePoint>, ProcessorError> {
        let dates = Self::string_values(df.column(DATE)?)?;
        let companies = Self::string_values(df.column(COMPANY)?)?;
        let volumes = df.column(VOLUME)?.cast(&DataType::Int64)?;

        let mut groups: BTreeMap<(String, String), Option<i64>> = BTreeMap::new();
        for ((date, company), volume) in dates
            .into_iter()
            .zip(companies)
            .zip(volumes.i64()?.into_iter())
        {
            if company.is_empty() {
                continue;
            }
            let key = (date, company);
            let sum = groups.entry(key.clone()).or_insert(None);
            *sum = match (policy, volume) {
                (_, Some(v)) => {
                    let total = sum.unwrap_or(0);
                    Some(total.checked_add(v).unwrap_or_else(|| {
                        log::warn!("Volume for {} on {} overflows, capped", key.1, key.0);
                        total.saturating_add(v)
                    }))
                }
                (VolumePolicy::TreatAsZero, None) => Some(sum.unwrap_or(0)),
                (VolumePolicy::Exclude, None) => *sum,
            };
        }

        Ok(groups
            .into_iter()
            .filter_map(|((date, company), volume)| {
                volume.map(|volume| VolumePoint {
                    date,
                    company,
                    volume,
                })
            })
            .collect())
    }

    fn string_values(column: &Column) -> Result<Vec<String>, ProcessorError> {
        let text = column.cast(&DataType::String)?;
        Ok(text
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or("").to_string())
            .collect())
    }
}

/// Parse the Date column's text. Accepts ISO dates, ISO timestamps and US
/// `m/d/Y` dates.
pub fn parse_trading_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%m/%d/%Y"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Chart x coordinate for a date (days since 0001-01-01).
pub fn date_to_axis(text: &str) -> Option<f64> {
    parse_trading_date(text).map(|d| d.num_days_from_ce() as f64)
}

/// Inverse of [`date_to_axis`], for tick labels.
pub fn axis_to_date_label(value: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(value.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cleaned_frame() -> DataFrame {
        df!(
            DATE => ["2024-01-02", "2024-01-02", "2024-01-03", "2024-01-03", "2024-01-03"],
            OPEN => [100.0, 50.0, 200.0, 51.0, 52.0],
            HIGH => [110.0, 55.0, 210.0, 56.0, 57.0],
            LOW => [90.0, 45.0, 190.0, 46.0, 47.0],
            CLOSE => [Some(105.0), Some(52.0), Some(205.0), None, Some(53.0)],
            VOLUME => [Some(1000i64), Some(300), Some(2000), None, Some(700)],
            COMPANY => ["Apple Inc.", "Netflix Inc.", "Apple Inc.", "Netflix Inc.", "Netflix Inc."]
        )
        .unwrap()
    }

    #[test]
    fn test_melt_produces_four_points_per_row() {
        let points = DataProcessor::melt_prices(&cleaned_frame(), "Netflix Inc.").unwrap();
        assert_eq!(points.len(), 4 * 3);

        let first_high = &points[3];
        assert_eq!(first_high.price_type, PriceType::High);
        assert_eq!(first_high.date, "2024-01-02");
        assert_eq!(first_high.price, Some(55.0));

        let closes: Vec<Option<f64>> = points
            .iter()
            .filter(|p| p.price_type == PriceType::Close)
            .map(|p| p.price)
            .collect();
        assert_eq!(closes, vec![Some(52.0), None, Some(53.0)]);
    }

    #[test]
    fn test_melt_unknown_company_is_empty() {
        let points = DataProcessor::melt_prices(&cleaned_frame(), "Meta Platforms Inc.").unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_volume_sums_exclude_failed_cells() {
        let points =
            DataProcessor::volume_over_time(&cleaned_frame(), VolumePolicy::Exclude).unwrap();
        assert_eq!(
            points,
            vec![
                VolumePoint { date: "2024-01-02".into(), company: "Apple Inc.".into(), volume: 1000 },
                VolumePoint { date: "2024-01-02".into(), company: "Netflix Inc.".into(), volume: 300 },
                VolumePoint { date: "2024-01-03".into(), company: "Apple Inc.".into(), volume: 2000 },
                VolumePoint { date: "2024-01-03".into(), company: "Netflix Inc.".into(), volume: 700 },
            ]
        );
    }

    #[test]
    fn test_volume_policy_decides_empty_groups() {
        let df = df!(
            DATE => ["2024-01-02", "2024-01-02"],
            OPEN => [1.0, 1.0],
            HIGH => [1.0, 1.0],
            LOW => [1.0, 1.0],
            CLOSE => [1.0, 1.0],
            VOLUME => [None::<i64>, Some(5)],
            COMPANY => ["Apple Inc.", "Alphabet Inc."]
        )
        .unwrap();

        let excluded = DataProcessor::volume_over_time(&df, VolumePolicy::Exclude).unwrap();
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded[0].company, "Alphabet Inc.");

        let zeroed = DataProcessor::volume_over_time(&df, VolumePolicy::TreatAsZero).unwrap();
        assert_eq!(zeroed.len(), 2);
        assert_eq!(zeroed[1].company, "Apple Inc.");
        assert_eq!(zeroed[1].volume, 0);
    }

    #[test]
    fn test_volume_group_sum_matches_raw_total() {
        let df = cleaned_frame();
        let raw_total: i64 = df.column(VOLUME).unwrap().i64().unwrap().into_iter().flatten().sum();
        let points = DataProcessor::volume_over_time(&df, VolumePolicy::TreatAsZero).unwrap();
        assert_eq!(points.iter().map(|p| p.volume).sum::<i64>(), raw_total);
    }

    #[test]
    fn test_volume_sum_saturates_instead_of_overflowing() {
        let df = df!(
            DATE => ["2024-01-02", "2024-01-02", "2024-01-03"],
            OPEN => [1.0, 1.0, 1.0],
            HIGH => [1.0, 1.0, 1.0],
            LOW => [1.0, 1.0, 1.0],
            CLOSE => [1.0, 1.0, 1.0],
            VOLUME => [9_000_000_000_000_000_000i64, 9_000_000_000_000_000_000, 5],
            COMPANY => ["Apple Inc.", "Apple Inc.", "Apple Inc."]
        )
        .unwrap();

        let points = DataProcessor::volume_over_time(&df, VolumePolicy::Exclude).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].volume, i64::MAX);
        assert_eq!(points[1].volume, 5);
    }

    #[test]
    fn test_date_axis_round_trip() {
        let x = date_to_axis("2024-03-15").unwrap();
        assert_eq!(axis_to_date_label(x), "2024-03-15");
        assert_eq!(date_to_axis("03/15/2024"), Some(x));
        assert_eq!(date_to_axis("2024-03-15 00:00:00"), Some(x));
        assert_eq!(date_to_axis("not a date"), None);
        assert_eq!(PriceType::Close.to_string(), "Close");
    }
}
