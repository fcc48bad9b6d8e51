//! Statistics Calculator Module
//! Per-company average share price.

use crate::data::loader::{COMPANY, PRICE_COLUMNS};
use crate::data::{DataProcessor, ProcessorError};
use polars::prelude::*;
use statrs::statistics::Statistics;

/// Average price of one company, or the "no data" variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AveragePrice {
    Value(f64),
    NoData,
}

impl AveragePrice {
    pub fn value(self) -> Option<f64> {
        match self {
            AveragePrice::Value(v) => Some(v),
            AveragePrice::NoData => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyAverage {
    pub company: String,
    pub average: AveragePrice,
}

/// Handles the dashboard's aggregate statistics.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Distinct non-empty company names, in order of first appearance.
    pub fn unique_companies(df: &DataFrame) -> Result<Vec<String>, ProcessorError> {
        let names = df.column(COMPANY)?.cast(&DataType::String)?;
        let mut companies: Vec<String> = Vec::new();
        for name in names.str()?.into_iter().flatten() {
            if !name.is_empty() && !companies.iter().any(|c| c == name) {
                companies.push(name.to_string());
            }
        }
        Ok(companies)
    }

    /// Mean of the non-null values of one row, `None` when all are null.
    pub fn row_mean(values: &[Option<f64>]) -> Option<f64> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            None
        } else {
            Some(present.mean())
        }
    }

    /// Mean over rows of the per-row mean of Open, High, Low and Close.
    pub fn average_price(df: &DataFrame, company: &str) -> Result<AveragePrice, ProcessorError> {
        let company_df = DataProcessor::filter_company(df, company)?;

        let mut price_columns = Vec::with_capacity(PRICE_COLUMNS.len());
        for name in PRICE_COLUMNS {
            price_columns.push(company_df.column(name)?.cast(&DataType::Float64)?);
        }
        let chunks = price_columns
            .iter()
            .map(|c| c.f64())
            .collect::<PolarsResult<Vec<_>>>()?;

        let row_means: Vec<f64> = (0..company_df.height())
            .filter_map(|i| {
                let row: Vec<Option<f64>> = chunks.iter().map(|ca| ca.get(i)).collect();
                Self::row_mean(&row)
            })
            .collect();

        if row_means.is_empty() {
            return Ok(AveragePrice::NoData);
        }
        Ok(AveragePrice::Value(row_means.mean()))
    }

    /// Average price for each company, in the given order.
    pub fn average_prices(
        df: &DataFrame,
        companies: &[String],
    ) -> Result<Vec<CompanyAverage>, ProcessorError> {
        companies
            .iter()
            .map(|company| {
                Ok(CompanyAverage {
                    company: company.clone(),
                    average: Self::average_price(df, company)?,
                })
            })
            .collect()
    }
}
