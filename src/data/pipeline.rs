//! Dashboard Pipeline
//! Runs load -> clean -> format / aggregate / reshape once per load.

use super::cleaner::{CleanReport, CleanerError, DataCleaner};
use super::formatter::{DataFormatter, DisplayTable};
use super::loader::{content_hash, DataLoader, LoaderError};
use super::processor::{DataProcessor, PricePoint, ProcessorError, VolumePoint, VolumePolicy};
use crate::stats::{CompanyAverage, StatsCalculator};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Clean(#[from] CleanerError),
    #[error(transparent)]
    Process(#[from] ProcessorError),
    #[error("Failed to format table: {0}")]
    Format(#[from] PolarsError),
}

/// Everything the dashboard renders, derived from one version of the file.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub source: PathBuf,
    pub content_hash: u64,
    /// Cleaned, numeric table. Aggregation and reshaping read this.
    pub table: DataFrame,
    /// Formatted copy for the table view only.
    pub display: DisplayTable,
    pub report: CleanReport,
    /// Companies present in the data, first-seen order.
    pub companies: Vec<String>,
    pub averages: Vec<CompanyAverage>,
    pub volume: Vec<VolumePoint>,
}

impl Dashboard {
    /// Load and prepare a file.
    ///
    /// `expected_companies` not present in the file still get an entry in
    /// `averages`, reported as having no data.
    pub fn load(
        path: &Path,
        policy: VolumePolicy,
        expected_companies: &[String],
    ) -> Result<Self, PipelineError> {
        let (raw, hash) = DataLoader::load_csv(path)?;
        Self::from_frame(&raw, path, hash, policy, expected_companies)
    }

    /// Prepare an already loaded raw table.
    pub fn from_frame(
        raw: &DataFrame,
        source: &Path,
        content_hash: u64,
        policy: VolumePolicy,
        expected_companies: &[String],
    ) -> Result<Self, PipelineError> {
        DataLoader::check_columns(raw)?;
        let cleaned = DataCleaner::clean(raw)?;
        let table = cleaned.df;

        let display = DataFormatter::format_table(&table)?;
        let companies = StatsCalculator::unique_companies(&table)?;

        let mut averaged = companies.clone();
        for company in expected_companies {
            if !averaged.contains(company) {
                averaged.push(company.clone());
            }
        }
        let averages = StatsCalculator::average_prices(&table, &averaged)?;
        let volume = DataProcessor::volume_over_time(&table, policy)?;

        Ok(Self {
            source: source.to_path_buf(),
            content_hash,
            table,
            display,
            report: cleaned.report,
            companies,
            averages,
            volume,
        })
    }

    /// Whether the file on disk no longer matches what was loaded.
    pub fn is_stale(&self) -> bool {
        match std::fs::read(&self.source) {
            Ok(bytes) => content_hash(&bytes) != self.content_hash,
            Err(_) => true,
        }
    }
}

/// Melted price series for the selected company, keyed by
/// (content hash, company).
#[derive(Default)]
pub struct PriceSeriesCache {
    key: Option<(u64, String)>,
    series: Vec<PricePoint>,
}

impl PriceSeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &mut self,
        dashboard: &Dashboard,
        company: &str,
    ) -> Result<&[PricePoint], ProcessorError> {
        let fresh = matches!(
            &self.key,
            Some((hash, cached)) if *hash == dashboard.content_hash && cached == company
        );
        if fresh {
            log::debug!("Price series cache hit for {}", company);
        } else {
            self.series = DataProcessor::melt_prices(&dashboard.table, company)?;
            self.key = Some((dashboard.content_hash, company.to_string()));
        }
        Ok(&self.series)
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.series.clear();
    }
}
