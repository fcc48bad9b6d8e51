//! Stats module - Aggregate share price statistics

mod calculator;

pub use calculator::{AveragePrice, CompanyAverage, StatsCalculator};
