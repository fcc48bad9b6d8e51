//! Chart Series
//! Converts shaped data into plottable point lists shared by the live
//! plots and the PNG export.

use crate::data::{date_to_axis, PricePoint, PriceType, VolumePoint};
use crate::stats::CompanyAverage;

/// Named line: (series name, [x, y] points sorted by x).
pub type NamedLine = (String, Vec<[f64; 2]>);

/// Companies with a numeric average, in the given order.
pub fn bar_values(averages: &[CompanyAverage]) -> Vec<(String, f64)> {
    averages
        .iter()
        .filter_map(|a| a.average.value().map(|v| (a.company.clone(), v)))
        .collect()
}

/// One line per price type. Points without a parseable date or price are
/// skipped.
pub fn price_lines(points: &[PricePoint]) -> Vec<NamedLine> {
    PriceType::ALL
        .iter()
        .map(|price_type| {
            let mut line: Vec<[f64; 2]> = points
                .iter()
                .filter(|p| p.price_type == *price_type)
                .filter_map(|p| Some([date_to_axis(&p.date)?, p.price?]))
                .collect();
            line.sort_by(|a, b| a[0].total_cmp(&b[0]));
            (price_type.to_string(), line)
        })
        .collect()
}

/// One line per company, in order of first appearance.
pub fn volume_lines(points: &[VolumePoint]) -> Vec<NamedLine> {
    let mut lines: Vec<NamedLine> = Vec::new();
    for point in points {
        let Some(x) = date_to_axis(&point.date) else {
            continue;
        };
        let xy = [x, point.volume as f64];
        match lines.iter_mut().find(|(name, _)| name == &point.company) {
            Some((_, line)) => line.push(xy),
            None => lines.push((point.company.clone(), vec![xy])),
        }
    }
    for (_, line) in &mut lines {
        line.sort_by(|a, b| a[0].total_cmp(&b[0]));
    }
    lines
}

/// Padded (min, max) over the given values, `None` when empty.
pub fn axis_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return None;
    }
    if min == max {
        return Some((min - 1.0, max + 1.0));
    }
    let pad = (max - min) * 0.05;
    Some((min - pad, max + pad))
}
