//! Display Formatter Module
//! Maps cleaned cells to the strings shown in the data table.

use super::cleaner::is_numeric_dtype;
use super::loader::{PRICE_COLUMNS, VOLUME};
use polars::prelude::*;

/// A single cell as the formatter sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Float(f64),
    Int(i64),
    Text(&'a str),
    Missing,
}

/// Fully formatted table, ready for the table widget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DisplayTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Insert `,` every three digits of the integer part of a rendered number.
fn group_thousands(rendered: &str) -> String {
    let (sign, unsigned) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(pos) => unsigned.split_at(pos),
        None => (unsigned, ""),
    };
    if !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return rendered.to_string();
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}{}", sign, grouped, frac_part)
}

/// Fixed decimals with thousands separators, e.g. `1234.5 -> "1,234.50"`.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    group_thousands(&format!("{:.*}", decimals, value))
}

/// Currency with thousands separators and two decimals.
pub fn format_currency(value: f64) -> String {
    format!("${}", format_grouped(value, 2))
}

/// Format one cell according to its column's role.
pub fn format_cell(value: CellValue<'_>, column: &str) -> String {
    let number = match value {
        CellValue::Text(text) => return text.to_string(),
        CellValue::Missing => return String::new(),
        CellValue::Float(v) => v,
        CellValue::Int(v) => {
            if column == VOLUME {
                return group_thousands(&v.to_string());
            }
            v as f64
        }
    };

    if PRICE_COLUMNS.contains(&column) {
        format_currency(number)
    } else if column == VOLUME {
        format_grouped(number, 0)
    } else {
        format_grouped(number, 1)
    }
}

/// Applies the cell formatter across a whole table.
pub struct DataFormatter;

impl DataFormatter {
    /// Format every cell of the cleaned table for display.
    pub fn format_table(df: &DataFrame) -> PolarsResult<DisplayTable> {
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut formatted_columns: Vec<Vec<String>> = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let name = column.name().as_str();
            let cells: Vec<String> = if column.dtype().is_float() {
                let as_f64 = column.cast(&DataType::Float64)?;
                as_f64
                    .f64()?
                    .into_iter()
                    .map(|v| format_cell(v.map_or(CellValue::Missing, CellValue::Float), name))
                    .collect()
            } else if is_numeric_dtype(column.dtype()) {
                let as_i64 = column.cast(&DataType::Int64)?;
                as_i64
                    .i64()?
                    .into_iter()
                    .map(|v| format_cell(v.map_or(CellValue::Missing, CellValue::Int), name))
                    .collect()
            } else {
                let text = column.cast(&DataType::String)?;
                text.str()?
                    .into_iter()
                    .map(|v| format_cell(v.map_or(CellValue::Missing, CellValue::Text), name))
                    .collect()
            };
            formatted_columns.push(cells);
        }

        let rows = (0..df.height())
            .map(|i| {
                formatted_columns
                    .iter()
                    .map(|cells| cells[i].clone())
                    .collect()
            })
            .collect();

        Ok(DisplayTable { headers, rows })
    }
}
