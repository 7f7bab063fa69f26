//! # Summary statistics
//!
//! Numeric columns get `count, mean, std, min, 25%, 50%, 75%, max`. When a
//! table has no numeric column, the remaining columns get
//! `count, unique, top, freq` instead.

use std::collections::HashMap;

use serde_json::Map;

use super::TableError;
use super::frame::{Column, DataFrame};
use super::value::Value;

const NUMERIC_STATS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];
const OBJECT_STATS: [&str; 4] = ["count", "unique", "top", "freq"];

/// Per-column statistics in column order
#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    stats: Vec<(String, Vec<(&'static str, Value)>)>,
}

impl Describe {
    /// Statistic rows of the summary (`count`, `mean`, ...)
    pub fn index(&self) -> Vec<&'static str> {
        self.stats
            .first()
            .map(|(_, stats)| stats.iter().map(|(name, _)| *name).collect())
            .unwrap_or_default()
    }

    pub fn columns(&self) -> Vec<&str> {
        self.stats.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get(&self, column: &str, stat: &str) -> Option<&Value> {
        self.stats
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, stats)| stats.iter().find(|(s, _)| *s == stat))
            .map(|(_, value)| value)
    }

    /// `{column: {stat: value}}`
    pub fn to_json(&self) -> serde_json::Value {
        let columns: Map<String, serde_json::Value> = self
            .stats
            .iter()
            .map(|(column, stats)| {
                let stats: Map<String, serde_json::Value> = stats
                    .iter()
                    .map(|(name, value)| ((*name).to_owned(), value.to_json()))
                    .collect();
                (column.clone(), serde_json::Value::Object(stats))
            })
            .collect();
        serde_json::Value::Object(columns)
    }
}

impl DataFrame {
    /// Summary statistics of the table
    pub fn describe(&self) -> Result<Describe, TableError> {
        if self.width() == 0 {
            return Err(TableError::NoColumns);
        }

        let numeric: Vec<&Column> = self
            .columns()
            .iter()
            .filter(|c| c.dtype().is_numeric())
            .collect();

        let stats = if numeric.is_empty() {
            self.columns()
                .iter()
                .map(|c| (c.name().to_owned(), describe_object(c)))
                .collect()
        } else {
            numeric
                .into_iter()
                .map(|c| (c.name().to_owned(), describe_numeric(c)))
                .collect()
        };

        Ok(Describe { stats })
    }
}

fn describe_numeric(column: &Column) -> Vec<(&'static str, Value)> {
    let mut values: Vec<f64> = column.values().iter().filter_map(Value::as_f64).collect();
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let nan = f64::NAN;
    let (mean, std, min, q1, median, q3, max) = if count == 0 {
        (nan, nan, nan, nan, nan, nan, nan)
    } else {
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if count > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            var.sqrt()
        } else {
            nan
        };
        (
            mean,
            std,
            values[0],
            quantile(&values, 0.25),
            quantile(&values, 0.5),
            quantile(&values, 0.75),
            values[count - 1],
        )
    };

    NUMERIC_STATS
        .into_iter()
        .zip([count as f64, mean, std, min, q1, median, q3, max])
        .map(|(name, v)| (name, Value::Float(v)))
        .collect()
}

/// Linear interpolation between closest ranks on sorted data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn describe_object(column: &Column) -> Vec<(&'static str, Value)> {
    let present: Vec<&Value> = column.values().iter().filter(|v| !v.is_null()).collect();

    // keyed by display form; first occurrence wins ties
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, value) in present.iter().enumerate() {
        counts
            .entry(value.to_string())
            .or_insert((0, position))
            .0 += 1;
    }

    let top = counts
        .values()
        .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
        .map(|&(freq, position)| (present[position].clone(), freq));

    let (top, freq) = match top {
        Some((value, freq)) => (value, Value::Int(freq as i64)),
        None => (Value::Null, Value::Null),
    };

    OBJECT_STATS
        .into_iter()
        .zip([
            Value::Int(present.len() as i64),
            Value::Int(counts.len() as i64),
            top,
            freq,
        ])
        .collect()
}
