//! # CSV Reader
//!
//! Loads delimited text into a [`DataFrame`], inferring one type per column.

use std::collections::HashMap;
use std::path::Path;

use csv_async::{AsyncReaderBuilder, StringRecord};
use serde::Serialize;
use tokio::io::AsyncRead;
use tracing::debug;

use super::TableError;
use super::frame::{Column, DataFrame};
use super::value::{DType, Value};

/// Cell contents treated as missing values
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_VALUES: &[&str] = &["True", "TRUE", "true"];
const FALSE_VALUES: &[&str] = &["False", "FALSE", "false"];

/// Parsing options for delimited files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadOptions {
    /// Field delimiter, a single ASCII character
    pub separator: String,
    /// Character used as decimal point in floating point cells
    pub decimal: char,
    /// Whether the first row holds column names
    pub header: bool,
    /// Column names used when the file has no header row
    pub names: Option<Vec<String>>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            separator: ",".to_owned(),
            decimal: '.',
            header: false,
            names: None,
        }
    }
}

impl ReadOptions {
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_decimal(mut self, decimal: char) -> Self {
        self.decimal = decimal;
        self
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Validated single byte delimiter
    pub fn delimiter(&self) -> Result<u8, TableError> {
        let mut chars = self.separator.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() => Ok(c as u8),
            _ => Err(TableError::InvalidOption(format!(
                "separator must be a single ASCII character, got {:?}",
                self.separator
            ))),
        }
    }

    fn validate(&self) -> Result<u8, TableError> {
        let delimiter = self.delimiter()?;
        if self.decimal as u32 == u32::from(delimiter) {
            return Err(TableError::InvalidOption(
                "decimal and separator must differ".to_owned(),
            ));
        }
        Ok(delimiter)
    }

    fn explicit_names(&self) -> Option<&[String]> {
        match &self.names {
            Some(names) if !self.header && !names.is_empty() => Some(names),
            _ => None,
        }
    }
}

/// Read a delimited file from disk
pub async fn read_csv(path: &Path, options: &ReadOptions) -> Result<DataFrame, TableError> {
    let file = tokio::fs::File::open(path).await?;
    let frame = read_csv_from(file, options).await?;
    debug!(path = ?path, shape = ?frame.shape(), "Loaded table");
    Ok(frame)
}

/// Read delimited text from any async reader
pub async fn read_csv_from<R>(reader: R, options: &ReadOptions) -> Result<DataFrame, TableError>
where
    R: AsyncRead + Unpin + Send,
{
    let delimiter = options.validate()?;
    let mut reader = AsyncReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .create_reader(reader);

    let mut record = StringRecord::new();
    let mut names: Option<Vec<String>> = options.explicit_names().map(<[String]>::to_vec);
    let mut cells: Vec<Vec<Option<String>>> = Vec::new();
    let mut line = 0usize;

    while reader.read_record(&mut record).await? {
        line += 1;

        let width = match &names {
            Some(names) => names.len(),
            None if options.header => {
                let header = mangle_duplicates(record.iter());
                cells = vec![Vec::new(); header.len()];
                names = Some(header);
                continue;
            }
            None => {
                let generated = (0..record.len()).map(|i| i.to_string()).collect::<Vec<_>>();
                let width = generated.len();
                names = Some(generated);
                width
            }
        };
        if cells.len() != width {
            cells = vec![Vec::new(); width];
        }

        if record.len() > width {
            return Err(TableError::Malformed(format!(
                "Error tokenizing data. Expected {width} fields in line {line}, saw {}",
                record.len()
            )));
        }

        for (i, column) in cells.iter_mut().enumerate() {
            let cell = record.get(i).filter(|raw| !NA_VALUES.contains(raw));
            column.push(cell.map(str::to_owned));
        }
    }

    let Some(names) = names else {
        return Err(TableError::EmptyData);
    };
    if cells.len() != names.len() {
        cells = vec![Vec::new(); names.len()];
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| infer_column(name, raw, options.decimal))
        .collect();
    DataFrame::new(columns)
}

/// Header names with pandas-style de-duplication (`a`, `a.1`, `a.2`).
///
/// A generated name that is already taken is suffixed again, so
/// `a, a.1, a` becomes `a, a.1, a.1.1`.
fn mangle_duplicates<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::new();

    for (i, name) in raw.enumerate() {
        let mut candidate = if name.is_empty() {
            format!("Unnamed: {i}")
        } else {
            name.to_owned()
        };

        let mut count = counts.get(&candidate).copied().unwrap_or(0);
        while count > 0 {
            counts.insert(candidate.clone(), count + 1);
            candidate = format!("{candidate}.{count}");
            count = counts.get(&candidate).copied().unwrap_or(0);
        }
        counts.insert(candidate.clone(), count + 1);
        names.push(candidate);
    }
    names
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn parse_float(raw: &str, decimal: char) -> Option<f64> {
    let raw = raw.trim();
    if decimal == '.' {
        return raw.parse().ok();
    }
    if raw.contains('.') {
        return None;
    }
    raw.replace(decimal, ".").parse().ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    if TRUE_VALUES.contains(&raw) {
        Some(true)
    } else if FALSE_VALUES.contains(&raw) {
        Some(false)
    } else {
        None
    }
}

fn infer_column(name: String, raw: Vec<Option<String>>, decimal: char) -> Column {
    if raw.is_empty() {
        return Column::new(name, DType::Object, Vec::new());
    }

    let present = || raw.iter().flatten();
    let has_nulls = raw.iter().any(Option::is_none);

    if present().next().is_none() {
        let values = vec![Value::Float(f64::NAN); raw.len()];
        return Column::new(name, DType::Float64, values);
    }

    if present().all(|s| parse_int(s).is_some()) {
        return if has_nulls {
            let values = convert(&raw, |s| parse_int(s).map(|v| Value::Float(v as f64)));
            Column::new(name, DType::Float64, values)
        } else {
            Column::new(name, DType::Int64, convert(&raw, |s| parse_int(s).map(Value::Int)))
        };
    }

    if present().all(|s| parse_float(s, decimal).is_some()) {
        let values = convert(&raw, |s| parse_float(s, decimal).map(Value::Float));
        return Column::new(name, DType::Float64, values);
    }

    if !has_nulls && present().all(|s| parse_bool(s).is_some()) {
        return Column::new(name, DType::Bool, convert(&raw, |s| parse_bool(s).map(Value::Bool)));
    }

    let values = raw
        .into_iter()
        .map(|cell| cell.map(Value::Str).unwrap_or(Value::Null))
        .collect();
    Column::new(name, DType::Object, values)
}

fn convert(raw: &[Option<String>], parse: impl Fn(&str) -> Option<Value>) -> Vec<Value> {
    raw.iter()
        .map(|cell| match cell {
            Some(s) => parse(s).unwrap_or(Value::Null),
            None => Value::Float(f64::NAN),
        })
        .collect()
}
