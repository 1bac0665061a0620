//! Data
//!
//! Column oriented containers for the baseline and the incoming batches.
use crate::errors::DriftWatchError;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// A single named feature column.
///
/// Numeric columns use `NaN` for missing values, categorical columns
/// keep the raw string of each cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl Column {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Categorical(_) => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&[String]> {
        match self {
            Column::Numeric(_) => None,
            Column::Categorical(v) => Some(v),
        }
    }

    /// Categorical view of the column. Numeric values are rendered with
    /// their display form so that integer coded categories still work.
    pub fn to_categories(&self) -> Vec<String> {
        match self {
            Column::Numeric(v) => v.iter().map(|x| x.to_string()).collect(),
            Column::Categorical(v) => v.clone(),
        }
    }

    /// Numeric view of the column, with the number of cells that were
    /// neither a number nor a missing value token. Those cells become `NaN`.
    pub fn to_numeric(&self) -> (Vec<f64>, usize) {
        match self {
            Column::Numeric(v) => (v.clone(), 0),
            Column::Categorical(v) => {
                let mut unparsed = 0;
                let values = v
                    .iter()
                    .map(|c| {
                        parse_cell(c).unwrap_or_else(|| {
                            unparsed += 1;
                            f64::NAN
                        })
                    })
                    .collect();
                (values, unparsed)
            }
        }
    }

    /// Select the rows at `index`, in the order given.
    pub fn take(&self, index: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(index.iter().map(|&i| v[i]).collect()),
            Column::Categorical(v) => Column::Categorical(index.iter().map(|&i| v[i].clone()).collect()),
        }
    }

    fn extend(&mut self, other: &Column) -> Result<(), DriftWatchError> {
        match (self, other) {
            (Column::Numeric(a), Column::Numeric(b)) => a.extend_from_slice(b),
            (Column::Categorical(a), Column::Categorical(b)) => a.extend_from_slice(b),
            // A numeric column appended to a categorical one keeps the categorical type.
            (Column::Categorical(a), Column::Numeric(_)) => a.extend(other.to_categories()),
            (Column::Numeric(_), Column::Categorical(_)) => {
                return Err(DriftWatchError::InvalidData(
                    "cannot append categorical values to a numeric column".to_string(),
                ))
            }
        }
        Ok(())
    }
}

/// An ordered set of equally long named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    names: Vec<String>,
    columns: HashMap<String, Column>,
    rows: usize,
}

impl Frame {
    pub fn new() -> Self {
        Frame::default()
    }

    /// Add a column, replacing any column with the same name.
    pub fn with_column(mut self, name: &str, column: Column) -> Result<Self, DriftWatchError> {
        self.insert(name, column)?;
        Ok(self)
    }

    pub fn insert(&mut self, name: &str, column: Column) -> Result<(), DriftWatchError> {
        if !self.names.is_empty() && column.len() != self.rows {
            return Err(DriftWatchError::InvalidData(format!(
                "column {} has {} rows, expected {}",
                name,
                column.len(),
                self.rows
            )));
        }
        self.rows = column.len();
        if self.columns.insert(name.to_string(), column).is_none() {
            self.names.push(name.to_string());
        }
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Column lookup that fails with `InvalidData` when absent.
    pub fn require(&self, name: &str) -> Result<&Column, DriftWatchError> {
        self.column(name)
            .ok_or_else(|| DriftWatchError::InvalidData(format!("column {} not found", name)))
    }

    /// Convert the column `name` to numeric in place. Returns the number of
    /// cells that could not be parsed and were stored as `NaN`.
    pub fn coerce_numeric(&mut self, name: &str) -> Result<usize, DriftWatchError> {
        let (values, unparsed) = self.require(name)?.to_numeric();
        self.insert(name, Column::Numeric(values))?;
        Ok(unparsed)
    }

    /// Binary labels of a target column. Values must be 0 or 1.
    pub fn labels(&self, target: &str) -> Result<Vec<u8>, DriftWatchError> {
        let values = self
            .require(target)?
            .as_numeric()
            .ok_or_else(|| DriftWatchError::InvalidData(format!("target column {} is not numeric", target)))?;
        values
            .iter()
            .map(|&v| {
                if v == 0.0 {
                    Ok(0)
                } else if v == 1.0 {
                    Ok(1)
                } else {
                    Err(DriftWatchError::InvalidData(format!(
                        "target column {} contains non binary value {}",
                        target, v
                    )))
                }
            })
            .collect()
    }

    /// Select the rows at `index`, keeping the column order.
    pub fn take(&self, index: &[usize]) -> Frame {
        let columns = self
            .names
            .iter()
            .map(|n| (n.clone(), self.columns[n].take(index)))
            .collect();
        Frame {
            names: self.names.clone(),
            columns,
            rows: index.len(),
        }
    }

    /// Concatenate the rows of `other` below this frame. Only the columns
    /// present in both frames are kept.
    pub fn append(&self, other: &Frame) -> Result<Frame, DriftWatchError> {
        let mut frame = Frame::new();
        for name in self.names.iter().filter(|n| other.has_column(n)) {
            let mut column = self.columns[name].clone();
            column.extend(&other.columns[name])?;
            frame.insert(name, column)?;
        }
        Ok(frame)
    }

    /// Read a frame from a csv file with a header row.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Frame, DriftWatchError> {
        let file = std::fs::File::open(path.as_ref())
            .map_err(|e| DriftWatchError::UnableToRead(format!("{}: {}", path.as_ref().display(), e)))?;
        Frame::from_csv_reader(file)
    }

    /// Read a frame from any csv source with a header row.
    ///
    /// A column is numeric when every cell parses as a float or is a missing
    /// value token (empty, `NA`, `N/A`, `NaN`, `null`, `None`), otherwise it
    /// is categorical. Missing numeric cells become `NaN`.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Frame, DriftWatchError> {
        let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = csv_reader
            .headers()
            .map_err(|e| DriftWatchError::UnableToRead(e.to_string()))?
            .clone();
        let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for result in csv_reader.records() {
            let record = result.map_err(|e| DriftWatchError::UnableToRead(e.to_string()))?;
            for (i, cell) in record.iter().enumerate().take(headers.len()) {
                raw[i].push(cell.to_string());
            }
        }

        let mut frame = Frame::new();
        for (name, cells) in headers.iter().zip(raw) {
            frame.insert(name, parse_column(cells))?;
        }
        Ok(frame)
    }

    /// Write the frame as csv with a header row. Missing numeric values are
    /// written as empty cells.
    pub fn to_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<(), DriftWatchError> {
        let mut writer =
            csv::Writer::from_path(path.as_ref()).map_err(|e| DriftWatchError::UnableToWrite(e.to_string()))?;
        writer
            .write_record(&self.names)
            .map_err(|e| DriftWatchError::UnableToWrite(e.to_string()))?;
        for i in 0..self.rows {
            let record: Vec<String> = self
                .names
                .iter()
                .map(|n| match &self.columns[n] {
                    Column::Numeric(v) if v[i].is_nan() => String::new(),
                    Column::Numeric(v) => v[i].to_string(),
                    Column::Categorical(v) => v[i].clone(),
                })
                .collect();
            writer
                .write_record(&record)
                .map_err(|e| DriftWatchError::UnableToWrite(e.to_string()))?;
        }
        writer.flush().map_err(|e| DriftWatchError::UnableToWrite(e.to_string()))
    }
}

/// Cells read as a missing value, compared without case.
const MISSING_TOKENS: [&str; 6] = ["", "na", "n/a", "nan", "null", "none"];

fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    MISSING_TOKENS.iter().any(|t| cell.eq_ignore_ascii_case(t))
}

/// `Some(NaN)` for a missing cell, `None` when the cell is not a number.
fn parse_cell(cell: &str) -> Option<f64> {
    if is_missing(cell) {
        Some(f64::NAN)
    } else {
        cell.trim().parse::<f64>().ok()
    }
}

fn parse_column(cells: Vec<String>) -> Column {
    let parsed: Option<Vec<f64>> = cells.iter().map(|c| parse_cell(c)).collect();
    match parsed {
        Some(values) => Column::Numeric(values),
        None => Column::Categorical(cells),
    }
}

/// One ordered unit of incoming rows.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Strictly increasing, 1-based position in the ingestion order.
    pub index: usize,
    /// Where the batch came from, e.g. the file name.
    pub source: String,
    pub frame: Frame,
}

impl Batch {
    pub fn new(index: usize, source: &str, frame: Frame) -> Self {
        Batch {
            index,
            source: source.to_string(),
            frame,
        }
    }
}
