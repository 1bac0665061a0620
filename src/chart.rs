//! Charts
//!
//! Metric histories pushed after every batch. Persistence is best effort.
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

pub trait ChartSink {
    /// Receive the full history of one metric, one value per window.
    fn record_series(&mut self, name: &str, values: &[f64], threshold: Option<f64>);
}

/// Discards every series.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullChart;

impl ChartSink for NullChart {
    fn record_series(&mut self, _name: &str, _values: &[f64], _threshold: Option<f64>) {}
}

/// Writes each series to `{dir}/{name}.csv` with the columns
/// `window,value,threshold`, replacing the previous file.
#[derive(Debug, Clone)]
pub struct CsvSeriesWriter {
    dir: PathBuf,
}

impl CsvSeriesWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        CsvSeriesWriter {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn series_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", name))
    }

    fn write(&self, name: &str, values: &[f64], threshold: Option<f64>) -> Result<(), Box<dyn std::error::Error>> {
        fs::create_dir_all(&self.dir)?;
        let mut writer = csv::Writer::from_path(self.series_path(name))?;
        writer.write_record(["window", "value", "threshold"])?;
        let threshold = threshold.map(|t| t.to_string()).unwrap_or_default();
        for (i, v) in values.iter().enumerate() {
            let value = if v.is_nan() { String::new() } else { v.to_string() };
            writer.write_record([(i + 1).to_string(), value, threshold.clone()])?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl ChartSink for CsvSeriesWriter {
    fn record_series(&mut self, name: &str, values: &[f64], threshold: Option<f64>) {
        if let Err(e) = self.write(name, values, threshold) {
            warn!("Unable to write series {}: {}", name, e);
        }
    }
}
