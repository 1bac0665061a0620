//! Preprocessing
//!
//! Column transforms applied before the linear model: standard scaling of
//! numeric features and one-hot encoding of categorical features.
use crate::data::Frame;
use crate::errors::DriftWatchError;
use crate::utils::drop_nan;
use serde::{Deserialize, Serialize};

/// Mean and scale of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub column: String,
    pub mean: f64,
    pub scale: f64,
}

impl StandardScaler {
    /// Fit on the non-missing values. A constant or empty column gets unit scale.
    pub fn fit(column: &str, values: &[f64]) -> Self {
        let values = drop_nan(values);
        let (mean, scale) = if values.is_empty() {
            (0.0, 1.0)
        } else {
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            (mean, if std > 0.0 { std } else { 1.0 })
        };
        StandardScaler {
            column: column.to_string(),
            mean,
            scale,
        }
    }

    /// Missing values are imputed with the mean, i.e. map to 0.
    #[inline]
    pub fn transform(&self, value: f64) -> f64 {
        if value.is_nan() {
            0.0
        } else {
            (value - self.mean) / self.scale
        }
    }
}

/// Sorted vocabulary of one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub column: String,
    pub categories: Vec<String>,
}

impl OneHotEncoder {
    pub fn fit(column: &str, values: &[String]) -> Self {
        let mut categories = values.to_vec();
        categories.sort();
        categories.dedup();
        OneHotEncoder {
            column: column.to_string(),
            categories,
        }
    }

    /// Position of the indicator set to one. Unseen categories have none.
    pub fn position(&self, value: &str) -> Option<usize> {
        self.categories.binary_search_by(|c| c.as_str().cmp(value)).ok()
    }
}

/// Fitted preprocessing for the numeric and categorical columns of a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    pub scalers: Vec<StandardScaler>,
    pub encoders: Vec<OneHotEncoder>,
}

impl Preprocessor {
    pub fn fit(frame: &Frame, numeric_cols: &[String], cat_cols: &[String]) -> Result<Self, DriftWatchError> {
        let mut scalers = Vec::with_capacity(numeric_cols.len());
        for name in numeric_cols {
            let values = frame
                .require(name)?
                .as_numeric()
                .ok_or_else(|| DriftWatchError::InvalidData(format!("column {} is not numeric", name)))?;
            scalers.push(StandardScaler::fit(name, values));
        }
        let mut encoders = Vec::with_capacity(cat_cols.len());
        for name in cat_cols {
            encoders.push(OneHotEncoder::fit(name, &frame.require(name)?.to_categories()));
        }
        Ok(Preprocessor { scalers, encoders })
    }

    /// Width of the encoded design matrix.
    pub fn n_features(&self) -> usize {
        self.scalers.len() + self.encoders.iter().map(|e| e.categories.len()).sum::<usize>()
    }

    /// Encode a frame into a row major design matrix.
    pub fn transform(&self, frame: &Frame) -> Result<Vec<Vec<f64>>, DriftWatchError> {
        let n_rows = frame.n_rows();
        let width = self.n_features();
        let mut design = vec![vec![0.0; width]; n_rows];

        for (j, scaler) in self.scalers.iter().enumerate() {
            let values = frame
                .require(&scaler.column)?
                .as_numeric()
                .ok_or_else(|| DriftWatchError::InvalidData(format!("column {} is not numeric", scaler.column)))?;
            for (row, v) in design.iter_mut().zip(values) {
                row[j] = scaler.transform(*v);
            }
        }

        let mut offset = self.scalers.len();
        for encoder in &self.encoders {
            let values = frame.require(&encoder.column)?.to_categories();
            for (row, v) in design.iter_mut().zip(&values) {
                if let Some(p) = encoder.position(v) {
                    row[offset + p] = 1.0;
                }
            }
            offset += encoder.categories.len();
        }
        Ok(design)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_scaler() {
        let scaler = StandardScaler::fit("f1", &[1.0, 2.0, 3.0, f64::NAN]);
        assert_relative_eq!(scaler.mean, 2.0);
        assert_relative_eq!(scaler.scale, (2.0_f64 / 3.0).sqrt());
        assert_eq!(scaler.transform(f64::NAN), 0.0);

        let constant = StandardScaler::fit("f2", &[4.0, 4.0]);
        assert_eq!(constant.scale, 1.0);
        assert_eq!(constant.transform(4.0), 0.0);
    }

    #[test]
    fn test_unseen_category_encodes_to_zeros() {
        let frame = Frame::new()
            .with_column("f1", Column::Numeric(vec![0.0, 2.0]))
            .unwrap()
            .with_column("cat", Column::Categorical(vec!["B".into(), "A".into()]))
            .unwrap();
        let pre = Preprocessor::fit(&frame, &["f1".to_string()], &["cat".to_string()]).unwrap();
        assert_eq!(pre.n_features(), 3);

        let live = Frame::new()
            .with_column("f1", Column::Numeric(vec![1.0, 1.0]))
            .unwrap()
            .with_column("cat", Column::Categorical(vec!["A".into(), "C".into()]))
            .unwrap();
        let design = pre.transform(&live).unwrap();
        assert_eq!(design[0], vec![0.0, 1.0, 0.0]);
        assert_eq!(design[1], vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let frame = Frame::new().with_column("f1", Column::Numeric(vec![0.0])).unwrap();
        assert!(Preprocessor::fit(&frame, &["f2".to_string()], &[]).is_err());
    }
}
