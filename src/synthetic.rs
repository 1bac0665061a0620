//! Synthetic Data
//!
//! Generator for a labelled demo stream: a stable period, a period with data
//! drift, and a period where the relationship between features and label flips.
use crate::constants::STREAM_FILE_PREFIX;
use crate::data::{Column, Frame};
use crate::errors::DriftWatchError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};

/// Draw from a normal distribution (Box-Muller).
pub fn sample_normal(rng: &mut StdRng, mean: f64, std: f64) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    mean + std * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// `n` independent draws from a normal distribution.
pub fn normal_vec(rng: &mut StdRng, n: usize, mean: f64, std: f64) -> Vec<f64> {
    (0..n).map(|_| sample_normal(rng, mean, std)).collect()
}

/// `n` draws of `"A"` with probability `p_a`, `"B"` otherwise.
pub fn binary_categories(rng: &mut StdRng, n: usize, p_a: f64) -> Vec<String> {
    (0..n)
        .map(|_| (if rng.gen::<f64>() < p_a { "A" } else { "B" }).to_string())
        .collect()
}

/// Shape of one generated day.
#[derive(Debug, Clone, Copy)]
pub struct DayProfile {
    pub mean_shift: f64,
    pub var_scale: f64,
    /// Probability of category `A`.
    pub p_a: f64,
    /// Use the flipped feature to label relationship.
    pub concept: bool,
}

impl DayProfile {
    pub const STABLE: DayProfile = DayProfile {
        mean_shift: 0.0,
        var_scale: 1.0,
        p_a: 0.7,
        concept: false,
    };
    pub const DATA_DRIFT: DayProfile = DayProfile {
        mean_shift: 0.8,
        var_scale: 1.3,
        p_a: 0.5,
        concept: false,
    };
    pub const CONCEPT_DRIFT: DayProfile = DayProfile {
        mean_shift: 1.0,
        var_scale: 1.4,
        p_a: 0.45,
        concept: true,
    };
}

/// Generate one day of `n` rows with numeric features `f1`, `f2`, `f3`,
/// categorical feature `cat` and binary label `y`.
pub fn generate_day(rng: &mut StdRng, n: usize, profile: DayProfile) -> Result<Frame, DriftWatchError> {
    let DayProfile {
        mean_shift,
        var_scale,
        p_a,
        concept,
    } = profile;
    let f1 = normal_vec(rng, n, mean_shift, var_scale);
    let f2 = normal_vec(rng, n, 1.0 + mean_shift, 1.5 * var_scale);
    let f3 = normal_vec(rng, n, -1.0 + mean_shift, 0.5 * var_scale);
    let cat = binary_categories(rng, n, p_a);

    let y: Vec<f64> = (0..n)
        .map(|i| {
            let is_a = cat[i] == "A";
            let lin = if concept {
                let cat_effect = if is_a { -0.3 } else { 0.7 };
                -1.2 * f1[i] + 1.4 * f2[i] - 0.5 * f3[i] + cat_effect + 0.3
            } else {
                let cat_effect = if is_a { 0.5 } else { -0.5 };
                1.5 * f1[i] - 1.0 * f2[i] + 0.8 * f3[i] + cat_effect
            };
            let prob = 1.0 / (1.0 + (-lin).exp());
            if rng.gen::<f64>() < prob {
                1.0
            } else {
                0.0
            }
        })
        .collect();

    let columns = vec![
        ("f1", Column::Numeric(f1)),
        ("f2", Column::Numeric(f2)),
        ("f3", Column::Numeric(f3)),
        ("cat", Column::Categorical(cat)),
        ("y", Column::Numeric(y)),
    ];
    let mut frame = Frame::new();
    for (name, column) in columns {
        frame.insert(name, column)?;
    }
    Ok(frame)
}

/// Profile of day `day` (1-based) in the 30 day demo stream.
pub fn demo_profile(day: usize) -> DayProfile {
    match day {
        0..=7 => DayProfile::STABLE,
        8..=15 => DayProfile::DATA_DRIFT,
        _ => DayProfile::CONCEPT_DRIFT,
    }
}

/// Write the demo data set under `out_dir`: `train.csv` holding the seven
/// stable days, and `stream/stream_NNNN.csv` for each of the 30 days.
///
/// Returns the paths of the baseline file and the stream directory.
pub fn write_demo_data<P: AsRef<Path>>(
    out_dir: P,
    rows_per_day: usize,
    seed: u64,
) -> Result<(PathBuf, PathBuf), DriftWatchError> {
    let out_dir = out_dir.as_ref();
    let stream_dir = out_dir.join("stream");
    fs::create_dir_all(&stream_dir).map_err(|e| DriftWatchError::UnableToWrite(e.to_string()))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut baseline: Option<Frame> = None;
    for day in 1..=30 {
        let profile = demo_profile(day);
        let frame = generate_day(&mut rng, rows_per_day, profile)?
            .with_column("day", Column::Numeric(vec![day as f64; rows_per_day]))?;
        frame.to_csv_path(stream_dir.join(format!("{}{:04}.csv", STREAM_FILE_PREFIX, day)))?;
        if day <= 7 {
            baseline = Some(match baseline {
                Some(b) => b.append(&frame)?,
                None => frame,
            });
        }
    }

    let baseline_path = out_dir.join("train.csv");
    if let Some(b) = baseline {
        b.to_csv_path(&baseline_path)?;
    }
    log::info!("Wrote baseline and stream to {}", out_dir.display());
    Ok((baseline_path, stream_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_normal_moments() {
        let mut rng = StdRng::seed_from_u64(0);
        let v = normal_vec(&mut rng, 20000, 2.0, 3.0);
        let mean = v.iter().sum::<f64>() / v.len() as f64;
        let var = v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / v.len() as f64;
        assert!((mean - 2.0).abs() < 0.1);
        assert!((var.sqrt() - 3.0).abs() < 0.1);
    }

    #[test]
    fn test_generate_day_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let frame = generate_day(&mut rng, 500, DayProfile::STABLE).unwrap();
        assert_eq!(frame.n_rows(), 500);
        assert_eq!(frame.names(), &["f1", "f2", "f3", "cat", "y"]);
        let labels = frame.labels("y").unwrap();
        assert!(labels.contains(&0) && labels.contains(&1));
    }

    #[test]
    fn test_write_demo_data() {
        let dir = tempfile::tempdir().unwrap();
        let (baseline, stream) = write_demo_data(dir.path(), 50, 42).unwrap();
        let frame = Frame::from_csv_path(&baseline).unwrap();
        assert_eq!(frame.n_rows(), 350);
        let files = fs::read_dir(&stream).unwrap().count();
        assert_eq!(files, 30);
    }
}
