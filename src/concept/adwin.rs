//! ADWIN
//!
//! Adaptive windowing. The window is stored as an exponential histogram of
//! buckets, and is shrunk from the oldest end whenever two sub-windows have
//! means that differ by more than the Hoeffding style bound allows.
use crate::concept::{ChangeDetector, DetectorSignal};
use crate::constants::{ADWIN_CLOCK, ADWIN_GRACE_PERIOD, ADWIN_MAX_BUCKETS, ADWIN_MIN_WINDOW_LENGTH};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    total: f64,
    variance: f64,
}

/// Adaptive windowing change detector.
#[derive(Debug, Clone)]
pub struct Adwin {
    delta: f64,
    /// `rows[i]` holds buckets of `2^i` observations, newest at the front.
    rows: Vec<VecDeque<Bucket>>,
    width: usize,
    total: f64,
    variance: f64,
    tick: usize,
}

impl Adwin {
    pub fn new(delta: f64) -> Self {
        Adwin {
            delta,
            rows: vec![VecDeque::new()],
            width: 0,
            total: 0.0,
            variance: 0.0,
            tick: 0,
        }
    }

    /// Number of observations in the current window.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Mean of the current window.
    pub fn estimation(&self) -> f64 {
        if self.width == 0 {
            0.0
        } else {
            self.total / self.width as f64
        }
    }

    fn insert(&mut self, x: f64) {
        self.width += 1;
        self.rows[0].push_front(Bucket { total: x, variance: 0.0 });
        if self.width > 1 {
            let prev = (self.width - 1) as f64;
            self.variance += prev * (x - self.total / prev).powi(2) / self.width as f64;
        }
        self.total += x;
        self.compress();
    }

    fn compress(&mut self) {
        let mut i = 0;
        while i < self.rows.len() {
            if self.rows[i].len() <= ADWIN_MAX_BUCKETS {
                break;
            }
            let n = bucket_size(i);
            // Two oldest buckets of this row merge into one of the next row.
            let (Some(b1), Some(b2)) = (self.rows[i].pop_back(), self.rows[i].pop_back()) else {
                break;
            };
            let (mu1, mu2) = (b1.total / n, b2.total / n);
            let merged = Bucket {
                total: b1.total + b2.total,
                variance: b1.variance + b2.variance + n * n * (mu1 - mu2).powi(2) / (2.0 * n),
            };
            if i + 1 == self.rows.len() {
                self.rows.push(VecDeque::new());
            }
            self.rows[i + 1].push_front(merged);
            i += 1;
        }
    }

    fn delete_oldest(&mut self) {
        let Some(level) = self.rows.iter().rposition(|r| !r.is_empty()) else {
            return;
        };
        let Some(bucket) = self.rows[level].pop_back() else {
            return;
        };
        let n1 = bucket_size(level);
        self.width -= n1 as usize;
        self.total -= bucket.total;
        if self.width == 0 {
            self.variance = 0.0;
        } else {
            let w = self.width as f64;
            let u1 = bucket.total / n1;
            self.variance -= bucket.variance + n1 * w * (u1 - self.total / w).powi(2) / (n1 + w);
            self.variance = self.variance.max(0.0);
        }
        while self.rows.len() > 1 && self.rows.last().is_some_and(|r| r.is_empty()) {
            self.rows.pop();
        }
    }

    fn detect_change(&mut self) -> bool {
        let mut changed = false;
        let mut reduce = true;
        while reduce {
            reduce = false;
            let (mut n0, mut u0) = (0.0, 0.0);
            let (mut n1, mut u1) = (self.width as f64, self.total);
            'scan: for level in (0..self.rows.len()).rev() {
                let n2 = bucket_size(level);
                for bucket in self.rows[level].iter().rev() {
                    n0 += n2;
                    n1 -= n2;
                    u0 += bucket.total;
                    u1 -= bucket.total;
                    if n1 <= 0.0 {
                        break 'scan;
                    }
                    let min_len = ADWIN_MIN_WINDOW_LENGTH as f64;
                    if n0 >= min_len && n1 >= min_len && self.evaluate_cut(n0, n1, u0, u1) {
                        reduce = true;
                        changed = true;
                        break 'scan;
                    }
                }
            }
            if reduce {
                self.delete_oldest();
            }
        }
        changed
    }

    fn evaluate_cut(&self, n0: f64, n1: f64, u0: f64, u1: f64) -> bool {
        let min_len = ADWIN_MIN_WINDOW_LENGTH as f64;
        let width = self.width as f64;
        let diff = (u0 / n0 - u1 / n1).abs();
        let v = self.variance / width;
        let dd = (2.0 * width.ln() / self.delta).ln();
        let m = 1.0 / (n0 - min_len + 1.0) + 1.0 / (n1 - min_len + 1.0);
        let epsilon = (2.0 * m * v * dd).sqrt() + 2.0 / 3.0 * dd * m;
        diff > epsilon
    }
}

fn bucket_size(level: usize) -> f64 {
    (1u64 << level) as f64
}

impl ChangeDetector for Adwin {
    fn update(&mut self, x: f64) -> DetectorSignal {
        self.tick += 1;
        self.insert(x);
        let change_detected =
            self.tick % ADWIN_CLOCK == 0 && self.width > ADWIN_GRACE_PERIOD && self.detect_change();
        DetectorSignal {
            change_detected,
            warning_detected: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_adwin_tracks_mean_and_width() {
        let mut adwin = Adwin::new(0.002);
        for i in 0..100 {
            adwin.update((i % 2) as f64);
        }
        assert_eq!(adwin.width(), 100);
        assert_relative_eq!(adwin.estimation(), 0.5);
        // Buckets per row are bounded.
        assert!(adwin.rows.iter().all(|r| r.len() <= ADWIN_MAX_BUCKETS));
        let stored: f64 = adwin
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| r.len() as f64 * bucket_size(i))
            .sum();
        assert_eq!(stored as usize, 100);
    }

    #[test]
    fn test_adwin_variance_matches_direct_computation() {
        let mut adwin = Adwin::new(0.002);
        let xs = [0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0];
        for x in xs {
            adwin.update(x);
        }
        let mean = xs.iter().sum::<f64>() / xs.len() as f64;
        let ss: f64 = xs.iter().map(|x| (x - mean).powi(2)).sum();
        assert_relative_eq!(adwin.variance, ss, epsilon = 1e-9);
    }

    #[test]
    fn test_adwin_stable_stream_keeps_growing() {
        let mut adwin = Adwin::new(0.002);
        let mut changes = 0;
        for _ in 0..2000 {
            if adwin.update(0.0).change_detected {
                changes += 1;
            }
        }
        assert_eq!(changes, 0);
        assert_eq!(adwin.width(), 2000);
    }

    #[test]
    fn test_adwin_shrinks_window_after_change() {
        let mut adwin = Adwin::new(0.01);
        for _ in 0..500 {
            adwin.update(0.0);
        }
        let mut detected = false;
        for _ in 0..500 {
            if adwin.update(1.0).change_detected {
                detected = true;
                break;
            }
        }
        assert!(detected);
        assert!(adwin.width() < 500);
    }
}
