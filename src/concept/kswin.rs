//! KSWIN
//!
//! Kolmogorov-Smirnov windowing: the newest `stat_size` observations are
//! compared against a random sample of the older part of a sliding window.
use crate::concept::{ChangeDetector, DetectorSignal};
use crate::constants::KSWIN_MIN_STATISTIC;
use crate::drift::stats::ks_2samp_sorted;
use crate::utils::sorted;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Kswin {
    alpha: f64,
    window_size: usize,
    stat_size: usize,
    window: VecDeque<f64>,
    rng: StdRng,
}

impl Kswin {
    /// `stat_size` must be smaller than `window_size`.
    pub fn new(alpha: f64, window_size: usize, stat_size: usize, seed: u64) -> Self {
        Kswin {
            alpha,
            window_size,
            stat_size,
            window: VecDeque::with_capacity(window_size),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ChangeDetector for Kswin {
    fn update(&mut self, x: f64) -> DetectorSignal {
        if self.window.len() >= self.window_size {
            self.window.pop_front();
        }
        self.window.push_back(x);

        let mut signal = DetectorSignal::default();
        if self.window.len() < self.window_size {
            return signal;
        }

        let older = self.window_size - self.stat_size;
        let recent: Vec<f64> = self.window.iter().skip(older).copied().collect();
        let reference: Vec<f64> = sample(&mut self.rng, older, self.stat_size)
            .into_iter()
            .map(|i| self.window[i])
            .collect();
        let (statistic, p_value) = ks_2samp_sorted(&sorted(&reference), &sorted(&recent));
        if p_value <= self.alpha && statistic > KSWIN_MIN_STATISTIC {
            signal.change_detected = true;
            self.window = recent.into_iter().collect();
        }
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kswin_detects_shift() {
        let mut kswin = Kswin::new(0.005, 100, 30, 42);
        for _ in 0..200 {
            assert!(!kswin.update(0.0).change_detected);
        }
        let detected = (0..100).any(|_| kswin.update(1.0).change_detected);
        assert!(detected);
        assert!(kswin.window.len() < 100);
    }

    #[test]
    fn test_kswin_waits_for_full_window() {
        let mut kswin = Kswin::new(0.005, 50, 10, 0);
        for i in 0..49 {
            assert!(!kswin.update((i % 2) as f64).change_detected);
        }
        assert_eq!(kswin.window.len(), 49);
    }
}
