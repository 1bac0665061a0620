//! Page-Hinkley
//!
//! Cumulative deviation from the running mean, tested in both directions.
use crate::concept::{ChangeDetector, DetectorSignal};
use crate::constants::PAGE_HINKLEY_MIN_INSTANCES;

#[derive(Debug, Clone)]
pub struct PageHinkley {
    delta: f64,
    lambda: f64,
    alpha: f64,
    n: usize,
    mean: f64,
    sum_up: f64,
    min_up: f64,
    sum_down: f64,
    min_down: f64,
}

impl PageHinkley {
    /// * `delta` - Magnitude of changes that are tolerated.
    /// * `lambda` - Detection threshold on the cumulative deviation.
    /// * `alpha` - Forgetting factor applied to the cumulative sums.
    pub fn new(delta: f64, lambda: f64, alpha: f64) -> Self {
        PageHinkley {
            delta,
            lambda,
            alpha,
            n: 0,
            mean: 0.0,
            sum_up: 0.0,
            min_up: f64::INFINITY,
            sum_down: 0.0,
            min_down: f64::INFINITY,
        }
    }

    fn reset(&mut self) {
        *self = PageHinkley::new(self.delta, self.lambda, self.alpha);
    }
}

impl ChangeDetector for PageHinkley {
    fn update(&mut self, x: f64) -> DetectorSignal {
        self.n += 1;
        self.mean += (x - self.mean) / self.n as f64;
        let dev = x - self.mean;

        self.sum_up = self.alpha * self.sum_up + dev - self.delta;
        self.min_up = self.min_up.min(self.sum_up);
        self.sum_down = self.alpha * self.sum_down - dev - self.delta;
        self.min_down = self.min_down.min(self.sum_down);

        let change_detected = self.n >= PAGE_HINKLEY_MIN_INSTANCES
            && (self.sum_up - self.min_up > self.lambda || self.sum_down - self.min_down > self.lambda);
        if change_detected {
            self.reset();
        }
        DetectorSignal {
            change_detected,
            warning_detected: false,
        }
    }
}
