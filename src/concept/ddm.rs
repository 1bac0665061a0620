//! DDM
//!
//! Drift Detection Method: tracks the running error probability `p` and its
//! standard deviation `s`, and compares `p + s` with the lowest value seen.
use crate::concept::{ChangeDetector, DetectorSignal};
use crate::constants::DDM_MIN_INSTANCES;

#[derive(Debug, Clone)]
pub struct Ddm {
    warning_level: f64,
    out_control_level: f64,
    n: usize,
    p: f64,
    p_min: f64,
    s_min: f64,
    ps_min: f64,
}

impl Ddm {
    pub fn new(warning_level: f64, out_control_level: f64) -> Self {
        Ddm {
            warning_level,
            out_control_level,
            n: 0,
            p: 0.0,
            p_min: f64::INFINITY,
            s_min: f64::INFINITY,
            ps_min: f64::INFINITY,
        }
    }

    fn reset(&mut self) {
        *self = Ddm::new(self.warning_level, self.out_control_level);
    }
}

impl ChangeDetector for Ddm {
    fn update(&mut self, x: f64) -> DetectorSignal {
        self.n += 1;
        self.p += (x - self.p) / self.n as f64;
        let s = (self.p * (1.0 - self.p) / self.n as f64).sqrt();

        let mut signal = DetectorSignal::default();
        if self.n < DDM_MIN_INSTANCES {
            return signal;
        }
        if self.p + s <= self.ps_min {
            self.p_min = self.p;
            self.s_min = s;
            self.ps_min = self.p + s;
        }
        if self.p + s > self.p_min + self.out_control_level * self.s_min {
            signal.change_detected = true;
            self.reset();
        } else if self.p + s > self.p_min + self.warning_level * self.s_min {
            signal.warning_detected = true;
        }
        signal
    }
}
