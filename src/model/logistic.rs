//! Logistic Regression
//!
//! Binary logistic regression with an L2 penalty, fitted by full batch
//! gradient descent on an encoded design matrix.
use crate::constants::{LOGISTIC_LEARNING_RATE, LOGISTIC_MAX_ITER, LOGISTIC_TOLERANCE};
use crate::metric::log_loss;
use crate::utils::sigmoid;
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub weights: Vec<f64>,
    pub intercept: f64,
    /// Inverse of the regularization strength.
    pub c: f64,
    pub n_iter: usize,
}

impl LogisticRegression {
    pub fn new(n_features: usize, c: f64) -> Self {
        LogisticRegression {
            weights: vec![0.0; n_features],
            intercept: 0.0,
            c,
            n_iter: 0,
        }
    }

    #[inline]
    fn decision(&self, row: &[f64]) -> f64 {
        row.iter().zip(&self.weights).map(|(x, w)| x * w).sum::<f64>() + self.intercept
    }

    /// Fit on `design` (one row per sample) and labels `y` in {0, 1}.
    ///
    /// Minimizes the mean log loss plus `||w||^2 / (2 C n)`. The intercept
    /// is not penalized. Stops when the largest gradient component falls
    /// below the tolerance.
    pub fn fit(&mut self, design: &[Vec<f64>], y: &[f64]) {
        let n = design.len();
        if n == 0 {
            return;
        }
        let n_f = n as f64;
        let penalty = 1.0 / (self.c * n_f);

        for iter in 0..LOGISTIC_MAX_ITER {
            let mut grad_w = vec![0.0; self.weights.len()];
            let mut grad_b = 0.0;
            for (row, y_) in design.iter().zip(y) {
                let residual = sigmoid(self.decision(row)) - y_;
                grad_b += residual;
                for (g, x) in grad_w.iter_mut().zip(row) {
                    *g += residual * x;
                }
            }
            grad_b /= n_f;
            let mut max_grad = grad_b.abs();
            for (g, w) in grad_w.iter_mut().zip(&self.weights) {
                *g = *g / n_f + penalty * w;
                max_grad = max_grad.max(g.abs());
            }

            self.intercept -= LOGISTIC_LEARNING_RATE * grad_b;
            for (w, g) in self.weights.iter_mut().zip(&grad_w) {
                *w -= LOGISTIC_LEARNING_RATE * g;
            }
            self.n_iter = iter + 1;
            if max_grad < LOGISTIC_TOLERANCE {
                break;
            }
        }

        let proba = self.predict_proba(design);
        if self.n_iter == LOGISTIC_MAX_ITER {
            debug!("logistic regression reached {} iterations without converging", LOGISTIC_MAX_ITER);
        }
        info!(
            "logistic regression fitted in {} iterations, train log loss {:.4}",
            self.n_iter,
            log_loss(y, &proba)
        );
    }

    /// Probability of the positive class for each row.
    pub fn predict_proba(&self, design: &[Vec<f64>]) -> Vec<f64> {
        design.iter().map(|row| sigmoid(self.decision(row))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_separable_direction() {
        let design: Vec<Vec<f64>> = (0..100).map(|i| vec![(i as f64 - 50.0) / 25.0]).collect();
        let y: Vec<f64> = (0..100).map(|i| if i >= 50 { 1.0 } else { 0.0 }).collect();
        let mut model = LogisticRegression::new(1, 1.0);
        model.fit(&design, &y);
        assert!(model.weights[0] > 0.0);
        let proba = model.predict_proba(&[vec![-2.0], vec![2.0]]);
        assert!(proba[0] < 0.2);
        assert!(proba[1] > 0.8);
    }

    #[test]
    fn test_intercept_tracks_base_rate() {
        // No informative features, the intercept alone recovers the log odds.
        let design = vec![vec![0.0]; 100];
        let y: Vec<f64> = (0..100).map(|i| if i < 75 { 1.0 } else { 0.0 }).collect();
        let mut model = LogisticRegression::new(1, 1.0);
        model.fit(&design, &y);
        let p = model.predict_proba(&[vec![0.0]])[0];
        assert!((p - 0.75).abs() < 1e-3);
    }
}
