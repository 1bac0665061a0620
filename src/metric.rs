//! Metrics
//!
//! Evaluation metrics for fitted binary classifiers.

/// Mean log loss of predicted probabilities, clipped away from 0 and 1.
pub fn log_loss(y: &[f64], proba: &[f64]) -> f64 {
    if y.is_empty() {
        return f64::NAN;
    }
    let res = y
        .iter()
        .zip(proba)
        .map(|(y_, p_)| {
            let p_ = p_.clamp(1e-15, 1.0 - 1e-15);
            -(*y_ * p_.ln() + (1.0 - *y_) * (1.0 - p_).ln())
        })
        .sum::<f64>();
    res / y.len() as f64
}

/// Share of predictions equal to the label.
pub fn accuracy_score(y: &[f64], yhat: &[f64]) -> f64 {
    if y.is_empty() {
        return f64::NAN;
    }
    let correct = y.iter().zip(yhat).filter(|(a, b)| a == b).count();
    correct as f64 / y.len() as f64
}

fn trapezoid_area(x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    (x0 - x1).abs() * (y0 + y1) * 0.5
}

/// Area under the ROC curve. `NaN` when only one class is present.
pub fn roc_auc_score(y: &[f64], yhat: &[f64]) -> f64 {
    if y.is_empty() {
        return f64::NAN;
    }
    let mut indices = (0..y.len()).collect::<Vec<_>>();
    indices.sort_unstable_by(|&a, &b| yhat[b].total_cmp(&yhat[a]));
    let mut auc: f64 = 0.0;

    let mut label = y[indices[0]];
    let mut fp = 1.0 - label;
    let mut tp: f64 = label;
    let mut tp_prev: f64 = 0.0;
    let mut fp_prev: f64 = 0.0;

    for i in 1..indices.len() {
        if yhat[indices[i]] != yhat[indices[i - 1]] {
            auc += trapezoid_area(fp_prev, fp, tp_prev, tp);
            tp_prev = tp;
            fp_prev = fp;
        }
        label = y[indices[i]];
        fp += 1.0 - label;
        tp += label;
    }

    auc += trapezoid_area(fp_prev, fp, tp_prev, tp);
    if fp <= 0.0 || tp <= 0.0 {
        auc = 0.0;
        fp = 0.0;
        tp = 0.0;
    }

    auc / (tp * fp)
}
