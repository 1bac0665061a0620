//! Statistical primitives used by the drift calculations.
use crate::constants::{EPSILON, KS_EXACT_MAX_N};
use std::cmp::Ordering;

/// Two sample Kolmogorov-Smirnov test.
///
/// Both inputs must be sorted and free of NaN values.
/// Returns the statistic `D` and the two sided p-value. The p-value is exact
/// while neither sample is larger than `KS_EXACT_MAX_N`, asymptotic above.
pub fn ks_2samp_sorted(x: &[f64], y: &[f64]) -> (f64, f64) {
    let (n1, n2) = (x.len(), y.len());
    if n1 == 0 || n2 == 0 {
        return (f64::NAN, f64::NAN);
    }
    let (mut i, mut j) = (0, 0);
    let mut d: f64 = 0.0;
    while i < n1 && j < n2 {
        let v = if x[i] <= y[j] { x[i] } else { y[j] };
        // Ties are consumed on both sides before comparing the ecdfs.
        while i < n1 && x[i] <= v {
            i += 1;
        }
        while j < n2 && y[j] <= v {
            j += 1;
        }
        let diff = (i as f64 / n1 as f64 - j as f64 / n2 as f64).abs();
        if diff > d {
            d = diff;
        }
    }
    let p = if n1.max(n2) <= KS_EXACT_MAX_N {
        ks_2samp_exact_pvalue(n1, n2, d)
    } else {
        let en = ((n1 * n2) as f64 / (n1 + n2) as f64).sqrt();
        kolmogorov_survival((en + 0.12 + 0.11 / en) * d)
    };
    (d, p)
}

/// Exact `P(D >= d)` for samples of size `n1` and `n2` without ties.
///
/// Counts the lattice paths from `(0, 0)` to `(n1, n2)` whose ecdf gap stays
/// below `d`. Every row is scaled by `i / (i + n)` so `u[n]` ends as the
/// share of such paths rather than their count.
pub fn ks_2samp_exact_pvalue(n1: usize, n2: usize, d: f64) -> f64 {
    let (m, n) = if n1 <= n2 { (n1, n2) } else { (n2, n1) };
    if m == 0 {
        return f64::NAN;
    }
    let (md, nd) = (m as f64, n as f64);
    // D is a multiple of 1 / (m n), so q sits halfway below d.
    let q = (0.5 + (d * md * nd - 1e-7).floor()) / (md * nd);
    let mut u = vec![0.0; n + 1];
    u[0] = 1.0;
    for j in 1..=n {
        u[j] = if j as f64 / nd > q { 0.0 } else { u[j - 1] };
    }
    for i in 1..=m {
        let w = i as f64 / (i + n) as f64;
        let fi = i as f64 / md;
        u[0] = if fi > q { 0.0 } else { w * u[0] };
        for j in 1..=n {
            u[j] = if (fi - j as f64 / nd).abs() > q {
                0.0
            } else {
                w * u[j] + u[j - 1]
            };
        }
    }
    (1.0 - u[n]).clamp(0.0, 1.0)
}

/// Survival function of the Kolmogorov distribution,
/// `Q(λ) = 2 Σ (-1)^(k-1) exp(-2 k² λ²)`.
pub fn kolmogorov_survival(lambda: f64) -> f64 {
    if lambda.is_nan() {
        return f64::NAN;
    }
    if lambda < 0.2 {
        return 1.0;
    }
    let a2 = -2.0 * lambda * lambda;
    let mut fac = 2.0;
    let mut sum = 0.0;
    let mut term_prev: f64 = 0.0;
    for k in 1..=100 {
        let term = fac * (a2 * (k * k) as f64).exp();
        sum += term;
        if term.abs() <= 1e-10 * term_prev || term.abs() <= 1e-16 * sum {
            return sum.clamp(0.0, 1.0);
        }
        fac = -fac;
        term_prev = term.abs();
    }
    // The series did not converge, which only happens for tiny lambda.
    1.0
}

/// Chi-square goodness of fit between observed and expected counts.
///
/// Returns the statistic and its p-value with `k - 1` degrees of freedom.
/// Expected counts must be positive.
pub fn chisquare(observed: &[f64], expected: &[f64]) -> (f64, f64) {
    if observed.is_empty() || observed.len() != expected.len() {
        return (f64::NAN, f64::NAN);
    }
    let stat: f64 = observed
        .iter()
        .zip(expected)
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum();
    let df = observed.len() - 1;
    (stat, chi2_survival(stat, df))
}

/// Upper tail probability of the chi-square distribution.
pub fn chi2_survival(stat: f64, df: usize) -> f64 {
    if df == 0 || stat.is_nan() {
        return f64::NAN;
    }
    if stat <= 0.0 {
        return 1.0;
    }
    regularized_gamma_q(df as f64 / 2.0, stat / 2.0)
}

/// Regularized upper incomplete gamma function `Q(a, x)`.
pub fn regularized_gamma_q(a: f64, x: f64) -> f64 {
    if x < a + 1.0 {
        1.0 - gamma_series(a, x)
    } else {
        gamma_continued_fraction(a, x)
    }
}

// Series representation of P(a, x).
fn gamma_series(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let gln = ln_gamma(a);
    let mut ap = a;
    let mut del = 1.0 / a;
    let mut sum = del;
    for _ in 0..1000 {
        ap += 1.0;
        del *= x / ap;
        sum += del;
        if del.abs() < sum.abs() * 1e-15 {
            break;
        }
    }
    (sum * (-x + a * x.ln() - gln).exp()).clamp(0.0, 1.0)
}

// Continued fraction representation of Q(a, x), modified Lentz.
fn gamma_continued_fraction(a: f64, x: f64) -> f64 {
    const FPMIN: f64 = 1e-300;
    let gln = ln_gamma(a);
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / FPMIN;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..1000 {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = b + an / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < 1e-15 {
            break;
        }
    }
    ((-x + a * x.ln() - gln).exp() * h).clamp(0.0, 1.0)
}

/// Natural log of the gamma function (Lanczos approximation).
pub fn ln_gamma(x: f64) -> f64 {
    const COF: [f64; 6] = [
        76.18009172947146,
        -86.50532032941677,
        24.01409824083091,
        -1.231739572450155,
        0.1208650973866179e-2,
        -0.5395239384953e-5,
    ];
    let mut y = x;
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut ser = 1.000000000190015;
    for c in COF.iter() {
        y += 1.0;
        ser += c / y;
    }
    -tmp + (2.5066282746310005 * ser / x).ln()
}

/// Normalize non negative weights so they sum to one.
pub fn normalize(v: &[f64]) -> Vec<f64> {
    let total: f64 = v.iter().sum::<f64>() + EPSILON;
    v.iter().map(|x| x / total).collect()
}

/// Jensen-Shannon divergence between two discrete distributions,
/// natural logarithm. Zero entries are replaced by a tiny mass before
/// taking logs, so the result is always finite and at most `ln 2`.
pub fn jensen_shannon_divergence(p: &[f64], q: &[f64]) -> f64 {
    let p = normalize(p);
    let q = normalize(q);
    let m: Vec<f64> = p.iter().zip(&q).map(|(a, b)| 0.5 * (a + b)).collect();
    0.5 * (kl_divergence(&p, &m) + kl_divergence(&q, &m))
}

fn kl_divergence(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let x = if x == 0.0 { EPSILON } else { x };
            let y = if y == 0.0 { EPSILON } else { y };
            x * (x / y).ln()
        })
        .sum()
}

/// Population stability index between an expected and an actual set
/// of proportions.
pub fn population_stability_index(expected: &[f64], actual: &[f64]) -> f64 {
    expected
        .iter()
        .zip(actual)
        .map(|(e, a)| (a - e) * ((a + EPSILON) / (e + EPSILON)).ln())
        .sum()
}

/// Counts of `values` in `bins` equal width bins over `[lo, hi]`.
/// Values outside the range are not counted, the last bin is closed.
pub fn equal_width_counts(values: &[f64], lo: f64, hi: f64, bins: usize) -> Vec<f64> {
    let mut counts = vec![0.0; bins];
    let width = (hi - lo) / bins as f64;
    for &v in values {
        if v.is_nan() || v < lo || v > hi {
            continue;
        }
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1.0;
    }
    counts
}

/// Counts of `values` in the bins delimited by ascending `edges`. Bin `i`
/// is `[edges[i], edges[i + 1])`, empty bins from repeated edges stay empty.
pub fn edge_counts(values: &[f64], edges: &[f64]) -> Vec<f64> {
    let bins = edges.len() - 1;
    let interior = &edges[1..bins];
    let mut counts = vec![0.0; bins];
    for &v in values {
        let idx = interior.partition_point(|&e| e.partial_cmp(&v) != Some(Ordering::Greater));
        counts[idx] += 1.0;
    }
    counts
}
