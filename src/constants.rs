/// Smoothing mass used in place of empty bins before taking logarithms.
pub const EPSILON: f64 = 1e-12;
/// Number of equal width bins for the numeric JS divergence histogram.
pub const JS_HISTOGRAM_BINS: usize = 20;
/// Largest sample size for which the two sample KS p-value is computed exactly.
pub const KS_EXACT_MAX_N: usize = 10_000;
/// Number of quantile bins for the numeric population stability index.
pub const PSI_QUANTILE_BINS: usize = 10;

pub const ADWIN_CLOCK: usize = 32;
pub const ADWIN_MAX_BUCKETS: usize = 5;
pub const ADWIN_MIN_WINDOW_LENGTH: usize = 5;
pub const ADWIN_GRACE_PERIOD: usize = 10;

pub const DDM_MIN_INSTANCES: usize = 30;
pub const PAGE_HINKLEY_MIN_INSTANCES: usize = 30;
/// KSWIN only reports a change when the KS statistic also exceeds this value.
pub const KSWIN_MIN_STATISTIC: f64 = 0.1;

pub const LOGISTIC_MAX_ITER: usize = 1000;
pub const LOGISTIC_LEARNING_RATE: f64 = 0.5;
pub const LOGISTIC_TOLERANCE: f64 = 1e-6;

pub const MODEL_FILE_PREFIX: &str = "model_v";
pub const MODEL_FILE_EXTENSION: &str = "json";
pub const REGISTRY_FILE_NAME: &str = "registry.csv";
pub const STREAM_FILE_PREFIX: &str = "stream_";
