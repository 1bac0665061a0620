use crate::concept::{ConceptDriftConfig, ConceptDriftDetector, DetectorVariant};
use crate::errors::DriftWatchError;

fn config(detector: &str) -> ConceptDriftConfig {
    ConceptDriftConfig {
        detector: detector.to_string(),
        ..ConceptDriftConfig::default()
    }
}

#[test]
fn test_adwin_detects_sustained_errors() {
    let mut cfg = config("adwin");
    cfg.adwin_delta = 0.01;
    let mut detector = ConceptDriftDetector::new(&cfg).unwrap();
    for _ in 0..500 {
        detector.update(0);
    }
    let changed = (0..500).any(|_| detector.update(1).change_detected);
    assert!(changed);
}

#[test]
fn test_change_can_fire_repeatedly() {
    let mut detector = ConceptDriftDetector::new(&config("adwin")).unwrap();
    let mut changes = 0;
    for bit in [0u8, 1, 0] {
        for _ in 0..1000 {
            if detector.update(bit).change_detected {
                changes += 1;
            }
        }
    }
    assert!(changes >= 2);
}

#[test]
fn test_variants_without_warning_level_never_warn() {
    for name in ["adwin", "pagehinkley", "kswin"] {
        let mut detector = ConceptDriftDetector::new(&config(name)).unwrap();
        for i in 0..600 {
            let bit = if i < 300 { 0 } else { 1 };
            assert!(!detector.update(bit).warning_detected);
        }
    }
}

#[test]
fn test_unknown_variant_is_configuration_error() {
    let res = ConceptDriftDetector::new(&config("hddm_a"));
    assert!(matches!(res, Err(DriftWatchError::Configuration(_))));
}

#[test]
fn test_invalid_hyperparameters_are_configuration_errors() {
    let mut cfg = config("kswin");
    cfg.kswin_stat_size = cfg.kswin_window_size;
    assert!(matches!(
        ConceptDriftDetector::new(&cfg),
        Err(DriftWatchError::Configuration(_))
    ));

    let mut cfg = config("adwin");
    cfg.adwin_delta = 0.0;
    assert!(ConceptDriftDetector::new(&cfg).is_err());
}

#[test]
fn test_variant_names_are_case_insensitive() {
    let detector = ConceptDriftDetector::new(&config("PageHinkley")).unwrap();
    assert_eq!(detector.effective_variant(), DetectorVariant::PageHinkley);
    assert_eq!(detector.requested_variant(), DetectorVariant::PageHinkley);
}

#[cfg(feature = "ddm")]
#[test]
fn test_ddm_runs_when_available() {
    let detector = ConceptDriftDetector::new(&config("ddm")).unwrap();
    assert_eq!(detector.effective_variant(), DetectorVariant::Ddm);
    assert!(detector.effective_variant().supports_warning());
}

#[cfg(not(feature = "ddm"))]
#[test]
fn test_ddm_falls_back_to_page_hinkley() {
    let mut detector = ConceptDriftDetector::new(&config("ddm")).unwrap();
    assert_eq!(detector.requested_variant(), DetectorVariant::Ddm);
    assert_eq!(detector.effective_variant(), DetectorVariant::PageHinkley);
    assert!(!detector.update(1).warning_detected);
}

#[test]
fn test_missing_variant_resolves_to_fallback() {
    let without_ddm = |v: DetectorVariant| v != DetectorVariant::Ddm;
    assert_eq!(DetectorVariant::Ddm.resolve(without_ddm).unwrap(), DetectorVariant::PageHinkley);
    assert_eq!(DetectorVariant::Kswin.resolve(without_ddm).unwrap(), DetectorVariant::Kswin);
    assert_eq!(DetectorVariant::Ddm.resolve(|_| true).unwrap(), DetectorVariant::Ddm);

    let res = DetectorVariant::Adwin.resolve(|v| v != DetectorVariant::Adwin);
    assert!(matches!(res, Err(DriftWatchError::Configuration(_))));
    let res = DetectorVariant::Ddm.resolve(|_| false);
    assert!(matches!(res, Err(DriftWatchError::Configuration(_))));
}

#[test]
fn test_fallback_table() {
    assert_eq!(DetectorVariant::Ddm.fallback(), Some(DetectorVariant::PageHinkley));
    assert_eq!(DetectorVariant::Adwin.fallback(), None);
    assert!(DetectorVariant::Adwin.is_available());
    assert_eq!(DetectorVariant::Ddm.is_available(), cfg!(feature = "ddm"));
}

#[test]
fn test_config_from_json_uses_defaults() {
    let cfg: ConceptDriftConfig = serde_json::from_str(r#"{"detector": "kswin", "kswin_seed": 7}"#).unwrap();
    assert_eq!(cfg.detector, "kswin");
    assert_eq!(cfg.kswin_seed, 7);
    assert_eq!(cfg.adwin_delta, 0.002);
    assert_eq!(cfg.ph_alpha, 0.999);
    assert!(cfg.enabled);
}
