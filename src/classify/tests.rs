use super::*;

fn stub_classifier() -> ZeroShotClassifier {
    ZeroShotClassifier::load(ClassifyConfig::stub()).expect("stub classifier should load")
}

const CATEGORY_NAMES: &[&str] = &[
    "Zero Hunger",
    "Good Health and Well-Being",
    "Quality Education",
    "Clean Water and Sanitation",
    "Affordable and Clean Energy",
    "Sustainable Cities and Communities",
];

#[test]
fn test_stub_mode_reports_itself() {
    let classifier = stub_classifier();
    assert!(classifier.is_stub());
}

#[test]
fn test_empty_label_set_is_rejected() {
    let classifier = stub_classifier();
    let result = classifier.classify("anything", &[], true);
    assert!(matches!(result, Err(ClassifyError::InvalidInput { .. })));
}

#[test]
fn test_scores_are_sorted_descending() {
    let classifier = stub_classifier();

    let scored = classifier
        .classify("need clean drinking water for village", CATEGORY_NAMES, true)
        .unwrap();

    assert_eq!(scored.len(), CATEGORY_NAMES.len());
    for pair in scored.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_overlapping_label_wins() {
    let classifier = stub_classifier();

    let scored = classifier
        .classify("need clean drinking water for village", CATEGORY_NAMES, true)
        .unwrap();

    assert_eq!(scored[0].label, "Clean Water and Sanitation");
}

#[test]
fn test_multi_label_scores_stay_in_unit_interval() {
    let classifier = stub_classifier();

    let scored = classifier
        .classify("solar power for rural schools", CATEGORY_NAMES, true)
        .unwrap();

    for entry in &scored {
        assert!(
            (0.0..=1.0).contains(&entry.score),
            "{} scored {}",
            entry.label,
            entry.score
        );
    }
}

#[test]
fn test_single_label_scores_sum_to_one() {
    let classifier = stub_classifier();

    let scored = classifier
        .classify(
            "pilot a community project",
            &["high impact", "medium impact", "low impact"],
            false,
        )
        .unwrap();

    let sum: f32 = scored.iter().map(|s| s.score).sum();
    assert!((sum - 1.0).abs() < 1e-5, "scores summed to {sum}");
}

#[test]
fn test_single_label_without_overlap_is_uniform() {
    let classifier = stub_classifier();

    let scored = classifier
        .classify(
            "village grain storage",
            &["high impact", "medium impact", "low impact"],
            false,
        )
        .unwrap();

    for entry in &scored {
        assert!((entry.score - 1.0 / 3.0).abs() < 1e-5);
    }
}

#[test]
fn test_classification_is_deterministic() {
    let classifier = stub_classifier();

    let first = classifier
        .classify("tablet classrooms for teachers", CATEGORY_NAMES, true)
        .unwrap();
    let second = classifier
        .classify("tablet classrooms for teachers", CATEGORY_NAMES, true)
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_empty_text_does_not_fail() {
    let classifier = stub_classifier();

    let scored = classifier.classify("", CATEGORY_NAMES, false).unwrap();

    assert_eq!(scored.len(), CATEGORY_NAMES.len());
    let sum: f32 = scored.iter().map(|s| s.score).sum();
    assert!((sum - 1.0).abs() < 1e-5);
}

#[test]
fn test_every_label_appears_once() {
    let classifier = stub_classifier();

    let scored = classifier
        .classify("waste segregation and compost", CATEGORY_NAMES, true)
        .unwrap();

    let mut labels: Vec<&str> = scored.iter().map(|s| s.label.as_str()).collect();
    labels.sort_unstable();
    let mut expected: Vec<&str> = CATEGORY_NAMES.to_vec();
    expected.sort_unstable();
    assert_eq!(labels, expected);
}

#[test]
fn test_non_stub_config_without_source_is_rejected() {
    let config = ClassifyConfig {
        testing_stub: false,
        ..Default::default()
    };

    let result = ZeroShotClassifier::load(config);
    assert!(matches!(result, Err(ClassifyError::InvalidConfig { .. })));
}

#[test]
fn test_template_without_placeholder_is_rejected() {
    let config = ClassifyConfig {
        model_dir: Some(std::path::PathBuf::from(".")),
        hypothesis_template: "no placeholder here".to_string(),
        ..Default::default()
    };

    let result = ZeroShotClassifier::load(config);
    assert!(matches!(result, Err(ClassifyError::InvalidConfig { .. })));
}
