use upkeep::workflows::maintenance::condition::{
    aggregate_score, intensity_factor, score_breakdown, severity_extent_score,
};
use upkeep::workflows::maintenance::{
    DefectObservation, Intensity, ObservationId, Severity,
};

fn observation(severity: Severity, extent: Option<f64>, intensity: Option<Intensity>) -> DefectObservation {
    let mut observation =
        DefectObservation::placeholder(ObservationId::from("ob-test"), severity, "Defect");
    observation.extent = extent;
    observation.intensity = intensity;
    observation
}

#[test]
fn severity_score_never_drops_as_extent_grows() {
    for severity in Severity::ordered() {
        let mut previous = severity_extent_score(severity, 0.0);
        for step in 1..=200 {
            let score = severity_extent_score(severity, step as f64 * 0.5);
            assert!(
                score >= previous,
                "{severity} score fell from {previous} to {score} at {}%",
                step as f64 * 0.5
            );
            previous = score;
        }
    }
}

#[test]
fn intensity_factor_defaults_to_one() {
    assert_eq!(intensity_factor(None), 1.0);
    assert_eq!(intensity_factor(Some(Intensity::Initial)), 1.0);
    assert_eq!(intensity_factor(Some(Intensity::Advanced)), 1.2);
    assert_eq!(intensity_factor(Some(Intensity::Final)), 1.5);
}

#[test]
fn empty_and_unmeasured_reports_score_best() {
    assert_eq!(aggregate_score(&[]), 1);
    let unmeasured = [
        observation(Severity::Severe, None, Some(Intensity::Final)),
        observation(Severity::Minor, None, None),
    ];
    assert_eq!(aggregate_score(&unmeasured), 1);
}

#[test]
fn single_advanced_severe_defect_scores_three() {
    let observations = [observation(
        Severity::Severe,
        Some(80.0),
        Some(Intensity::Advanced),
    )];
    assert_eq!(aggregate_score(&observations), 3);

    let breakdown = score_breakdown(&observations);
    assert_eq!(breakdown.total_extent, 80.0);
    assert!((breakdown.weighted_extent - 96.0).abs() < 1e-9);
    assert_eq!(breakdown.observations[0].severity_score, Some(6));
}

#[test]
fn initial_intensity_everywhere_scores_one() {
    let observations = [
        observation(Severity::Minor, Some(5.0), Some(Intensity::Initial)),
        observation(Severity::Severe, Some(95.0), Some(Intensity::Initial)),
    ];
    assert_eq!(aggregate_score(&observations), 1);
}

#[test]
fn incomplete_observations_do_not_dilute_the_ratio() {
    let observations = [
        observation(Severity::Serious, Some(50.0), Some(Intensity::Final)),
        observation(Severity::Minor, Some(50.0), None),
    ];
    assert_eq!(aggregate_score(&observations), 4);

    let breakdown = score_breakdown(&observations);
    assert!(breakdown.observations[0].counted);
    assert!(!breakdown.observations[1].counted);
}
