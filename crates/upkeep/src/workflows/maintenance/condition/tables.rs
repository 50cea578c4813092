use super::super::domain::{Intensity, Severity};

/// Ordinal 1-6 score of a single defect from its severity and affected extent (percent).
///
/// Kept for per-defect reporting; the aggregate condition score does not consume it.
pub fn severity_extent_score(severity: Severity, extent_percent: f64) -> u8 {
    let thresholds: &[(f64, u8)] = match severity {
        Severity::Severe => &[(70.0, 6), (30.0, 5), (10.0, 4), (2.0, 3)],
        Severity::Serious => &[(70.0, 5), (30.0, 4), (10.0, 3), (2.0, 2)],
        Severity::Minor => &[(70.0, 4), (30.0, 3), (10.0, 2)],
    };
    let floor = match severity {
        Severity::Severe => 2,
        Severity::Serious | Severity::Minor => 1,
    };

    thresholds
        .iter()
        .find(|(min_extent, _)| extent_percent >= *min_extent)
        .map(|(_, score)| *score)
        .unwrap_or(floor)
}

/// Weight of an intensity stage; unset counts as the first stage.
pub fn intensity_factor(intensity: Option<Intensity>) -> f64 {
    match intensity {
        Some(Intensity::Initial) | None => 1.0,
        Some(Intensity::Advanced) => 1.2,
        Some(Intensity::Final) => 1.5,
    }
}
