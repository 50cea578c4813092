use serde::Serialize;

use super::super::domain::{
    DefectObservation, Intensity, ObservationId, Severity, BEST_CONDITION,
};
use super::tables::{intensity_factor, severity_extent_score};

/// Upper bounds of the weighted-extent ratio for scores 1 through 5; anything above is 6.
const RATIO_THRESHOLDS: [(f64, u8); 5] = [(1.02, 1), (1.10, 2), (1.30, 3), (1.50, 4), (1.75, 5)];
const WORST_CONDITION: u8 = 6;

/// Condition score (1 = excellent, 6 = very poor) of one inspection.
///
/// Only observations with an extent, a severity and an intensity stage take part; the score
/// follows from the extent-weighted average intensity factor.
pub fn aggregate_score(observations: &[DefectObservation]) -> u8 {
    let (total_extent, total_weighted) = accumulate(observations);
    score_for(total_extent, total_weighted)
}

fn accumulate(observations: &[DefectObservation]) -> (f64, f64) {
    observations
        .iter()
        .filter_map(counted_extent)
        .fold((0.0, 0.0), |(extent_sum, weighted_sum), (extent, intensity)| {
            (
                extent_sum + extent,
                weighted_sum + extent * intensity_factor(Some(intensity)),
            )
        })
}

fn counted_extent(observation: &DefectObservation) -> Option<(f64, Intensity)> {
    let extent = observation.extent.filter(|extent| extent.is_finite())?;
    observation.severity?;
    let intensity = observation.intensity?;
    Some((extent, intensity))
}

fn score_for(total_extent: f64, total_weighted: f64) -> u8 {
    if total_extent <= 0.0 {
        return BEST_CONDITION;
    }

    let ratio = total_weighted / total_extent;
    RATIO_THRESHOLDS
        .iter()
        .find(|(limit, _)| ratio <= *limit)
        .map(|(_, score)| *score)
        .unwrap_or(WORST_CONDITION)
}

/// Per-observation diagnostic next to the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationScore {
    pub observation_id: ObservationId,
    pub defect: String,
    pub severity: Option<Severity>,
    pub extent: Option<f64>,
    pub intensity: Option<Intensity>,
    /// Severity/extent table score, when both are known.
    pub severity_score: Option<u8>,
    /// Whether the observation contributed to the aggregate.
    pub counted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionBreakdown {
    pub score: u8,
    pub total_extent: f64,
    pub weighted_extent: f64,
    pub ratio: Option<f64>,
    pub observations: Vec<ObservationScore>,
}

pub fn score_breakdown(observations: &[DefectObservation]) -> ConditionBreakdown {
    let (total_extent, weighted_extent) = accumulate(observations);
    let ratio = (total_extent > 0.0).then(|| weighted_extent / total_extent);

    let observations = observations
        .iter()
        .map(|observation| ObservationScore {
            observation_id: observation.id.clone(),
            defect: observation.defect.clone(),
            severity: observation.severity,
            extent: observation.extent,
            intensity: observation.intensity,
            severity_score: observation
                .severity
                .zip(observation.extent)
                .map(|(severity, extent)| severity_extent_score(severity, extent)),
            counted: counted_extent(observation).is_some(),
        })
        .collect();

    ConditionBreakdown {
        score: score_for(total_extent, weighted_extent),
        total_extent,
        weighted_extent,
        ratio,
        observations,
    }
}
