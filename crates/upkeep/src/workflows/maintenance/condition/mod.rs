mod scorer;
mod tables;

pub use scorer::{aggregate_score, score_breakdown, ConditionBreakdown, ObservationScore};
pub use tables::{intensity_factor, severity_extent_score};
