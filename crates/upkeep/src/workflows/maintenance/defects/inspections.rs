use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::super::condition::aggregate_score;
use super::super::domain::{
    DefectObservation, Element, InspectionReport, Intensity, MediaRef, ObservationId,
    PlanningError, ReportId,
};
use super::super::ids::IdGenerator;

/// Open a new inspection, pre-seeded with a placeholder for every registered defect.
pub fn add_inspection(element: &Element, ids: &dyn IdGenerator) -> Element {
    let mut report = InspectionReport::empty(ids.report_id());
    report.observations = element
        .defects
        .entries()
        .map(|(severity, name)| DefectObservation::placeholder(ids.observation_id(), severity, name))
        .collect();
    report.condition_score = aggregate_score(&report.observations);

    let mut next = element.clone();
    debug!(element = %next.id, report = %report.id, "inspection opened");
    next.inspections.push(report);
    next
}

pub fn remove_inspection(element: &Element, report_id: &ReportId) -> Result<Element, PlanningError> {
    if element.inspection(report_id).is_none() {
        return Err(PlanningError::ReportNotFound(report_id.clone()));
    }
    if element.inspections.len() == 1 {
        return Err(PlanningError::LastInspection(element.id.clone()));
    }

    let mut next = element.clone();
    next.inspections.retain(|report| &report.id != report_id);
    Ok(next)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspectionUpdate {
    #[serde(default)]
    pub inspected_on: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

pub fn update_inspection(
    element: &Element,
    report_id: &ReportId,
    update: InspectionUpdate,
) -> Result<Element, PlanningError> {
    let mut next = element.clone();
    let report = next
        .inspections
        .iter_mut()
        .find(|report| &report.id == report_id)
        .ok_or_else(|| PlanningError::ReportNotFound(report_id.clone()))?;

    if let Some(date) = update.inspected_on {
        report.inspected_on = Some(date);
    }
    if let Some(notes) = update.notes {
        report.notes = notes;
    }
    if let Some(remarks) = update.remarks {
        report.remarks = remarks;
    }
    Ok(next)
}

/// Measured values for one observation. `None` leaves a field untouched; the `clear_*`
/// flags reset a measurement to unset, unless a new value is given in the same update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationUpdate {
    #[serde(default)]
    pub extent: Option<f64>,
    #[serde(default)]
    pub clear_extent: bool,
    #[serde(default)]
    pub intensity: Option<Intensity>,
    #[serde(default)]
    pub clear_intensity: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<MediaRef>>,
}

pub fn update_observation(
    element: &Element,
    report_id: &ReportId,
    observation_id: &ObservationId,
    update: ObservationUpdate,
) -> Result<Element, PlanningError> {
    if let Some(extent) = update.extent {
        if !(0.0..=100.0).contains(&extent) {
            return Err(PlanningError::InvalidExtent(extent));
        }
    }

    let mut next = element.clone();
    let report = next
        .inspections
        .iter_mut()
        .find(|report| &report.id == report_id)
        .ok_or_else(|| PlanningError::ReportNotFound(report_id.clone()))?;
    let observation = report
        .observations
        .iter_mut()
        .find(|observation| &observation.id == observation_id)
        .ok_or_else(|| PlanningError::ObservationNotFound(observation_id.clone()))?;

    if update.extent.is_some() || update.clear_extent {
        observation.extent = update.extent;
    }
    if update.intensity.is_some() || update.clear_intensity {
        observation.intensity = update.intensity;
    }
    if let Some(description) = update.description {
        observation.description = description;
    }
    if let Some(images) = update.images {
        observation.images = images;
    }

    report.condition_score = aggregate_score(&report.observations);
    debug!(
        element = %next.id,
        report = %report_id,
        score = report.condition_score,
        "observation updated"
    );
    Ok(next)
}
