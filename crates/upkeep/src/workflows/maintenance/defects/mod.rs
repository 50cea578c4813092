//! Defect registry operations.
//!
//! The registry of an element and the observations in its inspection reports move together:
//! every registered `(severity, name)` pair has a matching observation in every report, and
//! removing the pair removes those observations. Each operation works on a borrowed element
//! (a draft still being edited, or a saved one) and returns the updated copy; the `*_in`
//! variants do the same for an element stored in a [`PlanState`].

mod inspections;

pub use inspections::{
    add_inspection, remove_inspection, update_inspection, update_observation, InspectionUpdate,
    ObservationUpdate,
};

use tracing::debug;

use super::condition::aggregate_score;
use super::domain::{DefectObservation, Element, ElementId, PlanningError, Severity};
use super::ids::IdGenerator;
use super::state::PlanState;

/// Recompute the condition score of every report of the element.
pub fn rescore(element: &mut Element) {
    for report in &mut element.inspections {
        report.condition_score = aggregate_score(&report.observations);
    }
}

fn defect_name(raw: &str) -> Result<&str, PlanningError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(PlanningError::InvalidDefectName);
    }
    Ok(name)
}

/// Register `name` under `severity` and seed a placeholder observation in every report.
pub fn add_defect(
    element: &Element,
    severity: Severity,
    name: &str,
    ids: &dyn IdGenerator,
) -> Result<Element, PlanningError> {
    let name = defect_name(name)?;
    if element.defects.contains(severity, name) {
        return Err(PlanningError::DuplicateDefect {
            severity,
            name: name.to_string(),
        });
    }

    let mut next = element.clone();
    register(&mut next, severity, name, ids);
    rescore(&mut next);
    debug!(element = %next.id, %severity, defect = name, "defect registered");
    Ok(next)
}

fn register(element: &mut Element, severity: Severity, name: &str, ids: &dyn IdGenerator) {
    element.defects.insert(severity, name);
    for report in &mut element.inspections {
        report.observations.push(DefectObservation::placeholder(
            ids.observation_id(),
            severity,
            name,
        ));
    }
}

/// Unregister `name` and drop its observations from every report. Absent names are a no-op.
pub fn remove_defect(
    element: &Element,
    severity: Severity,
    name: &str,
) -> Result<Element, PlanningError> {
    let name = name.trim();
    let mut next = element.clone();
    unregister(&mut next, severity, name);
    rescore(&mut next);
    debug!(element = %next.id, %severity, defect = name, "defect removed");
    Ok(next)
}

fn unregister(element: &mut Element, severity: Severity, name: &str) {
    element.defects.remove(severity, name);
    for report in &mut element.inspections {
        report
            .observations
            .retain(|observation| !observation.matches(severity, name));
    }
}

/// Bulk registration. Names already present (or repeated in the batch) are skipped; the
/// call only fails when nothing new remains.
pub fn add_defects<S: AsRef<str>>(
    element: &Element,
    severity: Severity,
    names: &[S],
    ids: &dyn IdGenerator,
) -> Result<Element, PlanningError> {
    let mut next = element.clone();
    let mut added = 0usize;

    for raw in names {
        let name = defect_name(raw.as_ref())?;
        if next.defects.contains(severity, name) {
            continue;
        }
        register(&mut next, severity, name, ids);
        added += 1;
    }

    if added == 0 {
        return Err(PlanningError::NoNewDefects { severity });
    }

    rescore(&mut next);
    debug!(element = %next.id, %severity, added, "defects registered");
    Ok(next)
}

pub fn remove_defects<S: AsRef<str>>(
    element: &Element,
    severity: Severity,
    names: &[S],
) -> Result<Element, PlanningError> {
    let mut next = element.clone();
    for raw in names {
        unregister(&mut next, severity, raw.as_ref().trim());
    }
    rescore(&mut next);
    debug!(element = %next.id, %severity, count = names.len(), "defects removed");
    Ok(next)
}

/// Move a defect to another category. Observations keep their measurements and are
/// re-tagged with the new severity.
pub fn recategorize_defect(
    element: &Element,
    from: Severity,
    to: Severity,
    name: &str,
) -> Result<Element, PlanningError> {
    let name = defect_name(name)?;
    if !element.defects.contains(from, name) {
        return Err(PlanningError::DefectNotFound {
            severity: from,
            name: name.to_string(),
        });
    }
    if from == to {
        return Ok(element.clone());
    }
    if element.defects.contains(to, name) {
        return Err(PlanningError::DuplicateDefect {
            severity: to,
            name: name.to_string(),
        });
    }

    let mut next = element.clone();
    next.defects.remove(from, name);
    next.defects.insert(to, name);
    for observation in next
        .inspections
        .iter_mut()
        .flat_map(|report| report.observations.iter_mut())
        .filter(|observation| observation.matches(from, name))
    {
        observation.severity = Some(to);
    }
    rescore(&mut next);
    debug!(element = %next.id, %from, %to, defect = name, "defect recategorized");
    Ok(next)
}

pub fn add_defect_in(
    state: &PlanState,
    element_id: &ElementId,
    severity: Severity,
    name: &str,
    ids: &dyn IdGenerator,
) -> Result<PlanState, PlanningError> {
    state.update_element(element_id, |element| {
        add_defect(element, severity, name, ids)
    })
}

pub fn remove_defect_in(
    state: &PlanState,
    element_id: &ElementId,
    severity: Severity,
    name: &str,
) -> Result<PlanState, PlanningError> {
    state.update_element(element_id, |element| remove_defect(element, severity, name))
}

pub fn add_defects_in<S: AsRef<str>>(
    state: &PlanState,
    element_id: &ElementId,
    severity: Severity,
    names: &[S],
    ids: &dyn IdGenerator,
) -> Result<PlanState, PlanningError> {
    state.update_element(element_id, |element| {
        add_defects(element, severity, names, ids)
    })
}

pub fn remove_defects_in<S: AsRef<str>>(
    state: &PlanState,
    element_id: &ElementId,
    severity: Severity,
    names: &[S],
) -> Result<PlanState, PlanningError> {
    state.update_element(element_id, |element| {
        remove_defects(element, severity, names)
    })
}

pub fn recategorize_defect_in(
    state: &PlanState,
    element_id: &ElementId,
    from: Severity,
    to: Severity,
    name: &str,
) -> Result<PlanState, PlanningError> {
    state.update_element(element_id, |element| {
        recategorize_defect(element, from, to, name)
    })
}
