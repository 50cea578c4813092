use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::defects::rescore;
use super::domain::{
    DefectObservation, Element, ElementId, InspectionReport, OfferGroup, OfferGroupId,
    PlanningError, Severity, TaskGroup, TaskGroupId,
};
use super::ids::IdGenerator;

/// Everything the planner reasons about: elements with their registries, reports and tasks,
/// plus the task groups and offer groups they are scheduled under.
///
/// Records reference each other by id only; operations return a new state instead of
/// editing in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanState {
    #[serde(default)]
    pub elements: BTreeMap<ElementId, Element>,
    #[serde(default)]
    pub task_groups: BTreeMap<TaskGroupId, TaskGroup>,
    #[serde(default)]
    pub offer_groups: BTreeMap<OfferGroupId, OfferGroup>,
}

impl PlanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn task_group(&self, id: &TaskGroupId) -> Option<&TaskGroup> {
        self.task_groups.get(id)
    }

    /// Offer groups of one task group, in id order.
    pub fn offers_for(&self, group: &TaskGroupId) -> Vec<&OfferGroup> {
        self.offer_groups
            .values()
            .filter(|offer| &offer.task_group_id == group)
            .collect()
    }

    pub fn with_element(&self, element: Element) -> PlanState {
        let mut next = self.clone();
        next.elements.insert(element.id.clone(), element);
        next
    }

    pub(crate) fn update_element<F>(
        &self,
        id: &ElementId,
        update: F,
    ) -> Result<PlanState, PlanningError>
    where
        F: FnOnce(&Element) -> Result<Element, PlanningError>,
    {
        let current = self
            .elements
            .get(id)
            .ok_or_else(|| PlanningError::ElementNotFound(id.clone()))?;
        let updated = update(current)?;
        let mut next = self.clone();
        next.elements.insert(id.clone(), updated);
        Ok(next)
    }

    /// Repair a document written by an older version: every element gets at least one
    /// inspection, every report gets the placeholders its registry requires, and scores
    /// are recomputed.
    pub fn backfill(&self, ids: &dyn IdGenerator) -> PlanState {
        let mut next = self.clone();
        for element in next.elements.values_mut() {
            if element.inspections.is_empty() {
                warn!(element = %element.id, "element without inspection report, adding one");
                element
                    .inspections
                    .push(InspectionReport::empty(ids.report_id()));
            }

            let entries: Vec<(Severity, String)> = element
                .defects
                .entries()
                .map(|(severity, name)| (severity, name.to_string()))
                .collect();
            for report in &mut element.inspections {
                for (severity, name) in &entries {
                    let present = report
                        .observations
                        .iter()
                        .any(|observation| observation.matches(*severity, name));
                    if !present {
                        warn!(
                            element = %element.id,
                            report = %report.id,
                            defect = name.as_str(),
                            "missing observation placeholder, adding one"
                        );
                        report.observations.push(DefectObservation::placeholder(
                            ids.observation_id(),
                            *severity,
                            name,
                        ));
                    }
                }
            }

            rescore(element);
        }
        next
    }

    /// Every broken cross-record invariant. Empty for a consistent state.
    pub fn verify(&self) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();

        for element in self.elements.values() {
            if element.inspections.is_empty() {
                issues.push(ConsistencyIssue::NoInspection(element.id.clone()));
            }

            for report in &element.inspections {
                for (severity, name) in element.defects.entries() {
                    if !report
                        .observations
                        .iter()
                        .any(|observation| observation.matches(severity, name))
                    {
                        issues.push(ConsistencyIssue::MissingObservation {
                            element: element.id.clone(),
                            severity,
                            defect: name.to_string(),
                        });
                    }
                }
                for observation in &report.observations {
                    let registered = observation
                        .severity
                        .is_some_and(|severity| {
                            element.defects.contains(severity, &observation.defect)
                        });
                    if !registered {
                        issues.push(ConsistencyIssue::UnregisteredObservation {
                            element: element.id.clone(),
                            defect: observation.defect.clone(),
                        });
                    }
                }
            }

            for task in &element.tasks {
                let Some(group_id) = &task.group_id else {
                    continue;
                };
                let linked = self
                    .task_groups
                    .get(group_id)
                    .is_some_and(|group| group.subtasks.contains(&element.id));
                if !linked {
                    issues.push(ConsistencyIssue::OrphanTask {
                        element: element.id.clone(),
                        group: group_id.clone(),
                    });
                }
                let offer_matches = task.offer_group_id.as_ref().is_some_and(|offer_id| {
                    self.offer_groups.get(offer_id).is_some_and(|offer| {
                        &offer.task_group_id == group_id && offer.element_id == element.id
                    })
                });
                if !offer_matches {
                    issues.push(ConsistencyIssue::TaskOfferMismatch {
                        element: element.id.clone(),
                        group: group_id.clone(),
                    });
                }
            }
        }

        for group in self.task_groups.values() {
            for element_id in &group.subtasks {
                let tasks = self
                    .elements
                    .get(element_id)
                    .map(|element| {
                        element
                            .tasks
                            .iter()
                            .filter(|task| task.group_id.as_ref() == Some(&group.id))
                            .count()
                    })
                    .unwrap_or(0);
                if tasks != 1 {
                    issues.push(ConsistencyIssue::SubtaskWithoutTask {
                        group: group.id.clone(),
                        element: element_id.clone(),
                        tasks,
                    });
                }
                let offers = self
                    .offer_groups
                    .values()
                    .filter(|offer| {
                        offer.task_group_id == group.id && &offer.element_id == element_id
                    })
                    .count();
                if offers != 1 {
                    issues.push(ConsistencyIssue::OfferCount {
                        group: group.id.clone(),
                        element: element_id.clone(),
                        offers,
                    });
                }
            }
        }

        let pairings: BTreeSet<(&TaskGroupId, &ElementId)> = self
            .task_groups
            .values()
            .flat_map(|group| group.subtasks.iter().map(move |element| (&group.id, element)))
            .collect();
        for offer in self.offer_groups.values() {
            if !pairings.contains(&(&offer.task_group_id, &offer.element_id)) {
                issues.push(ConsistencyIssue::OrphanOffer(offer.id.clone()));
            }
        }

        issues
    }
}

/// A broken invariant found by [`PlanState::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyIssue {
    NoInspection(ElementId),
    MissingObservation {
        element: ElementId,
        severity: Severity,
        defect: String,
    },
    UnregisteredObservation {
        element: ElementId,
        defect: String,
    },
    OrphanTask {
        element: ElementId,
        group: TaskGroupId,
    },
    TaskOfferMismatch {
        element: ElementId,
        group: TaskGroupId,
    },
    SubtaskWithoutTask {
        group: TaskGroupId,
        element: ElementId,
        tasks: usize,
    },
    OfferCount {
        group: TaskGroupId,
        element: ElementId,
        offers: usize,
    },
    OrphanOffer(OfferGroupId),
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyIssue::NoInspection(element) => {
                write!(f, "element {element} has no inspection report")
            }
            ConsistencyIssue::MissingObservation {
                element,
                severity,
                defect,
            } => write!(
                f,
                "element {element}: a report lacks an observation for {severity} defect '{defect}'"
            ),
            ConsistencyIssue::UnregisteredObservation { element, defect } => write!(
                f,
                "element {element}: observation '{defect}' has no registry entry"
            ),
            ConsistencyIssue::OrphanTask { element, group } => write!(
                f,
                "element {element}: task points at group {group} which does not list it"
            ),
            ConsistencyIssue::TaskOfferMismatch { element, group } => write!(
                f,
                "element {element}: task in group {group} has no matching offer group"
            ),
            ConsistencyIssue::SubtaskWithoutTask {
                group,
                element,
                tasks,
            } => write!(
                f,
                "group {group}: element {element} carries {tasks} tasks for it (expected 1)"
            ),
            ConsistencyIssue::OfferCount {
                group,
                element,
                offers,
            } => write!(
                f,
                "group {group}: element {element} has {offers} offer groups (expected 1)"
            ),
            ConsistencyIssue::OrphanOffer(offer) => {
                write!(f, "offer group {offer} belongs to no task group pairing")
            }
        }
    }
}
