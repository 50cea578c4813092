use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::workflows::maintenance::schedule::{RecurrenceDraft, ScheduleDraft};
use crate::workflows::maintenance::{
    CostModel, Element, ElementId, PlanRepository, PlanState, RepositoryError, SequentialIds,
    Severity, TaskGroupId,
};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn today() -> NaiveDate {
    date(2026, 3, 2)
}

/// Plan with one element per name, in the given order.
pub(super) fn plan(names: &[&str], ids: &SequentialIds) -> (PlanState, Vec<ElementId>) {
    let mut state = PlanState::new();
    let mut element_ids = Vec::new();
    for name in names {
        let element = Element::create(name, ids);
        element_ids.push(element.id.clone());
        state = state.with_element(element);
    }
    (state, element_ids)
}

pub(super) fn one_shot(elements: &[ElementId], amount: f64) -> ScheduleDraft {
    ScheduleDraft {
        element_ids: elements.to_vec(),
        name: "Replace sealant".to_string(),
        date: "2027-06-15".to_string(),
        cost: CostModel::Shared { amount },
        recurrence: None,
    }
}

pub(super) fn periodic(
    elements: &[ElementId],
    amount: f64,
    periodicity_months: i64,
    horizon_years: i64,
    indexation_percent: Option<f64>,
) -> ScheduleDraft {
    ScheduleDraft {
        element_ids: elements.to_vec(),
        name: "Clean gutters".to_string(),
        date: "2026-01-31".to_string(),
        cost: CostModel::Shared { amount },
        recurrence: Some(RecurrenceDraft {
            periodicity_months,
            horizon_years,
            indexation_percent,
        }),
    }
}

pub(super) fn per_element(amounts: &[(&ElementId, f64)]) -> CostModel {
    CostModel::PerElement {
        amounts: amounts
            .iter()
            .map(|(element, amount)| ((*element).clone(), *amount))
            .collect::<BTreeMap<_, _>>(),
    }
}

/// The group that lists `element` as a subtask. Panics unless there is exactly one.
pub(super) fn group_of(state: &PlanState, element: &ElementId) -> TaskGroupId {
    let groups: Vec<_> = state
        .task_groups
        .values()
        .filter(|group| group.subtasks.contains(element))
        .collect();
    assert_eq!(groups.len(), 1, "expected exactly one group for {element}");
    groups[0].id.clone()
}

pub(super) fn observation_names(state: &PlanState, element: &ElementId) -> Vec<Vec<(Severity, String)>> {
    state
        .element(element)
        .expect("element present")
        .inspections
        .iter()
        .map(|report| {
            report
                .observations
                .iter()
                .map(|observation| {
                    (
                        observation.severity.expect("severity set"),
                        observation.defect.clone(),
                    )
                })
                .collect()
        })
        .collect()
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    document: Mutex<Option<String>>,
}

impl PlanRepository for MemoryRepository {
    fn load(&self) -> Result<PlanState, RepositoryError> {
        let guard = self.document.lock().expect("repository mutex poisoned");
        match guard.as_deref() {
            Some(json) => serde_json::from_str(json)
                .map_err(|err| RepositoryError::Malformed(err.to_string())),
            None => Ok(PlanState::new()),
        }
    }

    fn save(&self, state: &PlanState) -> Result<(), RepositoryError> {
        let json = serde_json::to_string(state)
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;
        *self.document.lock().expect("repository mutex poisoned") = Some(json);
        Ok(())
    }
}
