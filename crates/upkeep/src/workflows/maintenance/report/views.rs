use chrono::NaiveDate;
use serde::Serialize;

use super::super::domain::{round_cents, ElementId, ReportId, TaskGroup, TaskGroupId};
use super::super::state::PlanState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupLine {
    pub group_id: TaskGroupId,
    pub name: String,
    pub planned_on: NaiveDate,
    pub elements: usize,
    pub cost: f64,
}

impl GroupLine {
    pub fn from_group(group: &TaskGroup) -> Self {
        Self {
            group_id: group.id.clone(),
            name: group.name.clone(),
            planned_on: group.planned_on,
            elements: group.subtasks.len(),
            cost: round_cents(group.total_cost()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearBudget {
    pub year: i32,
    pub groups: Vec<GroupLine>,
    pub total: f64,
}

/// Current condition of one element: the most recently performed inspection, or the
/// latest report when none has a date yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionLine {
    pub element_id: ElementId,
    pub name: String,
    pub report_id: Option<ReportId>,
    pub inspected_on: Option<NaiveDate>,
    pub score: Option<u8>,
    pub registered_defects: usize,
}

pub fn condition_overview(state: &PlanState) -> Vec<ConditionLine> {
    state
        .elements
        .values()
        .map(|element| {
            let report = element
                .inspections
                .iter()
                .filter(|report| report.inspected_on.is_some())
                .max_by_key(|report| report.inspected_on)
                .or_else(|| element.inspections.last());
            ConditionLine {
                element_id: element.id.clone(),
                name: element.name.clone(),
                report_id: report.map(|report| report.id.clone()),
                inspected_on: report.and_then(|report| report.inspected_on),
                score: report.map(|report| report.condition_score),
                registered_defects: element.defects.entries().count(),
            }
        })
        .collect()
}
