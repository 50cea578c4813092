use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;

use super::super::domain::{CostModel, ElementId, PlanningError, TaskGroupId};
use super::super::ids::IdGenerator;
use super::super::state::PlanState;
use super::expander::{expand, synthesize, Expansion};
use super::intent::{distinct, parse_date, validate_cost, GroupEdit, ScheduleDraft, ScheduleIntent};

/// Validate a draft, expand it and append every produced record.
pub fn add_schedule(
    state: &PlanState,
    draft: &ScheduleDraft,
    today: NaiveDate,
    ids: &dyn IdGenerator,
) -> Result<PlanState, PlanningError> {
    let intent = ScheduleIntent::from_draft(draft)?;
    let expansion = expand(&intent, &state.elements, today, ids)?;
    let mut next = state.clone();
    apply_expansion(&mut next, expansion);
    Ok(next)
}

fn apply_expansion(state: &mut PlanState, expansion: Expansion) {
    for triad in expansion.triads {
        if let Some(element) = state.elements.get_mut(&triad.element) {
            element.tasks.push(triad.task);
        }
        state.offer_groups.insert(triad.offer.id.clone(), triad.offer);
        state.task_groups.insert(triad.group.id.clone(), triad.group);
    }
}

/// Re-target a task group at a new element selection with new shared properties.
///
/// Dropped elements lose their offer group and task, kept elements are updated in place,
/// and each newly selected element gets a fresh task group of its own.
pub fn edit_task_group(
    state: &PlanState,
    group_id: &TaskGroupId,
    edit: &GroupEdit,
    today: NaiveDate,
    ids: &dyn IdGenerator,
) -> Result<PlanState, PlanningError> {
    let group = state
        .task_groups
        .get(group_id)
        .ok_or_else(|| PlanningError::GroupNotFound(group_id.clone()))?;

    let date = parse_date(&edit.date)?;
    let selection = distinct(&edit.element_ids);
    validate_cost(&edit.cost, &selection)?;
    if let Some(missing) = selection
        .iter()
        .find(|id| !state.elements.contains_key(*id))
    {
        return Err(PlanningError::ElementNotFound(missing.clone()));
    }

    let name = edit.name.trim();
    let (retained, removed): (Vec<ElementId>, Vec<ElementId>) = group
        .subtasks
        .iter()
        .cloned()
        .partition(|element| selection.contains(element));
    let added: Vec<ElementId> = selection
        .iter()
        .filter(|element| !group.subtasks.contains(element))
        .cloned()
        .collect();

    let mut next = state.clone();

    for element_id in &removed {
        next.offer_groups.retain(|_, offer| {
            !(&offer.task_group_id == group_id && &offer.element_id == element_id)
        });
        if let Some(element) = next.elements.get_mut(element_id) {
            element
                .tasks
                .retain(|task| task.group_id.as_ref() != Some(group_id));
        }
    }

    for element_id in &retained {
        let amount = edit.cost.amount_for(element_id).unwrap_or_default();
        for offer in next.offer_groups.values_mut().filter(|offer| {
            &offer.task_group_id == group_id && &offer.element_id == element_id
        }) {
            offer.name = name.to_string();
            offer.estimated_value = amount;
            offer.work_date = date;
        }
        if let Some(element) = next.elements.get_mut(element_id) {
            for task in element
                .tasks
                .iter_mut()
                .filter(|task| task.group_id.as_ref() == Some(group_id))
            {
                task.name = name.to_string();
                task.cost = amount;
                task.planned_on = date;
            }
        }
    }

    if retained.is_empty() {
        next.task_groups.remove(group_id);
    } else if let Some(group) = next.task_groups.get_mut(group_id) {
        group.name = name.to_string();
        group.planned_on = date;
        group.cost = retained_cost(&edit.cost, &retained);
        group.subtasks = retained.clone();
        // Edited amounts are taken as given, no longer derived from the indexed series.
        if let Some(origin) = group.recurrence.as_mut() {
            origin.indexation_percent = None;
        }
    }

    let mut expansion = Expansion::default();
    for element_id in &added {
        let amount = edit.cost.amount_for(element_id).unwrap_or_default();
        expansion
            .triads
            .push(synthesize(element_id, name, date, amount, None, today, ids));
    }
    apply_expansion(&mut next, expansion);

    info!(
        group = %group_id,
        retained = retained.len(),
        removed = removed.len(),
        added = added.len(),
        "task group edited"
    );
    Ok(next)
}

fn retained_cost(cost: &CostModel, retained: &[ElementId]) -> CostModel {
    match cost {
        CostModel::Shared { amount } => CostModel::Shared { amount: *amount },
        CostModel::PerElement { amounts } => CostModel::PerElement {
            amounts: amounts
                .iter()
                .filter(|(element, _)| retained.contains(element))
                .map(|(element, amount)| (element.clone(), *amount))
                .collect::<BTreeMap<_, _>>(),
        },
    }
}

/// Remove a task group and its offer groups. Tasks that pointed at it stay on their
/// elements but lose the group and offer references.
pub fn delete_task_group(
    state: &PlanState,
    group_id: &TaskGroupId,
) -> Result<PlanState, PlanningError> {
    if !state.task_groups.contains_key(group_id) {
        return Err(PlanningError::GroupNotFound(group_id.clone()));
    }

    let mut next = state.clone();
    let offers_before = next.offer_groups.len();
    next.offer_groups
        .retain(|_, offer| &offer.task_group_id != group_id);
    let offers_removed = offers_before - next.offer_groups.len();

    let mut detached = 0usize;
    for task in next
        .elements
        .values_mut()
        .flat_map(|element| element.tasks.iter_mut())
        .filter(|task| task.group_id.as_ref() == Some(group_id))
    {
        task.group_id = None;
        task.offer_group_id = None;
        detached += 1;
    }

    next.task_groups.remove(group_id);
    info!(group = %group_id, offers_removed, detached, "task group deleted");
    Ok(next)
}
