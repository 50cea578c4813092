use super::common::*;
use crate::workflows::maintenance::schedule::{
    add_schedule, delete_task_group, edit_task_group, update_offer, GroupEdit, OfferUpdate,
};
use crate::workflows::maintenance::{
    CostModel, ElementId, OfferGroupId, PlanState, PlanningError, SequentialIds, TaskGroup,
    TaskGroupId,
};

/// A plan where one task group covers both elements, as older documents contain.
fn shared_group_plan(ids: &SequentialIds) -> (PlanState, Vec<ElementId>, TaskGroupId) {
    let (state, elements) = plan(&["Window A", "Window B", "Window C"], ids);
    let state = add_schedule(&state, &one_shot(&elements[..2], 500.0), today(), ids)
        .expect("scheduled");

    // Merge the second element's triad into the first group.
    let first = group_of(&state, &elements[0]);
    let second = group_of(&state, &elements[1]);
    let mut merged = state.clone();
    merged.task_groups.remove(&second);
    if let Some(group) = merged.task_groups.get_mut(&first) {
        group.subtasks.push(elements[1].clone());
    }
    for offer in merged.offer_groups.values_mut() {
        if offer.task_group_id == second {
            offer.task_group_id = first.clone();
        }
    }
    if let Some(element) = merged.elements.get_mut(&elements[1]) {
        element.tasks[0].group_id = Some(first.clone());
    }
    assert!(merged.verify().is_empty(), "{:?}", merged.verify());
    (merged, elements, first)
}

fn edit(elements: &[ElementId], amount: f64, date: &str) -> GroupEdit {
    GroupEdit {
        element_ids: elements.to_vec(),
        name: "Reglaze".to_string(),
        date: date.to_string(),
        cost: CostModel::Shared { amount },
    }
}

#[test]
fn edit_removing_an_element_drops_its_offer_and_task() {
    let ids = SequentialIds::new();
    let (state, elements, group_id) = shared_group_plan(&ids);

    let next = edit_task_group(
        &state,
        &group_id,
        &edit(&elements[..1], 650.0, "2027-09-01"),
        today(),
        &ids,
    )
    .expect("edited");

    let group = next.task_group(&group_id).expect("group kept");
    assert_eq!(group.subtasks, vec![elements[0].clone()]);
    assert_eq!(group.name, "Reglaze");
    assert_eq!(group.planned_on, date(2027, 9, 1));

    assert!(next
        .offer_groups
        .values()
        .all(|offer| offer.element_id != elements[1]));
    let removed = next.element(&elements[1]).expect("element kept");
    assert!(removed
        .tasks
        .iter()
        .all(|task| task.group_id.as_ref() != Some(&group_id)));

    let offers = next.offers_for(&group_id);
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].estimated_value, 650.0);
    assert_eq!(offers[0].work_date, date(2027, 9, 1));
    assert_eq!(offers[0].name, "Reglaze");

    let retained = next.element(&elements[0]).expect("retained");
    let task = &retained.tasks[0];
    assert_eq!(task.cost, 650.0);
    assert_eq!(task.planned_on, date(2027, 9, 1));
    assert_eq!(task.name, "Reglaze");
    assert_eq!(task.id, state.element(&elements[0]).expect("before").tasks[0].id);

    assert!(next.verify().is_empty(), "{:?}", next.verify());
}

#[test]
fn edit_adding_an_element_creates_a_fresh_group() {
    let ids = SequentialIds::new();
    let (state, elements, group_id) = shared_group_plan(&ids);

    let next = edit_task_group(
        &state,
        &group_id,
        &edit(&elements, 500.0, "2027-06-15"),
        today(),
        &ids,
    )
    .expect("edited");

    assert_eq!(
        next.task_group(&group_id).expect("group").subtasks,
        elements[..2].to_vec()
    );
    let new_group = group_of(&next, &elements[2]);
    assert_ne!(new_group, group_id);
    let added: &TaskGroup = next.task_group(&new_group).expect("new group");
    assert_eq!(added.name, "Reglaze");
    assert_eq!(next.offers_for(&new_group).len(), 1);
    assert_eq!(next.element(&elements[2]).expect("added").tasks.len(), 1);
    assert!(next.verify().is_empty(), "{:?}", next.verify());
}

#[test]
fn edit_with_per_element_costs_updates_each_retained_element() {
    let ids = SequentialIds::new();
    let (state, elements, group_id) = shared_group_plan(&ids);
    let mut change = edit(&elements[..2], 1.0, "2027-06-15");
    change.cost = per_element(&[(&elements[0], 100.0), (&elements[1], 250.0)]);

    let next = edit_task_group(&state, &group_id, &change, today(), &ids).expect("edited");

    assert_eq!(next.element(&elements[0]).expect("a").tasks[0].cost, 100.0);
    assert_eq!(next.element(&elements[1]).expect("b").tasks[0].cost, 250.0);
    assert_eq!(next.task_group(&group_id).expect("group").total_cost(), 350.0);
}

#[test]
fn edit_removing_every_element_deletes_the_group() {
    let ids = SequentialIds::new();
    let (state, elements, group_id) = shared_group_plan(&ids);

    let next = edit_task_group(&state, &group_id, &edit(&[], 500.0, "2027-06-15"), today(), &ids)
        .expect("edited");

    assert!(next.task_group(&group_id).is_none());
    assert!(next.offer_groups.is_empty());
    for element_id in &elements {
        assert!(next.element(element_id).expect("element").tasks.is_empty());
    }
    assert!(next.verify().is_empty());
}

#[test]
fn editing_an_indexed_occurrence_drops_its_indexation() {
    let ids = SequentialIds::new();
    let (state, elements) = plan(&["Paintwork"], &ids);
    let state = add_schedule(&state, &periodic(&elements, 1000.0, 12, 3, Some(10.0)), today(), &ids)
        .expect("scheduled");
    let third = state
        .task_groups
        .values()
        .find(|group| {
            group
                .recurrence
                .as_ref()
                .is_some_and(|origin| origin.period_index == 2)
        })
        .expect("third occurrence")
        .id
        .clone();
    assert_eq!(
        state.task_group(&third).expect("group").total_cost(),
        1210.0
    );

    let next = edit_task_group(
        &state,
        &third,
        &edit(&elements, 900.0, "2028-01-31"),
        today(),
        &ids,
    )
    .expect("edited");

    let group = next.task_group(&third).expect("group kept");
    assert_eq!(group.total_cost(), 900.0);
    let origin = group.recurrence.as_ref().expect("origin kept");
    assert_eq!(origin.indexation_percent, None);
    assert_eq!(origin.period_index, 2);
    assert_eq!(origin.periodicity_months, 12);
    let untouched: Vec<_> = next
        .task_groups
        .values()
        .filter(|group| group.id != third)
        .filter_map(|group| group.recurrence.as_ref())
        .map(|origin| origin.indexation_percent)
        .collect();
    assert_eq!(untouched, vec![Some(10.0), Some(10.0)]);
}

#[test]
fn edit_validates_like_add() {
    let ids = SequentialIds::new();
    let (state, elements, group_id) = shared_group_plan(&ids);

    assert_eq!(
        edit_task_group(&state, &group_id, &edit(&elements, 10.0, "someday"), today(), &ids),
        Err(PlanningError::InvalidDate("someday".to_string()))
    );
    assert!(matches!(
        edit_task_group(&state, &group_id, &edit(&elements, 0.0, "2027-01-01"), today(), &ids),
        Err(PlanningError::InvalidAmount(_))
    ));
    let missing = TaskGroupId::from("tg-missing");
    assert_eq!(
        edit_task_group(&state, &missing, &edit(&elements, 10.0, "2027-01-01"), today(), &ids),
        Err(PlanningError::GroupNotFound(missing.clone()))
    );
}

#[test]
fn delete_detaches_tasks_and_removes_offers() {
    let ids = SequentialIds::new();
    let (state, elements, group_id) = shared_group_plan(&ids);
    let before: Vec<_> = elements[..2]
        .iter()
        .map(|element| state.element(element).expect("element").tasks[0].clone())
        .collect();

    let next = delete_task_group(&state, &group_id).expect("deleted");

    assert!(next.task_group(&group_id).is_none());
    assert!(next
        .offer_groups
        .values()
        .all(|offer| offer.task_group_id != group_id));
    for (element, old) in elements[..2].iter().zip(&before) {
        let task = &next.element(element).expect("element").tasks[0];
        assert_eq!(task.group_id, None);
        assert_eq!(task.offer_group_id, None);
        assert_eq!(task.id, old.id);
        assert_eq!(task.name, old.name);
        assert_eq!(task.cost, old.cost);
        assert_eq!(task.planned_on, old.planned_on);
    }
    assert!(next.verify().is_empty());
}

#[test]
fn edit_after_delete_reports_missing_group() {
    let ids = SequentialIds::new();
    let (state, elements, group_id) = shared_group_plan(&ids);

    let deleted = delete_task_group(&state, &group_id).expect("deleted");

    assert_eq!(
        delete_task_group(&deleted, &group_id),
        Err(PlanningError::GroupNotFound(group_id.clone()))
    );
    assert_eq!(
        edit_task_group(&deleted, &group_id, &edit(&elements, 10.0, "2027-01-01"), today(), &ids),
        Err(PlanningError::GroupNotFound(group_id.clone()))
    );
}

#[test]
fn offers_record_quotes_and_acceptance() {
    let ids = SequentialIds::new();
    let (state, elements) = plan(&["Roof"], &ids);
    let state = add_schedule(&state, &one_shot(&elements, 800.0), today(), &ids).expect("scheduled");
    let offer_id = state.offer_groups.keys().next().expect("offer").clone();

    let next = update_offer(
        &state,
        &offer_id,
        &OfferUpdate {
            offer_price: Some(760.0),
            accepted: Some(true),
            ..OfferUpdate::default()
        },
    )
    .expect("updated");
    let offer = &next.offer_groups[&offer_id];
    assert_eq!(offer.offer_price, Some(760.0));
    assert!(offer.accepted);
    assert_eq!(offer.invoice_price, None);
    assert_eq!(offer.estimated_value, 800.0);

    assert!(matches!(
        update_offer(
            &next,
            &offer_id,
            &OfferUpdate {
                invoice_price: Some(-4.0),
                ..OfferUpdate::default()
            }
        ),
        Err(PlanningError::InvalidAmount(_))
    ));
    let missing = OfferGroupId::from("og-missing");
    assert_eq!(
        update_offer(&next, &missing, &OfferUpdate::default()),
        Err(PlanningError::OfferNotFound(missing.clone()))
    );
}
