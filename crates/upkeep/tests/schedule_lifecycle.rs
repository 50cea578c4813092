use chrono::NaiveDate;
use upkeep::workflows::maintenance::schedule::{GroupEdit, RecurrenceDraft, ScheduleDraft};
use upkeep::workflows::maintenance::{
    apply, CostModel, ElementId, PlanCommand, PlanState, PlanningError, SequentialIds,
    TaskGroupId,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn today() -> NaiveDate {
    date(2026, 3, 2)
}

fn plan_with(names: &[&str], ids: &SequentialIds) -> (PlanState, Vec<ElementId>) {
    let mut state = PlanState::new();
    for name in names {
        state = apply(
            &state,
            &PlanCommand::CreateElement {
                name: name.to_string(),
                space: None,
                categories: Vec::new(),
            },
            ids,
            today(),
        )
        .expect("element created");
    }
    let mut elements: Vec<_> = state.elements.values().collect();
    elements.sort_by_key(|element| names.iter().position(|name| *name == element.name));
    let element_ids = elements.iter().map(|element| element.id.clone()).collect();
    (state, element_ids)
}

fn schedule(elements: &[ElementId], amount: f64, recurrence: Option<RecurrenceDraft>) -> PlanCommand {
    PlanCommand::AddSchedule(ScheduleDraft {
        element_ids: elements.to_vec(),
        name: "Service boiler".to_string(),
        date: "2026-05-20".to_string(),
        cost: CostModel::Shared { amount },
        recurrence,
    })
}

fn groups_of(state: &PlanState, element: &ElementId) -> Vec<TaskGroupId> {
    state
        .task_groups
        .values()
        .filter(|group| group.subtasks.contains(element))
        .map(|group| group.id.clone())
        .collect()
}

#[test]
fn yearly_schedule_over_three_years_yields_six_triads() {
    let ids = SequentialIds::new();
    let (state, elements) = plan_with(&["Boiler A", "Boiler B"], &ids);

    let state = apply(
        &state,
        &schedule(
            &elements,
            400.0,
            Some(RecurrenceDraft {
                periodicity_months: 12,
                horizon_years: 3,
                indexation_percent: None,
            }),
        ),
        &ids,
        today(),
    )
    .expect("scheduled");

    assert_eq!(state.task_groups.len(), 6);
    assert_eq!(state.offer_groups.len(), 6);
    for element_id in &elements {
        let element = state.element(element_id).expect("element");
        let mut dates: Vec<_> = element.tasks.iter().map(|task| task.planned_on).collect();
        dates.sort();
        assert_eq!(
            dates,
            vec![date(2026, 5, 20), date(2027, 5, 20), date(2028, 5, 20)]
        );
        assert_eq!(groups_of(&state, element_id).len(), 3);
    }
    assert!(state.verify().is_empty());
}

#[test]
fn two_full_years_of_ten_percent_indexation() {
    let ids = SequentialIds::new();
    let (state, elements) = plan_with(&["Facade"], &ids);

    let state = apply(
        &state,
        &schedule(
            &elements,
            1000.0,
            Some(RecurrenceDraft {
                periodicity_months: 24,
                horizon_years: 6,
                indexation_percent: Some(10.0),
            }),
        ),
        &ids,
        today(),
    )
    .expect("scheduled");

    let facade = state.element(&elements[0]).expect("facade");
    let two_years_later = facade
        .tasks
        .iter()
        .find(|task| task.planned_on == date(2028, 5, 20))
        .expect("second period");
    assert_eq!(two_years_later.cost, 1210.0);
}

#[test]
fn delete_then_edit_reports_group_not_found() {
    let ids = SequentialIds::new();
    let (state, elements) = plan_with(&["Boiler A", "Boiler B"], &ids);
    let state = apply(&state, &schedule(&elements, 300.0, None), &ids, today()).expect("scheduled");
    let group_id = groups_of(&state, &elements[0]).remove(0);

    let state = apply(
        &state,
        &PlanCommand::DeleteTaskGroup {
            group_id: group_id.clone(),
        },
        &ids,
        today(),
    )
    .expect("deleted");

    let task = &state.element(&elements[0]).expect("boiler").tasks[0];
    assert_eq!(task.group_id, None);
    assert_eq!(task.offer_group_id, None);
    assert_eq!(task.cost, 300.0);
    assert_eq!(task.planned_on, date(2026, 5, 20));

    let edit = PlanCommand::EditTaskGroup {
        group_id: group_id.clone(),
        edit: GroupEdit {
            element_ids: elements.clone(),
            name: "Service boiler".to_string(),
            date: "2026-06-01".to_string(),
            cost: CostModel::Shared { amount: 320.0 },
        },
    };
    assert_eq!(
        apply(&state, &edit, &ids, today()),
        Err(PlanningError::GroupNotFound(group_id))
    );
    assert_eq!(groups_of(&state, &elements[1]).len(), 1);
}

#[test]
fn plan_survives_a_json_round_trip() {
    let ids = SequentialIds::new();
    let (state, elements) = plan_with(&["Boiler A"], &ids);
    let state = apply(
        &state,
        &schedule(
            &elements,
            250.0,
            Some(RecurrenceDraft {
                periodicity_months: 6,
                horizon_years: 2,
                indexation_percent: Some(3.0),
            }),
        ),
        &ids,
        today(),
    )
    .expect("scheduled");

    let json = serde_json::to_string(&state).expect("serializes");
    let restored: PlanState = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(restored, state);
    assert_eq!(restored.backfill(&ids), restored);
}
