use chrono::NaiveDate;
use upkeep::error::AppError;
use upkeep::workflows::maintenance::defects::ObservationUpdate;
use upkeep::workflows::maintenance::report::BudgetProjection;
use upkeep::workflows::maintenance::schedule::{RecurrenceDraft, ScheduleDraft};
use upkeep::workflows::maintenance::{
    apply, CostModel, ElementId, Intensity, PlanCommand, PlanState, SequentialIds, Severity,
};

/// Walk a two-element plan through registry, scoring and scheduling, printing as it goes.
pub(crate) fn run_demo(today: NaiveDate) -> Result<(), AppError> {
    let ids = SequentialIds::new();
    let mut state = PlanState::new();

    println!("Maintenance planning demo (today {today})");
    for (name, space) in [("Roof covering", "Roof"), ("Window frames", "Facade north")] {
        state = apply(
            &state,
            &PlanCommand::CreateElement {
                name: name.to_string(),
                space: Some(space.to_string()),
                categories: Vec::new(),
            },
            &ids,
            today,
        )?;
    }
    let roof = element_named(&state, "Roof covering");
    let frames = element_named(&state, "Window frames");

    state = apply(
        &state,
        &PlanCommand::AddDefects {
            element_id: roof.clone(),
            category: "severe".to_string(),
            names: vec!["Leakage".to_string(), "Loose tiles".to_string()],
        },
        &ids,
        today,
    )?;
    state = apply(
        &state,
        &PlanCommand::AddDefect {
            element_id: frames.clone(),
            category: "minor".to_string(),
            name: "Peeling paint".to_string(),
        },
        &ids,
        today,
    )?;

    let measurements = [
        (&roof, Severity::Severe, "Leakage", 30.0, Intensity::Advanced),
        (&roof, Severity::Severe, "Loose tiles", 10.0, Intensity::Initial),
        (&frames, Severity::Minor, "Peeling paint", 60.0, Intensity::Final),
    ];
    for (element_id, severity, defect, extent, intensity) in measurements {
        let Some(element) = state.element(element_id) else {
            continue;
        };
        let report = &element.inspections[0];
        let Some(observation) = report
            .observations
            .iter()
            .find(|observation| observation.matches(severity, defect))
        else {
            continue;
        };
        let command = PlanCommand::UpdateObservation {
            element_id: element_id.clone(),
            report_id: report.id.clone(),
            observation_id: observation.id.clone(),
            update: ObservationUpdate {
                extent: Some(extent),
                intensity: Some(intensity),
                ..ObservationUpdate::default()
            },
        };
        state = apply(&state, &command, &ids, today)?;
    }

    println!("\nCondition scores (1 = best, 6 = worst)");
    for element in state.elements.values() {
        let score = element
            .inspections
            .last()
            .map(|report| report.condition_score)
            .unwrap_or(1);
        println!(
            "- {}: {} | defects: {}",
            element.name,
            score,
            element
                .defects
                .entries()
                .map(|(severity, name)| format!("{name} ({severity})"))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    state = apply(
        &state,
        &PlanCommand::AddSchedule(ScheduleDraft {
            element_ids: vec![roof.clone()],
            name: "Replace roof covering".to_string(),
            date: format!("{}-05-01", today.format("%Y")),
            cost: CostModel::Shared { amount: 14_500.0 },
            recurrence: None,
        }),
        &ids,
        today,
    )?;
    state = apply(
        &state,
        &PlanCommand::AddSchedule(ScheduleDraft {
            element_ids: vec![frames.clone(), roof.clone()],
            name: "Inspect and repaint".to_string(),
            date: format!("{}-09-01", today.format("%Y")),
            cost: CostModel::PerElement {
                amounts: [(frames.clone(), 1_800.0), (roof.clone(), 350.0)]
                    .into_iter()
                    .collect(),
            },
            recurrence: Some(RecurrenceDraft {
                periodicity_months: 24,
                horizon_years: 6,
                indexation_percent: Some(2.5),
            }),
        }),
        &ids,
        today,
    )?;

    let budget = BudgetProjection::from_state(&state);
    println!("\nBudget by year");
    for year in &budget.years {
        println!("- {}: {:.2} over {} task groups", year.year, year.total, year.groups.len());
        for line in &year.groups {
            println!("    {} {} ({:.2})", line.planned_on, line.name, line.cost);
        }
    }
    println!("Total planned: {:.2}", budget.total);

    let issues = state.verify();
    if issues.is_empty() {
        println!("\nAll records cross-reference cleanly");
    } else {
        for issue in issues {
            println!("! {issue}");
        }
    }
    Ok(())
}

fn element_named(state: &PlanState, name: &str) -> ElementId {
    state
        .elements
        .values()
        .find(|element| element.name == name)
        .map(|element| element.id.clone())
        .unwrap_or_else(|| ElementId::from(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_to_completion() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date");
        run_demo(today).expect("demo runs");
    }
}
