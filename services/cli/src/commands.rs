use crate::cli::{
    ApplyArgs, BudgetArgs, Command, CostArgs, DefectCommand, ElementCommand, ImportSurveyArgs,
    InspectionCommand, OfferArgs, ScheduleAddArgs, ScheduleCommand, ScheduleEditArgs, ScoreArgs,
    VerifyArgs,
};
use crate::infra::{id_generator, JsonFileRepository};
use chrono::NaiveDate;
use std::fs::File;
use std::path::PathBuf;
use tracing::{info, warn};
use upkeep::config::AppConfig;
use upkeep::error::AppError;
use upkeep::workflows::maintenance::condition::score_breakdown;
use upkeep::workflows::maintenance::defects::{InspectionUpdate, ObservationUpdate};
use upkeep::workflows::maintenance::report::{
    condition_overview, write_budget_csv, BudgetProjection,
};
use upkeep::workflows::maintenance::schedule::{
    GroupEdit, OfferUpdate, RecurrenceDraft, ScheduleDraft, DATE_FORMAT,
};
use upkeep::workflows::maintenance::{
    apply, CostModel, ElementId, IdGenerator, PlanCommand, PlanRepository, PlanState,
    TaskGroupId,
};
use upkeep::workflows::survey::SurveyImporter;

/// A loaded plan document plus what is needed to change it.
pub(crate) struct Session {
    repository: JsonFileRepository,
    state: PlanState,
    ids: Box<dyn IdGenerator>,
    today: NaiveDate,
    default_indexation: Option<f64>,
}

impl Session {
    pub(crate) fn open(
        config: &AppConfig,
        document: Option<PathBuf>,
        today: NaiveDate,
    ) -> Result<Self, AppError> {
        let repository = JsonFileRepository::new(
            document.unwrap_or_else(|| config.planning.document_path.clone()),
        );
        let loaded = repository.load()?;
        let ids = id_generator(config.planning.id_strategy, &loaded);
        let state = loaded.backfill(ids.as_ref());
        if state != loaded {
            warn!(path = %repository.path().display(), "plan document repaired while loading");
        }

        let rate = config.planning.default_indexation_percent;
        Ok(Self {
            repository,
            state,
            ids,
            today,
            default_indexation: (rate > 0.0).then_some(rate),
        })
    }

    fn apply(&mut self, command: &PlanCommand) -> Result<(), AppError> {
        self.state = apply(&self.state, command, self.ids.as_ref(), self.today)?;
        Ok(())
    }

    fn save(&self) -> Result<(), AppError> {
        self.repository.save(&self.state)?;
        info!(path = %self.repository.path().display(), "plan document saved");
        Ok(())
    }
}

pub(crate) fn dispatch(session: &mut Session, command: Command) -> Result<(), AppError> {
    match command {
        Command::Element { command } => run_element(session, command),
        Command::Defect { command } => run_defect(session, command),
        Command::Inspection { command } => run_inspection(session, command),
        Command::Score(args) => {
            run_score(&session.state, args);
            Ok(())
        }
        Command::Schedule { command } => run_schedule(session, command),
        Command::Offer(args) => run_offer(session, args),
        Command::Budget(args) => run_budget(&session.state, args),
        Command::ImportSurvey(args) => run_import(session, args),
        Command::Apply(args) => run_apply(session, args),
        // Handled before a session is opened.
        Command::Verify(_) | Command::Demo => Ok(()),
    }
}

fn run_element(session: &mut Session, command: ElementCommand) -> Result<(), AppError> {
    match command {
        ElementCommand::Add(args) => {
            let before = session.state.clone();
            session.apply(&PlanCommand::CreateElement {
                name: args.name,
                space: args.space,
                categories: args.categories,
            })?;
            session.save()?;
            for id in session.state.elements.keys() {
                if !before.elements.contains_key(id) {
                    println!("Created element {id}");
                }
            }
        }
        ElementCommand::List => {
            if session.state.elements.is_empty() {
                println!("No elements cataloged");
            }
            for element in session.state.elements.values() {
                println!(
                    "- {} | {} | {} | {} defects | {} reports | {} tasks",
                    element.id,
                    element.name,
                    element.space.as_deref().unwrap_or("-"),
                    element.defects.entries().count(),
                    element.inspections.len(),
                    element.tasks.len()
                );
            }
        }
    }
    Ok(())
}

fn run_defect(session: &mut Session, command: DefectCommand) -> Result<(), AppError> {
    let command = match command {
        DefectCommand::Add(args) if args.names.len() == 1 => PlanCommand::AddDefect {
            element_id: args.element,
            category: args.category,
            name: args.names.into_iter().next().unwrap_or_default(),
        },
        DefectCommand::Add(args) => PlanCommand::AddDefects {
            element_id: args.element,
            category: args.category,
            names: args.names,
        },
        DefectCommand::Remove(args) if args.names.len() == 1 => PlanCommand::RemoveDefect {
            element_id: args.element,
            category: args.category,
            name: args.names.into_iter().next().unwrap_or_default(),
        },
        DefectCommand::Remove(args) => PlanCommand::RemoveDefects {
            element_id: args.element,
            category: args.category,
            names: args.names,
        },
        DefectCommand::Move(args) => PlanCommand::RecategorizeDefect {
            element_id: args.element,
            from: args.from,
            to: args.to,
            name: args.name,
        },
    };
    session.apply(&command)?;
    session.save()?;
    println!("Defect registry updated ({})", command.action());
    Ok(())
}

fn run_inspection(session: &mut Session, command: InspectionCommand) -> Result<(), AppError> {
    let (element_id, command) = match command {
        InspectionCommand::Add { element } => (
            element.clone(),
            PlanCommand::AddInspection {
                element_id: element,
            },
        ),
        InspectionCommand::Update(args) => (
            args.element.clone(),
            PlanCommand::UpdateInspection {
                element_id: args.element,
                report_id: args.report,
                update: InspectionUpdate {
                    inspected_on: args.date,
                    notes: args.notes,
                    remarks: args.remarks,
                },
            },
        ),
        InspectionCommand::Remove { element, report } => (
            element.clone(),
            PlanCommand::RemoveInspection {
                element_id: element,
                report_id: report,
            },
        ),
        InspectionCommand::Observe(args) => (
            args.element.clone(),
            PlanCommand::UpdateObservation {
                element_id: args.element,
                report_id: args.report,
                observation_id: args.observation,
                update: ObservationUpdate {
                    extent: args.extent,
                    clear_extent: args.clear_extent,
                    intensity: args.intensity,
                    clear_intensity: args.clear_intensity,
                    description: args.description,
                    images: None,
                },
            },
        ),
    };

    session.apply(&command)?;
    session.save()?;
    if let Some(element) = session.state.element(&element_id) {
        for report in &element.inspections {
            println!(
                "- report {} | inspected {} | score {} | {} observations",
                report.id,
                report
                    .inspected_on
                    .map(|date| date.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                report.condition_score,
                report.observations.len()
            );
        }
    }
    Ok(())
}

fn run_score(state: &PlanState, args: ScoreArgs) {
    let Some(element_id) = args.element else {
        println!("Condition overview (1 = best, 6 = worst)");
        for line in condition_overview(state) {
            println!(
                "- {} | {} | score {} | inspected {} | {} registered defects",
                line.element_id,
                line.name,
                line.score
                    .map(|score| score.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                line.inspected_on
                    .map(|date| date.to_string())
                    .unwrap_or_else(|| "not yet".to_string()),
                line.registered_defects
            );
        }
        return;
    };

    let Some(element) = state.element(&element_id) else {
        println!("Element {element_id} not found");
        return;
    };
    println!("Condition of {} ({})", element.name, element.id);
    for report in &element.inspections {
        let breakdown = score_breakdown(&report.observations);
        println!(
            "\nReport {} | score {} | extent {:.1} weighted {:.1}",
            report.id, breakdown.score, breakdown.total_extent, breakdown.weighted_extent
        );
        for observation in &breakdown.observations {
            println!(
                "  - {} [{}] extent {} intensity {} severity score {}{}",
                observation.defect,
                observation
                    .severity
                    .map(|severity| severity.label())
                    .unwrap_or("uncategorized"),
                observation
                    .extent
                    .map(|extent| format!("{extent:.1}%"))
                    .unwrap_or_else(|| "-".to_string()),
                observation
                    .intensity
                    .map(|intensity| intensity.stage().to_string())
                    .unwrap_or_else(|| "-".to_string()),
                observation
                    .severity_score
                    .map(|score| score.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                if observation.counted { "" } else { " (not counted)" }
            );
        }
    }
}

fn cost_model(cost: CostArgs) -> CostModel {
    if cost.cost.is_empty() {
        CostModel::Shared {
            amount: cost.amount.unwrap_or_default(),
        }
    } else {
        CostModel::PerElement {
            amounts: cost.cost.into_iter().collect(),
        }
    }
}

fn run_schedule(session: &mut Session, command: ScheduleCommand) -> Result<(), AppError> {
    match command {
        ScheduleCommand::Add(args) => schedule_add(session, args),
        ScheduleCommand::Edit(args) => schedule_edit(session, args),
        ScheduleCommand::Delete { group } => {
            session.apply(&PlanCommand::DeleteTaskGroup {
                group_id: group.clone(),
            })?;
            session.save()?;
            println!("Deleted task group {group}; its tasks remain as history");
            Ok(())
        }
        ScheduleCommand::List => {
            let mut groups: Vec<_> = session.state.task_groups.values().collect();
            groups.sort_by(|a, b| a.planned_on.cmp(&b.planned_on).then(a.id.cmp(&b.id)));
            if groups.is_empty() {
                println!("Nothing planned");
            }
            for group in groups {
                let cadence = match &group.recurrence {
                    Some(origin) => format!(
                        " | period {} of every {} months",
                        origin.period_index + 1,
                        origin.periodicity_months
                    ),
                    None => String::new(),
                };
                println!(
                    "- {} | {} | {} | {} elements | {:.2}{}",
                    group.id,
                    group.planned_on,
                    group.name,
                    group.subtasks.len(),
                    group.total_cost(),
                    cadence
                );
            }
            Ok(())
        }
    }
}

fn schedule_add(session: &mut Session, args: ScheduleAddArgs) -> Result<(), AppError> {
    let ScheduleAddArgs {
        elements,
        name,
        date,
        cost,
        every,
        years,
        indexation,
    } = args;

    let recurrence = every.map(|periodicity_months| RecurrenceDraft {
        periodicity_months,
        horizon_years: years.unwrap_or_default(),
        indexation_percent: indexation.or(session.default_indexation),
    });
    let before: Vec<TaskGroupId> = session.state.task_groups.keys().cloned().collect();
    session.apply(&PlanCommand::AddSchedule(ScheduleDraft {
        element_ids: elements,
        name,
        date,
        cost: cost_model(cost),
        recurrence,
    }))?;
    session.save()?;

    let created: Vec<_> = session
        .state
        .task_groups
        .values()
        .filter(|group| !before.contains(&group.id))
        .collect();
    println!("Planned {} task groups", created.len());
    for group in created {
        println!(
            "- {} | {} | {:.2}",
            group.id,
            group.planned_on,
            group.total_cost()
        );
    }
    Ok(())
}

fn schedule_edit(session: &mut Session, args: ScheduleEditArgs) -> Result<(), AppError> {
    let ScheduleEditArgs {
        group,
        add,
        drop,
        name,
        date,
        cost,
    } = args;

    // Unchanged fields keep the group's current values.
    let edit = match session.state.task_group(&group) {
        Some(current) => {
            let mut element_ids: Vec<ElementId> = current
                .subtasks
                .iter()
                .filter(|element| !drop.contains(element))
                .cloned()
                .collect();
            element_ids.extend(add);
            let cost = if cost.amount.is_none() && cost.cost.is_empty() {
                current.cost.clone()
            } else {
                cost_model(cost)
            };
            GroupEdit {
                element_ids,
                name: name.unwrap_or_else(|| current.name.clone()),
                date: date.unwrap_or_else(|| current.planned_on.format(DATE_FORMAT).to_string()),
                cost,
            }
        }
        None => GroupEdit {
            element_ids: add,
            name: name.unwrap_or_default(),
            date: date.unwrap_or_default(),
            cost: cost_model(cost),
        },
    };

    session.apply(&PlanCommand::EditTaskGroup {
        group_id: group.clone(),
        edit,
    })?;
    session.save()?;
    match session.state.task_group(&group) {
        Some(updated) => println!(
            "Updated task group {} | {} | {} elements | {:.2}",
            updated.id,
            updated.planned_on,
            updated.subtasks.len(),
            updated.total_cost()
        ),
        None => println!("Task group {group} removed: no elements left"),
    }
    Ok(())
}

fn run_offer(session: &mut Session, args: OfferArgs) -> Result<(), AppError> {
    session.apply(&PlanCommand::UpdateOffer {
        offer_id: args.offer.clone(),
        update: OfferUpdate {
            offer_price: args.offer_price,
            invoice_price: args.invoice_price,
            accepted: args.accepted,
            work_date: args.work_date,
        },
    })?;
    session.save()?;
    if let Some(offer) = session.state.offer_groups.get(&args.offer) {
        println!(
            "Offer {} | estimated {:.2} | offered {} | invoiced {} | accepted {}",
            offer.id,
            offer.estimated_value,
            offer
                .offer_price
                .map(|price| format!("{price:.2}"))
                .unwrap_or_else(|| "-".to_string()),
            offer
                .invoice_price
                .map(|price| format!("{price:.2}"))
                .unwrap_or_else(|| "-".to_string()),
            offer.accepted
        );
    }
    Ok(())
}

fn run_budget(state: &PlanState, args: BudgetArgs) -> Result<(), AppError> {
    let projection = BudgetProjection::from_state(state);
    if args.csv {
        match args.output {
            Some(path) => write_budget_csv(File::create(path)?, &projection)?,
            None => write_budget_csv(std::io::stdout().lock(), &projection)?,
        }
        return Ok(());
    }

    if projection.years.is_empty() {
        println!("No maintenance planned");
        return Ok(());
    }
    for year in &projection.years {
        println!("{} | {} task groups | {:.2}", year.year, year.groups.len(), year.total);
        for line in &year.groups {
            println!(
                "  - {} | {} | {} elements | {:.2}",
                line.planned_on, line.name, line.elements, line.cost
            );
        }
    }
    println!("Total {:.2}", projection.total);
    Ok(())
}

fn run_import(session: &mut Session, args: ImportSurveyArgs) -> Result<(), AppError> {
    let import = SurveyImporter::from_path(&args.path, &session.state, session.ids.as_ref())?;
    session.state = import.state;
    session.save()?;
    println!(
        "Survey imported: {} batches applied, {} already registered",
        import.applied, import.skipped
    );
    Ok(())
}

fn run_apply(session: &mut Session, args: ApplyArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.path)?;
    let commands: Vec<PlanCommand> = serde_json::from_str(&raw).map_err(|err| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{}: {err}", args.path.display()),
        )
    })?;

    // Nothing is saved unless every command applies.
    for (index, command) in commands.iter().enumerate() {
        if let Err(err) = session.apply(command) {
            warn!(index, action = command.action(), "command rejected, nothing saved");
            return Err(err);
        }
    }
    session.save()?;
    println!("Applied {} commands", commands.len());
    Ok(())
}

pub(crate) fn run_verify(
    config: &AppConfig,
    document: Option<PathBuf>,
    args: VerifyArgs,
) -> Result<(), AppError> {
    let repository =
        JsonFileRepository::new(document.unwrap_or_else(|| config.planning.document_path.clone()));
    let state = repository.load()?;
    let issues = state.verify();
    if issues.is_empty() {
        println!("Plan document is consistent");
        return Ok(());
    }
    for issue in &issues {
        println!("- {issue}");
    }

    if args.repair {
        let ids = id_generator(config.planning.id_strategy, &state);
        let repaired = state.backfill(ids.as_ref());
        repository.save(&repaired)?;
        let remaining = repaired.verify();
        println!(
            "Repaired {} issues, {} need manual attention",
            issues.len().saturating_sub(remaining.len()),
            remaining.len()
        );
    }
    Ok(())
}
