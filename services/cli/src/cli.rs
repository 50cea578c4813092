use crate::commands::{self, Session};
use crate::demo::run_demo;
use crate::infra::{parse_date, parse_element_amount};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use upkeep::config::AppConfig;
use upkeep::error::AppError;
use upkeep::telemetry;
use upkeep::workflows::maintenance::{
    ElementId, Intensity, ObservationId, OfferGroupId, ReportId, TaskGroupId,
};

#[derive(Parser, Debug)]
#[command(
    name = "upkeep",
    about = "Track building element condition and plan maintenance work and budgets",
    version
)]
struct Cli {
    /// Plan document to read and update (defaults to PLAN_DOCUMENT, then plan.json)
    #[arg(long, global = true)]
    document: Option<PathBuf>,
    /// Date used as "today" for new task groups (YYYY-MM-DD). Defaults to the local date.
    #[arg(long, global = true, value_parser = parse_date)]
    today: Option<NaiveDate>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Catalog and list building elements
    Element {
        #[command(subcommand)]
        command: ElementCommand,
    },
    /// Maintain the defect registry of an element
    Defect {
        #[command(subcommand)]
        command: DefectCommand,
    },
    /// Record inspections and measured defects
    Inspection {
        #[command(subcommand)]
        command: InspectionCommand,
    },
    /// Show condition scores per element
    Score(ScoreArgs),
    /// Plan, edit and delete maintenance work
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
    /// Record quotes, invoices and acceptance for an offer group
    Offer(OfferArgs),
    /// Print the multi-year maintenance budget
    Budget(BudgetArgs),
    /// Register defects from a survey CSV export (element_id,category,defect)
    ImportSurvey(ImportSurveyArgs),
    /// Apply a JSON array of plan commands, all or nothing
    Apply(ApplyArgs),
    /// Check the plan document for broken links between records
    Verify(VerifyArgs),
    /// Walk through a sample plan in memory without touching the document
    Demo,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ElementCommand {
    /// Add a building element with one empty inspection report
    Add(ElementAddArgs),
    /// List elements with their defect and task counts
    List,
}

#[derive(Args, Debug)]
pub(crate) struct ElementAddArgs {
    pub(crate) name: String,
    /// Space or room the element belongs to
    #[arg(long)]
    pub(crate) space: Option<String>,
    /// Element category; repeat for several
    #[arg(long = "category")]
    pub(crate) categories: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum DefectCommand {
    /// Register one or more defect names under a category (severe, serious, minor)
    Add(DefectArgs),
    /// Remove defect names from a category together with their observations
    Remove(DefectArgs),
    /// Move a defect to another category, keeping its measurements
    Move(DefectMoveArgs),
}

#[derive(Args, Debug)]
pub(crate) struct DefectArgs {
    #[arg(long)]
    pub(crate) element: ElementId,
    #[arg(long)]
    pub(crate) category: String,
    #[arg(required = true)]
    pub(crate) names: Vec<String>,
}

#[derive(Args, Debug)]
pub(crate) struct DefectMoveArgs {
    #[arg(long)]
    pub(crate) element: ElementId,
    #[arg(long)]
    pub(crate) from: String,
    #[arg(long)]
    pub(crate) to: String,
    pub(crate) name: String,
}

#[derive(Subcommand, Debug)]
pub(crate) enum InspectionCommand {
    /// Start a new inspection report seeded with the registered defects
    Add {
        #[arg(long)]
        element: ElementId,
    },
    /// Record the date, notes or remarks of a report
    Update(InspectionUpdateArgs),
    /// Remove a report; the last one of an element stays
    Remove {
        #[arg(long)]
        element: ElementId,
        #[arg(long)]
        report: ReportId,
    },
    /// Record extent and intensity of an observed defect
    Observe(ObserveArgs),
}

#[derive(Args, Debug)]
pub(crate) struct InspectionUpdateArgs {
    #[arg(long)]
    pub(crate) element: ElementId,
    #[arg(long)]
    pub(crate) report: ReportId,
    /// Date the inspection took place (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    #[arg(long)]
    pub(crate) notes: Option<String>,
    #[arg(long)]
    pub(crate) remarks: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ObserveArgs {
    #[arg(long)]
    pub(crate) element: ElementId,
    #[arg(long)]
    pub(crate) report: ReportId,
    #[arg(long)]
    pub(crate) observation: ObservationId,
    /// Affected share of the element in percent (0-100)
    #[arg(long)]
    pub(crate) extent: Option<f64>,
    /// Reset the extent to unmeasured
    #[arg(long, conflicts_with = "extent")]
    pub(crate) clear_extent: bool,
    /// Intensity stage: 1 initial, 2 advanced, 3 final
    #[arg(long, value_parser = parse_intensity)]
    pub(crate) intensity: Option<Intensity>,
    /// Reset the intensity stage to unmeasured
    #[arg(long, conflicts_with = "intensity")]
    pub(crate) clear_intensity: bool,
    #[arg(long)]
    pub(crate) description: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Show the per-observation breakdown of one element
    #[arg(long)]
    pub(crate) element: Option<ElementId>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ScheduleCommand {
    /// Plan work for one or more elements, once or periodically
    Add(ScheduleAddArgs),
    /// Change an existing task group
    Edit(ScheduleEditArgs),
    /// Delete a task group; its tasks stay as detached history
    Delete {
        #[arg(long)]
        group: TaskGroupId,
    },
    /// List task groups by planned date
    List,
}

#[derive(Args, Debug)]
pub(crate) struct CostArgs {
    /// Amount charged to every selected element
    #[arg(long, conflicts_with = "cost")]
    pub(crate) amount: Option<f64>,
    /// Per-element amount as ELEMENT=AMOUNT; repeat for each element
    #[arg(long, value_parser = parse_element_amount)]
    pub(crate) cost: Vec<(ElementId, f64)>,
}

#[derive(Args, Debug)]
pub(crate) struct ScheduleAddArgs {
    /// Element to plan for; repeat for several
    #[arg(long = "element", required = true)]
    pub(crate) elements: Vec<ElementId>,
    #[arg(long)]
    pub(crate) name: String,
    /// Planned date of the (first) occurrence, YYYY-MM-DD
    #[arg(long)]
    pub(crate) date: String,
    #[command(flatten)]
    pub(crate) cost: CostArgs,
    /// Repeat every N calendar months
    #[arg(long, requires = "years")]
    pub(crate) every: Option<i64>,
    /// Planning horizon in years for periodic work
    #[arg(long, requires = "every")]
    pub(crate) years: Option<i64>,
    /// Yearly cost indexation in percent (defaults to PLAN_DEFAULT_INDEXATION)
    #[arg(long, requires = "every")]
    pub(crate) indexation: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct ScheduleEditArgs {
    #[arg(long)]
    pub(crate) group: TaskGroupId,
    /// Element to add to the group; repeat for several
    #[arg(long = "add")]
    pub(crate) add: Vec<ElementId>,
    /// Element to drop from the group; repeat for several
    #[arg(long = "drop")]
    pub(crate) drop: Vec<ElementId>,
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) date: Option<String>,
    #[command(flatten)]
    pub(crate) cost: CostArgs,
}

#[derive(Args, Debug)]
pub(crate) struct OfferArgs {
    #[arg(long)]
    pub(crate) offer: OfferGroupId,
    #[arg(long)]
    pub(crate) offer_price: Option<f64>,
    #[arg(long)]
    pub(crate) invoice_price: Option<f64>,
    #[arg(long)]
    pub(crate) accepted: Option<bool>,
    #[arg(long, value_parser = parse_date)]
    pub(crate) work_date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct BudgetArgs {
    /// Print CSV (year,groups,total) instead of the table
    #[arg(long)]
    pub(crate) csv: bool,
    /// Write the CSV to a file instead of stdout
    #[arg(long, requires = "csv")]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportSurveyArgs {
    pub(crate) path: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ApplyArgs {
    /// JSON file holding an array of commands
    pub(crate) path: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct VerifyArgs {
    /// Add missing inspection reports and observations, then save
    #[arg(long)]
    pub(crate) repair: bool,
}

fn parse_intensity(raw: &str) -> Result<Intensity, String> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .and_then(Intensity::from_stage)
        .ok_or_else(|| format!("intensity must be 1, 2 or 3, got '{raw}'"))
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    match cli.command {
        Command::Demo => run_demo(today),
        Command::Verify(args) => commands::run_verify(&config, cli.document, args),
        command => {
            let mut session = Session::open(&config, cli.document, today)?;
            commands::dispatch(&mut session, command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn periodic_schedule_arguments_parse() {
        let cli = Cli::try_parse_from([
            "upkeep",
            "--document",
            "plan.json",
            "schedule",
            "add",
            "--element",
            "el-000001",
            "--element",
            "el-000004",
            "--name",
            "Clean gutters",
            "--date",
            "2026-04-01",
            "--amount",
            "200",
            "--every",
            "12",
            "--years",
            "10",
        ])
        .expect("arguments parse");
        match cli.command {
            Command::Schedule {
                command: ScheduleCommand::Add(args),
            } => {
                assert_eq!(args.elements.len(), 2);
                assert_eq!(args.cost.amount, Some(200.0));
                assert_eq!(args.every, Some(12));
                assert_eq!(args.years, Some(10));
                assert_eq!(args.indexation, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn periodicity_requires_a_horizon() {
        let result = Cli::try_parse_from([
            "upkeep", "schedule", "add", "--element", "el-1", "--name", "Paint", "--date",
            "2026-04-01", "--amount", "10", "--every", "6",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn intensity_stages_are_validated() {
        assert_eq!(parse_intensity("2"), Ok(Intensity::Advanced));
        assert!(parse_intensity("4").is_err());
        assert!(parse_intensity("high").is_err());
    }

    #[test]
    fn measurements_can_be_cleared_but_not_set_at_once() {
        let base = [
            "upkeep", "inspection", "observe", "--element", "el-1", "--report", "ir-1",
            "--observation", "ob-1",
        ];
        let cli = Cli::try_parse_from(base.iter().copied().chain(["--clear-intensity"]))
            .expect("arguments parse");
        match cli.command {
            Command::Inspection {
                command: InspectionCommand::Observe(args),
            } => {
                assert!(args.clear_intensity);
                assert!(!args.clear_extent);
                assert_eq!(args.intensity, None);
            }
            other => panic!("unexpected command {other:?}"),
        }

        let conflicting =
            Cli::try_parse_from(base.iter().copied().chain(["--extent", "20", "--clear-extent"]));
        assert!(conflicting.is_err());
    }
}
