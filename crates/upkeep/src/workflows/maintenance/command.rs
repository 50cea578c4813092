use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::defects::{
    add_defect_in, add_defects_in, add_inspection, recategorize_defect_in, remove_defect_in,
    remove_defects_in, remove_inspection, update_inspection, update_observation, InspectionUpdate,
    ObservationUpdate,
};
use super::domain::{
    Element, ElementId, ObservationId, OfferGroupId, PlanningError, ReportId, Severity,
    TaskGroupId,
};
use super::ids::IdGenerator;
use super::schedule::{
    add_schedule, delete_task_group, edit_task_group, update_offer, GroupEdit, OfferUpdate,
    ScheduleDraft,
};
use super::state::PlanState;

/// One user intent in serializable form. Categories stay text here so an unknown category
/// is reported as [`PlanningError::UnknownCategory`] instead of failing to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlanCommand {
    CreateElement {
        name: String,
        #[serde(default)]
        space: Option<String>,
        #[serde(default)]
        categories: Vec<String>,
    },
    AddDefect {
        element_id: ElementId,
        category: String,
        name: String,
    },
    RemoveDefect {
        element_id: ElementId,
        category: String,
        name: String,
    },
    AddDefects {
        element_id: ElementId,
        category: String,
        names: Vec<String>,
    },
    RemoveDefects {
        element_id: ElementId,
        category: String,
        names: Vec<String>,
    },
    RecategorizeDefect {
        element_id: ElementId,
        from: String,
        to: String,
        name: String,
    },
    AddInspection {
        element_id: ElementId,
    },
    UpdateInspection {
        element_id: ElementId,
        report_id: ReportId,
        #[serde(flatten)]
        update: InspectionUpdate,
    },
    RemoveInspection {
        element_id: ElementId,
        report_id: ReportId,
    },
    UpdateObservation {
        element_id: ElementId,
        report_id: ReportId,
        observation_id: ObservationId,
        #[serde(flatten)]
        update: ObservationUpdate,
    },
    AddSchedule(ScheduleDraft),
    EditTaskGroup {
        group_id: TaskGroupId,
        #[serde(flatten)]
        edit: GroupEdit,
    },
    DeleteTaskGroup {
        group_id: TaskGroupId,
    },
    UpdateOffer {
        offer_id: OfferGroupId,
        #[serde(flatten)]
        update: OfferUpdate,
    },
}

impl PlanCommand {
    pub const fn action(&self) -> &'static str {
        match self {
            PlanCommand::CreateElement { .. } => "create_element",
            PlanCommand::AddDefect { .. } => "add_defect",
            PlanCommand::RemoveDefect { .. } => "remove_defect",
            PlanCommand::AddDefects { .. } => "add_defects",
            PlanCommand::RemoveDefects { .. } => "remove_defects",
            PlanCommand::RecategorizeDefect { .. } => "recategorize_defect",
            PlanCommand::AddInspection { .. } => "add_inspection",
            PlanCommand::UpdateInspection { .. } => "update_inspection",
            PlanCommand::RemoveInspection { .. } => "remove_inspection",
            PlanCommand::UpdateObservation { .. } => "update_observation",
            PlanCommand::AddSchedule(_) => "add_schedule",
            PlanCommand::EditTaskGroup { .. } => "edit_task_group",
            PlanCommand::DeleteTaskGroup { .. } => "delete_task_group",
            PlanCommand::UpdateOffer { .. } => "update_offer",
        }
    }
}

/// Apply one command to the state. Commands must be applied in submission order; on
/// failure the given state is left as it was.
pub fn apply(
    state: &PlanState,
    command: &PlanCommand,
    ids: &dyn IdGenerator,
    today: NaiveDate,
) -> Result<PlanState, PlanningError> {
    debug!(action = command.action(), "applying plan command");

    match command {
        PlanCommand::CreateElement {
            name,
            space,
            categories,
        } => {
            let mut element = Element::create(name, ids);
            element.space = space.clone();
            element.categories = categories.clone();
            Ok(state.with_element(element))
        }
        PlanCommand::AddDefect {
            element_id,
            category,
            name,
        } => add_defect_in(state, element_id, category.parse::<Severity>()?, name, ids),
        PlanCommand::RemoveDefect {
            element_id,
            category,
            name,
        } => remove_defect_in(state, element_id, category.parse::<Severity>()?, name),
        PlanCommand::AddDefects {
            element_id,
            category,
            names,
        } => add_defects_in(state, element_id, category.parse::<Severity>()?, names, ids),
        PlanCommand::RemoveDefects {
            element_id,
            category,
            names,
        } => remove_defects_in(state, element_id, category.parse::<Severity>()?, names),
        PlanCommand::RecategorizeDefect {
            element_id,
            from,
            to,
            name,
        } => recategorize_defect_in(
            state,
            element_id,
            from.parse::<Severity>()?,
            to.parse::<Severity>()?,
            name,
        ),
        PlanCommand::AddInspection { element_id } => {
            state.update_element(element_id, |element| Ok(add_inspection(element, ids)))
        }
        PlanCommand::UpdateInspection {
            element_id,
            report_id,
            update,
        } => state.update_element(element_id, |element| {
            update_inspection(element, report_id, update.clone())
        }),
        PlanCommand::RemoveInspection {
            element_id,
            report_id,
        } => state.update_element(element_id, |element| remove_inspection(element, report_id)),
        PlanCommand::UpdateObservation {
            element_id,
            report_id,
            observation_id,
            update,
        } => state.update_element(element_id, |element| {
            update_observation(element, report_id, observation_id, update.clone())
        }),
        PlanCommand::AddSchedule(draft) => add_schedule(state, draft, today, ids),
        PlanCommand::EditTaskGroup { group_id, edit } => {
            edit_task_group(state, group_id, edit, today, ids)
        }
        PlanCommand::DeleteTaskGroup { group_id } => delete_task_group(state, group_id),
        PlanCommand::UpdateOffer { offer_id, update } => update_offer(state, offer_id, update),
    }
}
