use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::IdGenerator;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

record_id!(
    /// Identifier of a cataloged building element.
    ElementId
);
record_id!(ReportId);
record_id!(ObservationId);
record_id!(TaskGroupId);
record_id!(OfferGroupId);
record_id!(TaskId);

/// Opaque reference to a photo or document handed over by the media collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(pub String);

/// Defect severity category. The set is closed: anything else is rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Severe,
    Serious,
    Minor,
}

impl Severity {
    pub const fn ordered() -> [Self; 3] {
        [Self::Severe, Self::Serious, Self::Minor]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Severe => "severe",
            Self::Serious => "serious",
            Self::Minor => "minor",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Severity {
    type Err = PlanningError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "severe" => Ok(Self::Severe),
            "serious" => Ok(Self::Serious),
            "minor" => Ok(Self::Minor),
            _ => Err(PlanningError::UnknownCategory(value.to_string())),
        }
    }
}

/// Intensity stage of an observed defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Intensity {
    Initial,
    Advanced,
    Final,
}

impl Intensity {
    pub const fn stage(self) -> u8 {
        match self {
            Self::Initial => 1,
            Self::Advanced => 2,
            Self::Final => 3,
        }
    }

    pub const fn from_stage(stage: u8) -> Option<Self> {
        match stage {
            1 => Some(Self::Initial),
            2 => Some(Self::Advanced),
            3 => Some(Self::Final),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Intensity {
    type Error = String;

    fn try_from(stage: u8) -> Result<Self, Self::Error> {
        Self::from_stage(stage).ok_or_else(|| format!("intensity stage {stage} is not 1, 2 or 3"))
    }
}

impl From<Intensity> for u8 {
    fn from(value: Intensity) -> Self {
        value.stage()
    }
}

/// Registered defect names per severity category.
///
/// Names are unique within a category and keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectRegistry {
    #[serde(default)]
    severe: Vec<String>,
    #[serde(default)]
    serious: Vec<String>,
    #[serde(default)]
    minor: Vec<String>,
}

impl DefectRegistry {
    pub fn names(&self, severity: Severity) -> &[String] {
        match severity {
            Severity::Severe => &self.severe,
            Severity::Serious => &self.serious,
            Severity::Minor => &self.minor,
        }
    }

    pub fn contains(&self, severity: Severity, name: &str) -> bool {
        self.names(severity).iter().any(|entry| entry == name)
    }

    pub fn is_empty(&self) -> bool {
        Severity::ordered()
            .into_iter()
            .all(|severity| self.names(severity).is_empty())
    }

    /// Every `(severity, name)` pair, severe first.
    pub fn entries(&self) -> impl Iterator<Item = (Severity, &str)> + '_ {
        Severity::ordered().into_iter().flat_map(move |severity| {
            self.names(severity)
                .iter()
                .map(move |name| (severity, name.as_str()))
        })
    }

    /// Returns `false` when the name was already registered.
    pub(crate) fn insert(&mut self, severity: Severity, name: &str) -> bool {
        if self.contains(severity, name) {
            return false;
        }
        self.names_mut(severity).push(name.to_string());
        true
    }

    /// Returns `false` when the name was not registered.
    pub(crate) fn remove(&mut self, severity: Severity, name: &str) -> bool {
        let names = self.names_mut(severity);
        let before = names.len();
        names.retain(|entry| entry != name);
        names.len() != before
    }

    fn names_mut(&mut self, severity: Severity) -> &mut Vec<String> {
        match severity {
            Severity::Severe => &mut self.severe,
            Severity::Serious => &mut self.serious,
            Severity::Minor => &mut self.minor,
        }
    }
}

/// One sighting of a registered defect inside an inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectObservation {
    pub id: ObservationId,
    pub defect: String,
    #[serde(default)]
    pub severity: Option<Severity>,
    /// Percentage (0-100) of the affected surface.
    #[serde(default)]
    pub extent: Option<f64>,
    #[serde(default)]
    pub intensity: Option<Intensity>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<MediaRef>,
}

impl DefectObservation {
    pub fn placeholder(id: ObservationId, severity: Severity, defect: &str) -> Self {
        Self {
            id,
            defect: defect.to_string(),
            severity: Some(severity),
            extent: None,
            intensity: None,
            description: String::new(),
            images: Vec::new(),
        }
    }

    pub fn matches(&self, severity: Severity, defect: &str) -> bool {
        self.severity == Some(severity) && self.defect == defect
    }
}

pub const BEST_CONDITION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionReport {
    pub id: ReportId,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub inspected_on: Option<NaiveDate>,
    #[serde(default)]
    pub observations: Vec<DefectObservation>,
    #[serde(default = "best_condition")]
    pub condition_score: u8,
    #[serde(default)]
    pub remarks: String,
}

fn best_condition() -> u8 {
    BEST_CONDITION
}

impl InspectionReport {
    pub fn empty(id: ReportId) -> Self {
        Self {
            id,
            notes: String::new(),
            inspected_on: None,
            observations: Vec::new(),
            condition_score: BEST_CONDITION,
            remarks: String::new(),
        }
    }
}

/// A cataloged building component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub space: Option<String>,
    /// Material, lifespan and similar fields the planner never interprets.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub defects: DefectRegistry,
    #[serde(default)]
    pub inspections: Vec<InspectionReport>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub media: Vec<MediaRef>,
}

impl Element {
    /// New element with an empty registry and one empty inspection report.
    pub fn create(name: &str, ids: &dyn IdGenerator) -> Self {
        Self {
            id: ids.element_id(),
            name: name.trim().to_string(),
            categories: Vec::new(),
            space: None,
            attributes: BTreeMap::new(),
            defects: DefectRegistry::default(),
            inspections: vec![InspectionReport::empty(ids.report_id())],
            tasks: Vec::new(),
            media: Vec::new(),
        }
    }

    pub fn inspection(&self, id: &ReportId) -> Option<&InspectionReport> {
        self.inspections.iter().find(|report| &report.id == id)
    }
}

/// Work scheduled against one element. `group_id`/`offer_group_id` are cleared when the
/// owning task group is deleted; the rest of the record survives as history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub cost: f64,
    pub planned_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<TaskGroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_group_id: Option<OfferGroupId>,
    #[serde(default)]
    pub attachments: Vec<MediaRef>,
}

/// Cost attached to a task group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostModel {
    /// The same amount for every subtask.
    Shared { amount: f64 },
    PerElement { amounts: BTreeMap<ElementId, f64> },
}

impl CostModel {
    pub fn amount_for(&self, element: &ElementId) -> Option<f64> {
        match self {
            CostModel::Shared { amount } => Some(*amount),
            CostModel::PerElement { amounts } => amounts.get(element).copied(),
        }
    }
}

/// Records which periodic intent produced a task group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceOrigin {
    pub period_index: u32,
    pub periodicity_months: u32,
    pub horizon_years: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexation_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskGroup {
    pub id: TaskGroupId,
    pub name: String,
    pub planned_on: NaiveDate,
    pub cost: CostModel,
    pub subtasks: Vec<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceOrigin>,
    pub created_on: NaiveDate,
}

impl TaskGroup {
    /// Sum of the cost of every subtask. Subtasks without a per-element amount count as zero.
    pub fn total_cost(&self) -> f64 {
        self.subtasks
            .iter()
            .map(|element| self.cost.amount_for(element).unwrap_or(0.0))
            .sum()
    }
}

/// Financial counterpart of one (task group, element) pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferGroup {
    pub id: OfferGroupId,
    pub task_group_id: TaskGroupId,
    pub element_id: ElementId,
    pub name: String,
    pub estimated_value: f64,
    #[serde(default)]
    pub offer_price: Option<f64>,
    #[serde(default)]
    pub invoice_price: Option<f64>,
    #[serde(default)]
    pub accepted: bool,
    pub work_date: NaiveDate,
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Named failure of a planning operation. None of these are fatal: the state is simply not
/// advanced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanningError {
    #[error("unknown defect category '{0}' (expected severe, serious or minor)")]
    UnknownCategory(String),
    #[error("defect '{name}' is already registered as {severity}")]
    DuplicateDefect { severity: Severity, name: String },
    #[error("every {severity} defect in the batch is already registered")]
    NoNewDefects { severity: Severity },
    #[error("defect '{name}' is not registered as {severity}")]
    DefectNotFound { severity: Severity, name: String },
    #[error("defect names must not be blank")]
    InvalidDefectName,
    #[error("extent {0} must lie between 0 and 100 percent")]
    InvalidExtent(f64),
    #[error("'{0}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("amount must be a positive number, got {0}")]
    InvalidAmount(String),
    #[error("periodicity must be a positive number of months within the horizon, got {0}")]
    InvalidPeriodicity(i64),
    #[error("horizon must be a positive number of years, got {0}")]
    InvalidHorizon(i64),
    #[error("indexation rate must be zero or more percent, got {0}")]
    InvalidIndexationRate(f64),
    #[error("no elements selected")]
    EmptySelection,
    #[error("task group {0} not found")]
    GroupNotFound(TaskGroupId),
    #[error("offer group {0} not found")]
    OfferNotFound(OfferGroupId),
    #[error("element {0} not found")]
    ElementNotFound(ElementId),
    #[error("inspection report {0} not found")]
    ReportNotFound(ReportId),
    #[error("defect observation {0} not found")]
    ObservationNotFound(ObservationId),
    #[error("element {0} must keep at least one inspection report")]
    LastInspection(ElementId),
}
