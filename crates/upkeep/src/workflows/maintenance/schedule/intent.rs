use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::super::domain::{CostModel, ElementId, PlanningError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Scheduling request as submitted by a form: unvalidated, dates still text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDraft {
    pub element_ids: Vec<ElementId>,
    pub name: String,
    pub date: String,
    pub cost: CostModel,
    #[serde(default)]
    pub recurrence: Option<RecurrenceDraft>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceDraft {
    pub periodicity_months: i64,
    pub horizon_years: i64,
    /// Yearly cost indexation in percent; `None` disables indexation.
    #[serde(default)]
    pub indexation_percent: Option<f64>,
}

/// New shared properties for an existing task group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEdit {
    pub element_ids: Vec<ElementId>,
    pub name: String,
    pub date: String,
    pub cost: CostModel,
}

/// A validated scheduling request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleIntent {
    pub elements: Vec<ElementId>,
    pub name: String,
    pub start: NaiveDate,
    pub cost: CostModel,
    pub cadence: Cadence,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cadence {
    OneShot,
    Periodic(Recurrence),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recurrence {
    pub periodicity_months: u32,
    pub horizon_years: u32,
    pub indexation_percent: Option<f64>,
}

impl Recurrence {
    /// Number of whole periods that fit in the horizon.
    pub fn periods(&self) -> u32 {
        horizon_months(self.horizon_years).map_or(0, |months| months / self.periodicity_months)
    }
}

impl ScheduleIntent {
    pub fn from_draft(draft: &ScheduleDraft) -> Result<Self, PlanningError> {
        let elements = distinct(&draft.element_ids);
        if elements.is_empty() {
            return Err(PlanningError::EmptySelection);
        }

        let start = parse_date(&draft.date)?;
        validate_cost(&draft.cost, &elements)?;

        let cadence = match &draft.recurrence {
            None => Cadence::OneShot,
            Some(recurrence) => Cadence::Periodic(validate_recurrence(recurrence)?),
        };

        Ok(Self {
            elements,
            name: draft.name.trim().to_string(),
            start,
            cost: draft.cost.clone(),
            cadence,
        })
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, PlanningError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| PlanningError::InvalidDate(raw.to_string()))
}

/// Selection without repeats, first occurrence wins.
pub(crate) fn distinct(ids: &[ElementId]) -> Vec<ElementId> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(id.clone());
        }
    }
    seen
}

pub(crate) fn validate_amount(amount: f64) -> Result<f64, PlanningError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(PlanningError::InvalidAmount(amount.to_string()))
    }
}

/// Every selected element must resolve to a positive amount.
pub(crate) fn validate_cost(cost: &CostModel, elements: &[ElementId]) -> Result<(), PlanningError> {
    match cost {
        CostModel::Shared { amount } => validate_amount(*amount).map(|_| ()),
        CostModel::PerElement { amounts } => {
            for element in elements {
                let amount = amounts.get(element).ok_or_else(|| {
                    PlanningError::InvalidAmount(format!("missing amount for element {element}"))
                })?;
                validate_amount(*amount)?;
            }
            Ok(())
        }
    }
}

fn horizon_months(years: u32) -> Option<u32> {
    years.checked_mul(12)
}

fn validate_recurrence(draft: &RecurrenceDraft) -> Result<Recurrence, PlanningError> {
    let periodicity_months = u32::try_from(draft.periodicity_months)
        .ok()
        .filter(|months| *months > 0)
        .ok_or(PlanningError::InvalidPeriodicity(draft.periodicity_months))?;
    let horizon_years = u32::try_from(draft.horizon_years)
        .ok()
        .filter(|years| *years > 0 && horizon_months(*years).is_some())
        .ok_or(PlanningError::InvalidHorizon(draft.horizon_years))?;

    if let Some(rate) = draft.indexation_percent {
        if !rate.is_finite() || rate < 0.0 {
            return Err(PlanningError::InvalidIndexationRate(rate));
        }
    }

    let recurrence = Recurrence {
        periodicity_months,
        horizon_years,
        indexation_percent: draft.indexation_percent,
    };
    if recurrence.periods() == 0 {
        return Err(PlanningError::InvalidPeriodicity(draft.periodicity_months));
    }
    Ok(recurrence)
}
