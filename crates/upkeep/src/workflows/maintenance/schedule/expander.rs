use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use tracing::info;

use super::super::domain::{
    round_cents, CostModel, Element, ElementId, OfferGroup, PlanningError, RecurrenceOrigin,
    Task, TaskGroup,
};
use super::super::ids::IdGenerator;
use super::intent::{Cadence, Recurrence, ScheduleIntent};

/// One task group, its offer group and the task attached to the element, cross-referenced.
#[derive(Debug, Clone, PartialEq)]
pub struct Triad {
    pub group: TaskGroup,
    pub offer: OfferGroup,
    pub element: ElementId,
    pub task: Task,
}

/// Records produced from one scheduling intent, ordered by period then element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub triads: Vec<Triad>,
}

impl Expansion {
    pub fn len(&self) -> usize {
        self.triads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triads.is_empty()
    }
}

/// Expand an intent into dated, costed task group triads. A periodic intent yields one
/// independent triad per period and element.
pub fn expand(
    intent: &ScheduleIntent,
    elements: &BTreeMap<ElementId, Element>,
    today: NaiveDate,
    ids: &dyn IdGenerator,
) -> Result<Expansion, PlanningError> {
    if let Some(missing) = intent.elements.iter().find(|id| !elements.contains_key(*id)) {
        return Err(PlanningError::ElementNotFound(missing.clone()));
    }

    let mut expansion = Expansion::default();
    match intent.cadence {
        Cadence::OneShot => {
            for element in &intent.elements {
                let amount = element_amount(&intent.cost, element)?;
                expansion.triads.push(synthesize(
                    element,
                    &intent.name,
                    intent.start,
                    amount,
                    None,
                    today,
                    ids,
                ));
            }
        }
        Cadence::Periodic(recurrence) => {
            for index in 0..recurrence.periods() {
                let offset = index * recurrence.periodicity_months;
                let date = intent
                    .start
                    .checked_add_months(Months::new(offset))
                    .ok_or_else(|| PlanningError::InvalidDate(intent.start.to_string()))?;
                let origin = RecurrenceOrigin {
                    period_index: index,
                    periodicity_months: recurrence.periodicity_months,
                    horizon_years: recurrence.horizon_years,
                    indexation_percent: recurrence.indexation_percent,
                };

                for element in &intent.elements {
                    let amount = indexed_cost(
                        element_amount(&intent.cost, element)?,
                        &recurrence,
                        offset / 12,
                    );
                    expansion.triads.push(synthesize(
                        element,
                        &intent.name,
                        date,
                        amount,
                        Some(origin.clone()),
                        today,
                        ids,
                    ));
                }
            }
        }
    }

    info!(
        name = intent.name.as_str(),
        elements = intent.elements.len(),
        groups = expansion.len(),
        "schedule expanded"
    );
    Ok(expansion)
}

fn element_amount(cost: &CostModel, element: &ElementId) -> Result<f64, PlanningError> {
    cost.amount_for(element).ok_or_else(|| {
        PlanningError::InvalidAmount(format!("missing amount for element {element}"))
    })
}

/// Cost after compounding yearly indexation over `years_elapsed` whole years.
pub fn indexed_cost(cost: f64, recurrence: &Recurrence, years_elapsed: u32) -> f64 {
    match recurrence.indexation_percent {
        Some(rate) => {
            let factor = (1.0 + rate / 100.0).powi(years_elapsed as i32);
            round_cents(cost * factor)
        }
        None => round_cents(cost),
    }
}

pub(crate) fn synthesize(
    element: &ElementId,
    name: &str,
    date: NaiveDate,
    amount: f64,
    recurrence: Option<RecurrenceOrigin>,
    today: NaiveDate,
    ids: &dyn IdGenerator,
) -> Triad {
    let group_id = ids.task_group_id();
    let offer_id = ids.offer_group_id();

    let group = TaskGroup {
        id: group_id.clone(),
        name: name.to_string(),
        planned_on: date,
        cost: CostModel::Shared { amount },
        subtasks: vec![element.clone()],
        recurrence,
        created_on: today,
    };
    let offer = OfferGroup {
        id: offer_id.clone(),
        task_group_id: group_id.clone(),
        element_id: element.clone(),
        name: name.to_string(),
        estimated_value: amount,
        offer_price: None,
        invoice_price: None,
        accepted: false,
        work_date: date,
    };
    let task = Task {
        id: ids.task_id(),
        name: name.to_string(),
        cost: amount,
        planned_on: date,
        group_id: Some(group_id),
        offer_group_id: Some(offer_id),
        attachments: Vec::new(),
    };

    Triad {
        group,
        offer,
        element: element.clone(),
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recurrence(rate: Option<f64>) -> Recurrence {
        Recurrence {
            periodicity_months: 12,
            horizon_years: 5,
            indexation_percent: rate,
        }
    }

    #[test]
    fn indexation_compounds_per_whole_year() {
        assert_eq!(indexed_cost(1000.0, &recurrence(Some(10.0)), 0), 1000.0);
        assert_eq!(indexed_cost(1000.0, &recurrence(Some(10.0)), 1), 1100.0);
        assert_eq!(indexed_cost(1000.0, &recurrence(Some(10.0)), 2), 1210.0);
        assert_eq!(indexed_cost(1000.0, &recurrence(Some(2.5)), 3), 1076.89);
    }

    #[test]
    fn without_indexation_cost_stays_flat() {
        assert_eq!(indexed_cost(999.999, &recurrence(None), 4), 1000.0);
    }
}
