use std::collections::BTreeMap;
use std::io::Write;

use chrono::Datelike;
use serde::Serialize;

use super::super::domain::round_cents;
use super::super::state::PlanState;
use super::views::{GroupLine, YearBudget};

/// Task groups bucketed by the calendar year of their planned date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetProjection {
    pub years: Vec<YearBudget>,
    pub total: f64,
}

impl BudgetProjection {
    pub fn from_state(state: &PlanState) -> Self {
        let mut by_year: BTreeMap<i32, Vec<GroupLine>> = BTreeMap::new();
        for group in state.task_groups.values() {
            by_year
                .entry(group.planned_on.year())
                .or_default()
                .push(GroupLine::from_group(group));
        }

        let years: Vec<YearBudget> = by_year
            .into_iter()
            .map(|(year, mut groups)| {
                groups.sort_by(|a, b| {
                    a.planned_on
                        .cmp(&b.planned_on)
                        .then_with(|| a.name.cmp(&b.name))
                });
                let total = round_cents(groups.iter().map(|line| line.cost).sum());
                YearBudget {
                    year,
                    groups,
                    total,
                }
            })
            .collect();

        let total = round_cents(years.iter().map(|year| year.total).sum());
        Self { years, total }
    }

    pub fn year(&self, year: i32) -> Option<&YearBudget> {
        self.years.iter().find(|entry| entry.year == year)
    }
}

#[derive(Debug, Serialize)]
struct BudgetRow {
    year: i32,
    groups: usize,
    total: String,
}

/// One `year,groups,total` row per year, totals with two decimals.
pub fn write_budget_csv<W: Write>(writer: W, projection: &BudgetProjection) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for year in &projection.years {
        csv_writer.serialize(BudgetRow {
            year: year.year,
            groups: year.groups.len(),
            total: format!("{:.2}", year.total),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
