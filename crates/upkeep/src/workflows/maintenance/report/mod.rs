mod budget;
pub mod views;

pub use budget::{write_budget_csv, BudgetProjection};
pub use views::{condition_overview, ConditionLine, GroupLine, YearBudget};
