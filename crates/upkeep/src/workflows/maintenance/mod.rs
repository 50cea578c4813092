//! Property maintenance planning core: condition scoring, defect registries and the
//! task group / offer group schedule.

pub mod command;
pub mod condition;
pub mod defects;
pub mod domain;
pub mod ids;
pub mod report;
pub mod repository;
pub mod schedule;
mod state;

#[cfg(test)]
mod tests;

pub use command::{apply, PlanCommand};
pub use domain::{
    CostModel, DefectObservation, DefectRegistry, Element, ElementId, InspectionReport,
    Intensity, MediaRef, ObservationId, OfferGroup, OfferGroupId, PlanningError,
    RecurrenceOrigin, ReportId, Severity, Task, TaskGroup, TaskGroupId, TaskId,
};
pub use ids::{IdGenerator, IdKind, SequentialIds, UuidIds};
pub use repository::{PlanRepository, RepositoryError};
pub use state::{ConsistencyIssue, PlanState};
