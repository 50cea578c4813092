use super::state::PlanState;

/// Storage abstraction for the whole plan document. The planner never chooses the format.
pub trait PlanRepository {
    fn load(&self) -> Result<PlanState, RepositoryError>;
    fn save(&self, state: &PlanState) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("plan document unavailable: {0}")]
    Unavailable(String),
    #[error("plan document is malformed: {0}")]
    Malformed(String),
}
