//! Import of defect surveys exported as CSV (`element_id,category,defect`).

mod mapping;
mod normalizer;
mod parser;

use crate::workflows::maintenance::defects::add_defects_in;
use crate::workflows::maintenance::{ElementId, IdGenerator, PlanState, PlanningError, Severity};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug)]
pub enum SurveyImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Planning(PlanningError),
}

impl std::fmt::Display for SurveyImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurveyImportError::Io(err) => write!(f, "failed to read survey export: {}", err),
            SurveyImportError::Csv(err) => write!(f, "invalid survey CSV data: {}", err),
            SurveyImportError::Planning(err) => {
                write!(f, "could not apply survey to the plan: {}", err)
            }
        }
    }
}

impl std::error::Error for SurveyImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SurveyImportError::Io(err) => Some(err),
            SurveyImportError::Csv(err) => Some(err),
            SurveyImportError::Planning(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SurveyImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SurveyImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<PlanningError> for SurveyImportError {
    fn from(err: PlanningError) -> Self {
        Self::Planning(err)
    }
}

/// Result of applying a survey to a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyImport {
    pub state: PlanState,
    /// Element/category batches that registered at least one new defect.
    pub applied: usize,
    /// Batches that were entirely known already.
    pub skipped: usize,
}

pub struct SurveyImporter;

impl SurveyImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        state: &PlanState,
        ids: &dyn IdGenerator,
    ) -> Result<SurveyImport, SurveyImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, state, ids)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        state: &PlanState,
        ids: &dyn IdGenerator,
    ) -> Result<SurveyImport, SurveyImportError> {
        let mut batches: Vec<(ElementId, Severity, Vec<String>)> = Vec::new();
        for record in parser::parse_records(reader)? {
            let severity = mapping::severity_for(&record.category)?;
            match batches
                .iter_mut()
                .find(|(element, batch_severity, _)| {
                    element == &record.element_id && *batch_severity == severity
                }) {
                Some((_, _, names)) => names.push(record.defect),
                None => batches.push((record.element_id, severity, vec![record.defect])),
            }
        }

        let mut next = state.clone();
        let mut applied = 0;
        let mut skipped = 0;
        for (element_id, severity, names) in &batches {
            match add_defects_in(&next, element_id, *severity, names, ids) {
                Ok(updated) => {
                    next = updated;
                    applied += 1;
                }
                Err(PlanningError::NoNewDefects { .. }) => {
                    debug!(element = %element_id, %severity, "survey batch already registered");
                    skipped += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }

        info!(applied, skipped, "survey imported");
        Ok(SurveyImport {
            state: next,
            applied,
            skipped,
        })
    }
}
