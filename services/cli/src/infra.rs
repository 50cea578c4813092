use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use upkeep::config::IdStrategy;
use upkeep::workflows::maintenance::schedule::DATE_FORMAT;
use upkeep::workflows::maintenance::{
    ElementId, IdGenerator, PlanRepository, PlanState, RepositoryError, SequentialIds, UuidIds,
};

/// The whole plan as one pretty-printed JSON document on disk.
#[derive(Debug, Clone)]
pub(crate) struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, err: std::io::Error) -> RepositoryError {
        RepositoryError::Unavailable(format!("{}: {err}", self.path.display()))
    }
}

impl PlanRepository for JsonFileRepository {
    fn load(&self) -> Result<PlanState, RepositoryError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(PlanState::new()),
            Err(err) => return Err(self.unavailable(err)),
        };
        if raw.trim().is_empty() {
            return Ok(PlanState::new());
        }
        serde_json::from_str(&raw).map_err(|err| {
            RepositoryError::Malformed(format!("{}: {err}", self.path.display()))
        })
    }

    fn save(&self, state: &PlanState) -> Result<(), RepositoryError> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|err| RepositoryError::Malformed(err.to_string()))?;
        // Write next to the target and rename so a crash never leaves half a document.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(|err| self.unavailable(err))?;
        fs::rename(&staging, &self.path).map_err(|err| self.unavailable(err))
    }
}

/// Id generator for a session on `state`.
pub(crate) fn id_generator(strategy: IdStrategy, state: &PlanState) -> Box<dyn IdGenerator> {
    match strategy {
        IdStrategy::Uuid => Box::new(UuidIds),
        IdStrategy::Sequential => Box::new(SequentialIds::resume(state)),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// `ELEMENT=AMOUNT`, as used for per-element costs.
pub(crate) fn parse_element_amount(raw: &str) -> Result<(ElementId, f64), String> {
    let (element, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ELEMENT=AMOUNT, got '{raw}'"))?;
    let amount = amount
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid amount in '{raw}' ({err})"))?;
    Ok((ElementId::from(element.trim()), amount))
}
