use super::normalizer::normalize_category;
use crate::workflows::maintenance::{PlanningError, Severity};
use std::collections::HashMap;
use std::sync::OnceLock;

static CATEGORY_MAP: OnceLock<HashMap<&'static str, Severity>> = OnceLock::new();

/// Resolve a survey category label, English or NEN 2767 Dutch.
pub(crate) fn severity_for(raw: &str) -> Result<Severity, PlanningError> {
    category_map()
        .get(normalize_category(raw).as_str())
        .copied()
        .ok_or_else(|| PlanningError::UnknownCategory(raw.trim().to_string()))
}

fn category_map() -> &'static HashMap<&'static str, Severity> {
    CATEGORY_MAP.get_or_init(|| {
        const LABELS: &[(&str, Severity)] = &[
            ("severe", Severity::Severe),
            ("ernstig", Severity::Severe),
            ("ernstige", Severity::Severe),
            ("ernstige gebreken", Severity::Severe),
            ("serious", Severity::Serious),
            ("serieus", Severity::Serious),
            ("serieuze", Severity::Serious),
            ("serieuze gebreken", Severity::Serious),
            ("minor", Severity::Minor),
            ("gering", Severity::Minor),
            ("geringe", Severity::Minor),
            ("geringe gebreken", Severity::Minor),
        ];
        LABELS.iter().copied().collect()
    })
}
