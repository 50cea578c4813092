use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use super::domain::{ElementId, ObservationId, OfferGroupId, ReportId, TaskGroupId, TaskId};
use super::state::PlanState;

/// Kind of record an identifier is minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Element,
    Report,
    Observation,
    TaskGroup,
    OfferGroup,
    Task,
}

impl IdKind {
    pub const fn prefix(self) -> &'static str {
        match self {
            IdKind::Element => "el",
            IdKind::Report => "ir",
            IdKind::Observation => "ob",
            IdKind::TaskGroup => "tg",
            IdKind::OfferGroup => "og",
            IdKind::Task => "tk",
        }
    }
}

/// Source of globally unique identifiers for new records.
pub trait IdGenerator {
    fn next(&self, kind: IdKind) -> String;

    fn element_id(&self) -> ElementId {
        ElementId(self.next(IdKind::Element))
    }

    fn report_id(&self) -> ReportId {
        ReportId(self.next(IdKind::Report))
    }

    fn observation_id(&self) -> ObservationId {
        ObservationId(self.next(IdKind::Observation))
    }

    fn task_group_id(&self) -> TaskGroupId {
        TaskGroupId(self.next(IdKind::TaskGroup))
    }

    fn offer_group_id(&self) -> OfferGroupId {
        OfferGroupId(self.next(IdKind::OfferGroup))
    }

    fn task_id(&self) -> TaskId {
        TaskId(self.next(IdKind::Task))
    }
}

/// Random v4 identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next(&self, _kind: IdKind) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Predictable identifiers such as `tg-000003`, shared counter across kinds.
#[derive(Debug, Default)]
pub struct SequentialIds {
    sequence: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue after the highest sequence number already used in `state`, so ids minted
    /// against a saved document never collide with the ones it holds.
    pub fn resume(state: &PlanState) -> Self {
        let mut highest = 0;
        let mut note = |id: &str| {
            if let Some(sequence) = sequence_of(id) {
                highest = highest.max(sequence);
            }
        };

        for element in state.elements.values() {
            note(&element.id.0);
            for report in &element.inspections {
                note(&report.id.0);
                for observation in &report.observations {
                    note(&observation.id.0);
                }
            }
            for task in &element.tasks {
                note(&task.id.0);
            }
        }
        for group in state.task_groups.keys() {
            note(&group.0);
        }
        for offer in state.offer_groups.keys() {
            note(&offer.0);
        }

        Self {
            sequence: AtomicU64::new(highest),
        }
    }
}

fn sequence_of(id: &str) -> Option<u64> {
    let (prefix, digits) = id.split_once('-')?;
    if prefix.len() != 2 || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl IdGenerator for SequentialIds {
    fn next(&self, kind: IdKind) -> String {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{id:06}", kind.prefix())
    }
}
