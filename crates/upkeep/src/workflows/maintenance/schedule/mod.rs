mod expander;
mod intent;
mod offers;
mod reconciler;

pub use expander::{expand, indexed_cost, Expansion, Triad};
pub use intent::{
    parse_date, Cadence, GroupEdit, Recurrence, RecurrenceDraft, ScheduleDraft, ScheduleIntent,
    DATE_FORMAT,
};
pub use offers::{update_offer, OfferUpdate};
pub use reconciler::{add_schedule, delete_task_group, edit_task_group};
