use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::super::domain::{OfferGroupId, PlanningError};
use super::super::state::PlanState;
use super::intent::validate_amount;

/// Quotation and invoicing details for one offer group. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferUpdate {
    #[serde(default)]
    pub offer_price: Option<f64>,
    #[serde(default)]
    pub invoice_price: Option<f64>,
    #[serde(default)]
    pub accepted: Option<bool>,
    #[serde(default)]
    pub work_date: Option<NaiveDate>,
}

pub fn update_offer(
    state: &PlanState,
    offer_id: &OfferGroupId,
    update: &OfferUpdate,
) -> Result<PlanState, PlanningError> {
    if !state.offer_groups.contains_key(offer_id) {
        return Err(PlanningError::OfferNotFound(offer_id.clone()));
    }
    let offer_price = update.offer_price.map(validate_amount).transpose()?;
    let invoice_price = update.invoice_price.map(validate_amount).transpose()?;

    let mut next = state.clone();
    if let Some(offer) = next.offer_groups.get_mut(offer_id) {
        if offer_price.is_some() {
            offer.offer_price = offer_price;
        }
        if invoice_price.is_some() {
            offer.invoice_price = invoice_price;
        }
        if let Some(accepted) = update.accepted {
            offer.accepted = accepted;
        }
        if let Some(date) = update.work_date {
            offer.work_date = date;
        }
        debug!(offer = %offer.id, accepted = offer.accepted, "offer group updated");
    }
    Ok(next)
}
