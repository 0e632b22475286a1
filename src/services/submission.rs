use std::fmt;

use chrono::Utc;
use validator::{ValidationError, ValidationErrors};

use errors::Error;
use models::*;
use services::location::LocationReconciler;

/// Free-text part of the order form
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OrderForm {
    pub delivery_address: String,
    pub special_instructions: String,
}

/// Reason an order cannot be placed right now
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Blocker {
    EmptyCart,
    BlankAddress,
    InvalidCoordinates,
    SubmissionInFlight,
}

impl Blocker {
    fn field(&self) -> &'static str {
        match *self {
            Blocker::EmptyCart => "cart",
            Blocker::BlankAddress => "delivery_address",
            Blocker::InvalidCoordinates => "delivery_coordinates",
            Blocker::SubmissionInFlight => "submission",
        }
    }

    fn code(&self) -> &'static str {
        match *self {
            Blocker::EmptyCart => "empty",
            Blocker::BlankAddress => "required",
            Blocker::InvalidCoordinates => "range",
            Blocker::SubmissionInFlight => "in_flight",
        }
    }
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            Blocker::EmptyCart => "Please add at least one cylinder to your order",
            Blocker::BlankAddress => "Please enter a delivery address",
            Blocker::InvalidCoordinates => "Please provide valid coordinates: latitude -90 to 90, longitude -180 to 180",
            Blocker::SubmissionInFlight => "Your order is already being placed",
        };
        write!(f, "{}", s)
    }
}

/// Decides whether the form may be submitted and keeps at most one
/// submission outstanding.
#[derive(Clone, Debug, Default)]
pub struct OrderSubmissionGate {
    in_flight: Option<SubmissionId>,
}

impl OrderSubmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn blockers(&self, cart: &Cart, form: &OrderForm, location: &LocationReconciler) -> Vec<Blocker> {
        let mut blockers = vec![];
        if cart.is_empty() {
            blockers.push(Blocker::EmptyCart);
        }
        if form.delivery_address.trim().is_empty() {
            blockers.push(Blocker::BlankAddress);
        }
        if location.manual_coordinate().is_none() {
            blockers.push(Blocker::InvalidCoordinates);
        }
        if self.is_submitting() {
            blockers.push(Blocker::SubmissionInFlight);
        }
        blockers
    }

    pub fn can_submit(&self, cart: &Cart, form: &OrderForm, location: &LocationReconciler) -> bool {
        self.blockers(cart, form, location).is_empty()
    }

    /// Checks the form and, if it passes, marks a submission as in flight and
    /// returns the draft to send. The delivery coordinate is the parsed manual
    /// entry, not the marker.
    pub fn begin(&mut self, customer: &Customer, cart: &Cart, form: &OrderForm, location: &LocationReconciler) -> Result<OrderDraft, Error> {
        if self.is_submitting() {
            return Err(Error::SubmissionInFlight);
        }

        let blockers = self.blockers(cart, form, location);
        if !blockers.is_empty() {
            return Err(Error::Validate(validation_errors(&blockers)));
        }

        let delivery_coordinate = location.manual_coordinate().ok_or(Error::InvalidCoordinates)?;
        let instructions = form.special_instructions.trim();
        let draft = OrderDraft {
            submission_id: SubmissionId::new(),
            customer_id: customer.id,
            lines: cart.lines().to_vec(),
            delivery_address: form.delivery_address.trim().to_string(),
            delivery_coordinate,
            special_instructions: if instructions.is_empty() {
                None
            } else {
                Some(instructions.to_string())
            },
            created_at: Utc::now(),
        };

        self.in_flight = Some(draft.submission_id);
        Ok(draft)
    }

    /// Releases the guard held by `submission_id`; stale ids are ignored.
    pub fn finish(&mut self, submission_id: SubmissionId) -> bool {
        if self.in_flight == Some(submission_id) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }
}

pub fn validation_errors(blockers: &[Blocker]) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for blocker in blockers {
        errors.add(blocker.field(), ValidationError::new(blocker.code()));
    }
    errors
}
