use std::fmt;
use std::rc::Rc;

use failure::Error as FailureError;
use futures::prelude::*;
use regex::Regex;

use errors::{error_kind, Error};
use microservice::{ApiFuture, OrdersMicroservice};
use models::*;

pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to place order. Please try again.";

const STOCK_CONFLICT_PATTERN: &str = r"(?i)stock";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SubmissionOutcome {
    Placed(OrderPlaced),
    Failed { message: String, inventory_refreshed: bool },
}

impl fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SubmissionOutcome::Placed(placed) => write!(f, "Order {} placed, total {:.2}", placed.order_number, placed.total_amount),
            SubmissionOutcome::Failed { message, .. } => write!(f, "{}", message),
        }
    }
}

/// What to tell the user about a failed order.
#[derive(Clone, Debug, PartialEq)]
pub struct FailureNotice {
    pub message: String,
    pub stock_conflict: bool,
}

/// Orders service, responsible for placing orders and explaining failures
#[derive(Clone)]
pub struct OrderService {
    orders_microservice: Rc<dyn OrdersMicroservice>,
    stock_conflict: Regex,
}

impl OrderService {
    pub fn new(orders_microservice: Rc<dyn OrdersMicroservice>) -> Result<Self, FailureError> {
        Ok(Self {
            orders_microservice,
            stock_conflict: Regex::new(STOCK_CONFLICT_PATTERN)?,
        })
    }

    pub fn place(&self, draft: OrderDraft, token: &AuthToken) -> ApiFuture<OrderPlaced> {
        info!("Placing order {}", draft);
        let submission_id = draft.submission_id;
        let res = self.orders_microservice.create_order(draft, token).inspect(move |placed| {
            info!("Submission {} accepted as order {}", submission_id, placed.order_number);
        });
        Box::new(res)
    }

    /// Server message when the API sent one, a generic text otherwise.
    pub fn failure_notice(&self, e: &FailureError) -> FailureNotice {
        let message = match error_kind(e) {
            Some(Error::Api {
                message: Some(message), ..
            }) => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        };
        let stock_conflict = self.stock_conflict.is_match(&message);
        FailureNotice { message, stock_conflict }
    }
}
