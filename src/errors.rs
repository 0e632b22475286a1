use failure::{Context, Error as FailureError, Fail};
use validator::ValidationErrors;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Parse error")]
    Parse,
    #[fail(display = "Validation error")]
    Validate(ValidationErrors),
    #[fail(display = "Http client error")]
    HttpClient,
    #[fail(display = "Api responded with status {}", status)]
    Api { status: u16, message: Option<String> },
    #[fail(display = "Please provide valid coordinates: latitude -90 to 90, longitude -180 to 180")]
    InvalidCoordinates,
    #[fail(display = "Only {} of {} in stock", available, name)]
    InsufficientStock { name: String, available: u32 },
    #[fail(display = "Cylinder is not in the cart or inventory")]
    UnknownCylinder,
    #[fail(display = "An order is already being placed")]
    SubmissionInFlight,
    #[fail(display = "Current location unavailable")]
    Location,
    #[fail(display = "Reverse geocoding failed")]
    Geocode,
}

/// Finds the first `Error` kind in the cause chain, whether it was raised
/// directly or attached with `.context(...)`.
pub fn error_kind(e: &FailureError) -> Option<&Error> {
    e.iter_chain()
        .filter_map(|cause| {
            if let Some(ctx) = cause.downcast_ref::<Context<Error>>() {
                Some(ctx.get_context())
            } else {
                cause.downcast_ref::<Error>()
            }
        })
        .nth(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_kind_raised_directly() {
        let e: FailureError = Error::SubmissionInFlight.into();
        match error_kind(&e) {
            Some(Error::SubmissionInFlight) => {}
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn finds_kind_attached_as_context() {
        let e: FailureError = format_err!("Creating order failed.")
            .context(Error::Api {
                status: 409,
                message: Some("Out of stock".to_string()),
            })
            .into();
        match error_kind(&e) {
            Some(Error::Api { status, message }) => {
                assert_eq!(*status, 409);
                assert_eq!(message.as_ref().map(String::as_str), Some("Out of stock"));
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn kinds_shown_to_the_user_read_as_notices() {
        let stock = Error::InsufficientStock {
            name: "12kg cylinder".to_string(),
            available: 3,
        };
        assert_eq!(stock.to_string(), "Only 3 of 12kg cylinder in stock");
        assert_eq!(
            Error::InvalidCoordinates.to_string(),
            "Please provide valid coordinates: latitude -90 to 90, longitude -180 to 180"
        );
        assert_eq!(Error::Location.to_string(), "Current location unavailable");
    }

    #[test]
    fn plain_errors_have_no_kind() {
        let e = format_err!("boom");
        assert!(error_kind(&e).is_none());
    }
}
