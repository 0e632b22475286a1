use failure::Error as FailureError;
use futures::Future;
use hyper::Method;

use super::{bearer, ApiFuture};

use config::{self, Service};
use http::HttpClient;
use models::*;

pub trait OrdersMicroservice {
    fn create_order(&self, draft: OrderDraft, token: &AuthToken) -> ApiFuture<OrderPlaced>;
}

pub struct OrdersMicroserviceImpl {
    http_client: Box<dyn HttpClient>,
    config: config::Config,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
    pub cylinder_id: CylinderId,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub client_reference: SubmissionId,
    pub customer_id: CustomerId,
    pub items: Vec<OrderItemPayload>,
    pub delivery_address: String,
    pub delivery_latitude: f64,
    pub delivery_longitude: f64,
    pub special_instructions: Option<String>,
}

impl From<OrderDraft> for CreateOrderPayload {
    fn from(draft: OrderDraft) -> Self {
        Self {
            client_reference: draft.submission_id,
            customer_id: draft.customer_id,
            items: draft
                .lines
                .into_iter()
                .map(|line| OrderItemPayload {
                    cylinder_id: line.cylinder_id,
                    quantity: line.quantity,
                })
                .collect(),
            delivery_address: draft.delivery_address,
            delivery_latitude: draft.delivery_coordinate.latitude,
            delivery_longitude: draft.delivery_coordinate.longitude,
            special_instructions: draft.special_instructions,
        }
    }
}

impl OrdersMicroserviceImpl {
    pub fn new(http_client: Box<dyn HttpClient>, config: config::Config) -> Self {
        Self { http_client, config }
    }

    fn orders_url(&self) -> String {
        self.config.service_url(Service::Orders)
    }
}

impl OrdersMicroservice for OrdersMicroserviceImpl {
    fn create_order(&self, draft: OrderDraft, token: &AuthToken) -> ApiFuture<OrderPlaced> {
        debug!("Creating order, input: {}", draft);
        let url = format!("{}/orders", self.orders_url());

        Box::new(
            super::request::<_, CreateOrderPayload, OrderPlaced>(
                self.http_client.cloned(),
                Method::Post,
                url,
                Some(draft.into()),
                Some(bearer(token)),
            ).map_err(|e| FailureError::from(e.context("Creating order in orders microservice failed."))),
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use futures::Future;
    use hyper::header::{Authorization, Bearer};
    use serde_json;

    use super::*;
    use config::tests::test_config;
    use errors::{error_kind, Error};
    use microservice::tests::CannedHttpClient;

    fn draft() -> OrderDraft {
        OrderDraft {
            submission_id: SubmissionId::new(),
            customer_id: CustomerId(42),
            lines: vec![CartLine {
                cylinder_id: CylinderId(6),
                name: "6kg cylinder".to_string(),
                unit_price: 55_000.0,
                stock_quantity: 3,
                quantity: 2,
            }],
            delivery_address: "Plot 12, Ntinda".to_string(),
            delivery_coordinate: Coordinate::new(0.35, 32.61),
            special_instructions: Some("Call on arrival".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn posts_draft_with_bearer_token() {
        let client = CannedHttpClient::new(200, r#"{"orderNumber": "ORD-0001", "totalAmount": 110000.0}"#);
        let orders = OrdersMicroserviceImpl::new(Box::new(client.clone()), test_config());

        let placed = orders
            .create_order(draft(), &AuthToken::from("token-1".to_string()))
            .wait()
            .unwrap();
        assert_eq!(placed.order_number, "ORD-0001");
        assert_eq!(placed.total_amount, 110_000.0);

        let request = client.last_request();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "http://orders.local/orders");
        let auth = request.headers.unwrap().get::<Authorization<Bearer>>().cloned().unwrap();
        assert_eq!(auth.0.token, "token-1");

        let body: serde_json::Value = serde_json::from_str(&request.body.unwrap()).unwrap();
        assert_eq!(body["customerId"], 42);
        assert_eq!(body["items"][0]["cylinderId"], 6);
        assert_eq!(body["items"][0]["quantity"], 2);
        assert_eq!(body["deliveryLatitude"], 0.35);
        assert_eq!(body["specialInstructions"], "Call on arrival");
    }

    #[test]
    fn api_failure_keeps_its_kind() {
        let client = CannedHttpClient::new(409, r#"{"message": "Insufficient stock"}"#);
        let orders = OrdersMicroserviceImpl::new(Box::new(client), test_config());

        let e = orders
            .create_order(draft(), &AuthToken::from("token-1".to_string()))
            .wait()
            .unwrap_err();
        match error_kind(&e) {
            Some(Error::Api { status: 409, message }) => assert_eq!(message.as_ref().unwrap(), "Insufficient stock"),
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
