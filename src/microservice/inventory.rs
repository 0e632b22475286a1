use failure::Error as FailureError;
use futures::Future;
use hyper::Method;

use super::{bearer, ApiFuture};

use config::{self, Service};
use http::HttpClient;
use models::*;

pub trait InventoryMicroservice {
    /// Raw listing; filtering to orderable cylinders happens in the service layer.
    fn list_available_products(&self, token: &AuthToken) -> ApiFuture<Vec<Cylinder>>;
}

pub struct InventoryMicroserviceImpl {
    http_client: Box<dyn HttpClient>,
    config: config::Config,
}

impl InventoryMicroserviceImpl {
    pub fn new(http_client: Box<dyn HttpClient>, config: config::Config) -> Self {
        Self { http_client, config }
    }

    fn inventory_url(&self) -> String {
        self.config.service_url(Service::Inventory)
    }
}

impl InventoryMicroservice for InventoryMicroserviceImpl {
    fn list_available_products(&self, token: &AuthToken) -> ApiFuture<Vec<Cylinder>> {
        let url = format!("{}/cylinders/available", self.inventory_url());

        Box::new(
            super::request::<_, (), Vec<Cylinder>>(self.http_client.cloned(), Method::Get, url, None, Some(bearer(token)))
                .map_err(|e| FailureError::from(e.context("Listing cylinders in inventory microservice failed."))),
        )
    }
}

#[cfg(test)]
mod tests {
    use futures::Future;

    use super::*;
    use config::tests::test_config;
    use microservice::tests::CannedHttpClient;

    #[test]
    fn lists_cylinders_from_camel_case_json() {
        let client = CannedHttpClient::new(
            200,
            r#"[
                {"id": 1, "name": "6kg", "price": 55000, "stockQuantity": 4, "isAvailable": true, "brand": "Total"},
                {"id": 2, "name": "12kg", "size": "12kg", "price": 98000.5, "stockQuantity": 0, "isAvailable": true}
            ]"#,
        );
        let inventory = InventoryMicroserviceImpl::new(Box::new(client.clone()), test_config());

        let cylinders = inventory
            .list_available_products(&AuthToken::from("t".to_string()))
            .wait()
            .unwrap();

        assert_eq!(cylinders.len(), 2);
        assert_eq!(cylinders[0].id, CylinderId(1));
        assert_eq!(cylinders[0].stock_quantity, 4);
        assert_eq!(cylinders[1].size.as_ref().unwrap(), "12kg");
        assert_eq!(client.last_request().url, "http://inventory.local/cylinders/available");
        assert_eq!(client.last_request().method, Method::Get);
    }
}
