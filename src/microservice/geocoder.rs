use failure::Error as FailureError;
use futures::Future;
use hyper::Method;

use super::ApiFuture;

use config::{self, Service};
use errors::Error;
use http::HttpClient;
use models::*;

pub trait ReverseGeocoder {
    fn reverse_geocode(&self, coordinate: Coordinate) -> ApiFuture<Vec<AddressComponents>>;
}

pub struct GeocoderMicroserviceImpl {
    http_client: Box<dyn HttpClient>,
    config: config::Config,
}

impl GeocoderMicroserviceImpl {
    pub fn new(http_client: Box<dyn HttpClient>, config: config::Config) -> Self {
        Self { http_client, config }
    }

    fn geocoder_url(&self) -> String {
        self.config.service_url(Service::Geocoder)
    }
}

impl ReverseGeocoder for GeocoderMicroserviceImpl {
    fn reverse_geocode(&self, coordinate: Coordinate) -> ApiFuture<Vec<AddressComponents>> {
        let url = format!(
            "{}/reverse?latitude={}&longitude={}",
            self.geocoder_url(),
            coordinate.latitude,
            coordinate.longitude
        );

        Box::new(
            super::request::<_, (), Option<Vec<AddressComponents>>>(self.http_client.cloned(), Method::Get, url, None, None)
                .map(|results| results.unwrap_or_default())
                .map_err(|e| FailureError::from(e.context(Error::Geocode))),
        )
    }
}
