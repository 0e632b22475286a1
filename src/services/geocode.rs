use std::rc::Rc;

use futures::future;
use futures::prelude::*;

use microservice::ReverseGeocoder;
use models::*;

pub type AddressFuture = Box<dyn Future<Item = String, Error = ()>>;

/// Best-effort address lookup. Never fails: no results, an empty result or a
/// geocoder error all produce the `Lat: .., Lng: ..` label.
#[derive(Clone)]
pub struct ReverseGeocodeAdapter {
    geocoder: Rc<dyn ReverseGeocoder>,
}

impl ReverseGeocodeAdapter {
    pub fn new(geocoder: Rc<dyn ReverseGeocoder>) -> Self {
        Self { geocoder }
    }

    pub fn resolve(&self, coordinate: Coordinate) -> AddressFuture {
        if !coordinate.is_valid() {
            warn!("Not geocoding invalid coordinate {}", coordinate);
            return Box::new(future::ok::<_, ()>(coordinate_label(&coordinate)));
        }

        debug!("Reverse geocoding {}", coordinate);
        let res = self.geocoder.reverse_geocode(coordinate).then(move |res| {
            let address = match res {
                Ok(results) => results.first().and_then(AddressComponents::display),
                Err(e) => {
                    warn!("Reverse geocoding {} failed: {}", coordinate, e);
                    None
                }
            };
            Ok::<_, ()>(address.unwrap_or_else(|| coordinate_label(&coordinate)))
        });

        Box::new(res)
    }
}

#[cfg(test)]
mod tests {
    use failure::Error as FailureError;

    use super::*;
    use microservice::ApiFuture;

    enum Canned {
        Results(Vec<AddressComponents>),
        Fails,
    }

    struct CannedGeocoder(Canned);

    impl ReverseGeocoder for CannedGeocoder {
        fn reverse_geocode(&self, _coordinate: Coordinate) -> ApiFuture<Vec<AddressComponents>> {
            match self.0 {
                Canned::Results(ref results) => Box::new(future::ok::<_, FailureError>(results.clone())),
                Canned::Fails => Box::new(future::err::<Vec<AddressComponents>, _>(format_err!("geocoder down"))),
            }
        }
    }

    fn adapter(canned: Canned) -> ReverseGeocodeAdapter {
        ReverseGeocodeAdapter::new(Rc::new(CannedGeocoder(canned)))
    }

    #[test]
    fn uses_first_result() {
        let results = vec![
            AddressComponents {
                name: Some("Kampala Serena".to_string()),
                city: Some("Kampala".to_string()),
                country: Some("Uganda".to_string()),
                ..Default::default()
            },
            AddressComponents {
                city: Some("Elsewhere".to_string()),
                ..Default::default()
            },
        ];
        let address = adapter(Canned::Results(results)).resolve(Coordinate::new(0.31, 32.58)).wait().unwrap();
        assert_eq!(address, "Kampala Serena, Kampala, Uganda");
    }

    #[test]
    fn no_results_falls_back_to_label() {
        let address = adapter(Canned::Results(vec![])).resolve(Coordinate::new(0.35, 32.58)).wait().unwrap();
        assert_eq!(address, "Lat: 0.3500, Lng: 32.5800");
    }

    #[test]
    fn blank_result_falls_back_to_label() {
        let address = adapter(Canned::Results(vec![AddressComponents::default()]))
            .resolve(Coordinate::new(1.0, 2.0))
            .wait()
            .unwrap();
        assert_eq!(address, "Lat: 1.0000, Lng: 2.0000");
    }

    #[test]
    fn failure_falls_back_to_label() {
        let address = adapter(Canned::Fails).resolve(Coordinate::new(-0.1, 30.25)).wait().unwrap();
        assert_eq!(address, "Lat: -0.1000, Lng: 30.2500");
    }
}
