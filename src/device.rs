//! Device geolocation seam.
//!
//! The screen only ever asks for permission and for one current fix; how a
//! platform produces them is behind `GeolocationProvider`.

use failure::Error as FailureError;
use futures::future;
use futures::Future;

use config::{DeviceSettings, GpsAccuracy};
use errors::Error;
use models::Coordinate;

pub type DeviceFuture<T> = Box<dyn Future<Item = T, Error = FailureError>>;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Permission {
    Granted,
    Denied,
}

pub trait GeolocationProvider {
    fn request_permission(&self) -> DeviceFuture<Permission>;
    fn current_position(&self, accuracy: GpsAccuracy) -> DeviceFuture<Coordinate>;
}

/// Device with a fixed position, used by the runner.
#[derive(Clone, Debug)]
pub struct FixedGeolocation {
    permission: Permission,
    position: Option<Coordinate>,
}

impl FixedGeolocation {
    pub fn new(permission: Permission, position: Option<Coordinate>) -> Self {
        Self { permission, position }
    }
}

impl<'a> From<&'a DeviceSettings> for FixedGeolocation {
    fn from(settings: &'a DeviceSettings) -> Self {
        let permission = if settings.permission_granted {
            Permission::Granted
        } else {
            Permission::Denied
        };
        let position = match (settings.latitude, settings.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        };
        FixedGeolocation::new(permission, position)
    }
}

impl GeolocationProvider for FixedGeolocation {
    fn request_permission(&self) -> DeviceFuture<Permission> {
        Box::new(future::ok::<_, FailureError>(self.permission))
    }

    fn current_position(&self, accuracy: GpsAccuracy) -> DeviceFuture<Coordinate> {
        debug!("Fetching current position with {:?} accuracy", accuracy);
        let unavailable = match (self.permission, self.position) {
            (Permission::Granted, Some(position)) => return Box::new(future::ok::<_, FailureError>(position)),
            (Permission::Denied, _) => format_err!("Location permission denied"),
            (_, None) => format_err!("No position fix"),
        };
        Box::new(future::err::<Coordinate, _>(FailureError::from(
            unavailable.context(Error::Location),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errors::error_kind;

    #[test]
    fn fixed_device_from_settings() {
        let settings = DeviceSettings {
            permission_granted: true,
            latitude: Some(0.3),
            longitude: Some(32.6),
        };
        let device = FixedGeolocation::from(&settings);

        assert_eq!(device.request_permission().wait().unwrap(), Permission::Granted);
        assert_eq!(device.current_position(GpsAccuracy::High).wait().unwrap(), Coordinate::new(0.3, 32.6));
    }

    #[test]
    fn missing_fix_is_a_location_error() {
        let device = FixedGeolocation::new(Permission::Granted, None);
        let e = device.current_position(GpsAccuracy::Low).wait().unwrap_err();
        match error_kind(&e) {
            Some(Error::Location) => {}
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn denied_device_has_no_position() {
        let device = FixedGeolocation::new(Permission::Denied, Some(Coordinate::new(0.3, 32.6)));
        let e = device.current_position(GpsAccuracy::High).wait().unwrap_err();
        assert_eq!(e.to_string(), "Current location unavailable");
        match error_kind(&e) {
            Some(Error::Location) => {}
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
