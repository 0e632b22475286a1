//! Delivery coordinate reconciliation.
//!
//! Two slices of state are kept apart on purpose: the marker
//! (`selected_location` + `map_region`) and the pair of manual text fields.
//! They only converge on a GPS fix, a map tap or an explicit confirm. Once the
//! user has typed into the fields, a late GPS fix moves the marker but never
//! overwrites the text.

use failure::Error as FailureError;

use device::Permission;
use errors::Error;
use models::{Coordinate, MapRegion};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum PermissionState {
    NoPermission,
    PermissionRequested,
    PermissionGranted,
    PermissionDenied,
}

/// What a resolved GPS fix changed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FixOutcome {
    /// Marker moved; `fields_seeded` tells whether the text fields were empty
    /// and took the fix too.
    Applied { fields_seeded: bool },
    /// Fix failed or was out of range; nothing changed.
    Ignored,
}

#[derive(Clone, Debug)]
pub struct LocationReconciler {
    fallback: Coordinate,
    selected_location: Coordinate,
    map_region: MapRegion,
    latitude_text: String,
    longitude_text: String,
    permission: PermissionState,
}

impl LocationReconciler {
    /// Seeds marker and text fields from `seed` when it is valid, otherwise
    /// starts at `fallback` with empty fields.
    pub fn new(seed: Option<Coordinate>, fallback: Coordinate) -> Self {
        let (selected_location, latitude_text, longitude_text) = match seed.filter(Coordinate::is_valid) {
            Some(seed) => {
                let (latitude, longitude) = seed.to_text();
                (seed, latitude, longitude)
            }
            None => (fallback, String::new(), String::new()),
        };

        Self {
            fallback,
            selected_location,
            map_region: MapRegion::around(selected_location),
            latitude_text,
            longitude_text,
            permission: PermissionState::NoPermission,
        }
    }

    /// Overrides the zoom spans used for every later region update.
    pub fn with_spans(mut self, latitude_delta: f64, longitude_delta: f64) -> Self {
        self.map_region = MapRegion {
            center: self.selected_location,
            latitude_delta,
            longitude_delta,
        };
        self
    }

    pub fn selected_location(&self) -> Coordinate {
        self.selected_location
    }

    pub fn map_region(&self) -> MapRegion {
        self.map_region
    }

    pub fn latitude_text(&self) -> &str {
        &self.latitude_text
    }

    pub fn longitude_text(&self) -> &str {
        &self.longitude_text
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn fields_empty(&self) -> bool {
        self.latitude_text.trim().is_empty() && self.longitude_text.trim().is_empty()
    }

    /// Coordinate typed into the manual fields, if it passes validation.
    pub fn manual_coordinate(&self) -> Option<Coordinate> {
        Coordinate::parse(&self.latitude_text, &self.longitude_text)
    }

    pub fn set_latitude_text(&mut self, text: &str) {
        self.latitude_text = text.to_string();
    }

    pub fn set_longitude_text(&mut self, text: &str) {
        self.longitude_text = text.to_string();
    }

    /// Returns true when a permission request should actually be sent.
    pub fn begin_permission_request(&mut self) -> bool {
        match self.permission {
            PermissionState::PermissionRequested => false,
            PermissionState::PermissionGranted => false,
            PermissionState::NoPermission | PermissionState::PermissionDenied => {
                self.permission = PermissionState::PermissionRequested;
                true
            }
        }
    }

    pub fn apply_permission(&mut self, permission: Permission) {
        self.permission = match permission {
            Permission::Granted => PermissionState::PermissionGranted,
            Permission::Denied => PermissionState::PermissionDenied,
        };
        info!("Location permission {:?}", self.permission);
    }

    /// A request that failed outright counts as denied.
    pub fn permission_failed(&mut self, e: &FailureError) {
        warn!("Location permission request failed: {}", e);
        self.permission = PermissionState::PermissionDenied;
    }

    /// A request nobody is waiting for anymore. Only `PermissionRequested`
    /// goes back to `NoPermission`; an answered request is kept.
    pub fn abandon_permission_request(&mut self) {
        if self.permission == PermissionState::PermissionRequested {
            debug!("Location permission request abandoned");
            self.permission = PermissionState::NoPermission;
        }
    }

    pub fn permission_granted(&self) -> bool {
        self.permission == PermissionState::PermissionGranted
    }

    /// Applies a GPS result at the moment it resolves. Failures are logged and
    /// leave everything as it was. The text fields are only seeded if they
    /// are still both empty now, not when the fix was requested.
    pub fn apply_position_fix(&mut self, fix: Result<Coordinate, FailureError>) -> FixOutcome {
        let coordinate = match fix {
            Ok(coordinate) => coordinate,
            Err(e) => {
                warn!("Could not get current position, keeping {}: {}", self.selected_location, e);
                return FixOutcome::Ignored;
            }
        };

        if !coordinate.is_valid() {
            warn!("Ignoring out of range position fix {}", coordinate);
            return FixOutcome::Ignored;
        }

        debug!(
            "Position fix {} is {:.0} m from previous marker",
            coordinate,
            self.selected_location.distance_to(&coordinate)
        );
        self.move_marker(coordinate);

        let fields_seeded = self.fields_empty();
        if fields_seeded {
            self.seed_fields(coordinate);
        }
        FixOutcome::Applied { fields_seeded }
    }

    /// Programmatic region update. Invalid input resets marker and region to
    /// the default coordinate.
    pub fn update_map_region(&mut self, latitude: f64, longitude: f64) -> Coordinate {
        match Coordinate::validated(latitude, longitude) {
            Some(coordinate) => self.move_marker(coordinate),
            None => {
                warn!("Invalid region ({}, {}), resetting to {}", latitude, longitude, self.fallback);
                let fallback = self.fallback;
                self.move_marker(fallback);
            }
        }
        self.selected_location
    }

    /// User tap on the map. An invalid tap is rejected without touching any
    /// state; a valid one moves the marker and overwrites both fields.
    pub fn map_tap(&mut self, coordinate: Coordinate) -> Result<Coordinate, Error> {
        if !coordinate.is_valid() {
            return Err(Error::InvalidCoordinates);
        }
        self.move_marker(coordinate);
        self.seed_fields(coordinate);
        Ok(coordinate)
    }

    /// Map picker "confirm": the marker becomes the manual entry.
    pub fn confirm_selected_location(&mut self) -> Coordinate {
        let selected = self.selected_location;
        self.seed_fields(selected);
        selected
    }

    /// Manual-entry fallback "confirm": the typed pair becomes the marker.
    pub fn apply_manual_coordinates(&mut self) -> Result<Coordinate, Error> {
        let coordinate = self.manual_coordinate().ok_or(Error::InvalidCoordinates)?;
        self.move_marker(coordinate);
        Ok(coordinate)
    }

    fn move_marker(&mut self, coordinate: Coordinate) {
        self.selected_location = coordinate;
        self.map_region = self.map_region.recenter(coordinate);
    }

    fn seed_fields(&mut self, coordinate: Coordinate) {
        let (latitude, longitude) = coordinate.to_text();
        self.latitude_text = latitude;
        self.longitude_text = longitude;
    }
}
