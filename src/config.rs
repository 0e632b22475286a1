use std::env;
use std::time::Duration;

use config_crate::{Config as RawConfig, ConfigError, Environment, File};

use models::{Coordinate, Customer, CustomerId, StoredAddress, DEFAULT_COORDINATE, LATITUDE_DELTA, LONGITUDE_DELTA};

enum Env {
    Development,
    Test,
    Production,
}

impl Env {
    fn new() -> Self {
        match env::var("RUN_MODE") {
            Ok(ref s) if s == "test" => Env::Test,
            Ok(ref s) if s == "production" => Env::Production,
            _ => Env::Development,
        }
    }

    fn to_string(&self) -> &'static str {
        match self {
            &Env::Development => "development",
            &Env::Production => "production",
            &Env::Test => "test",
        }
    }
}

/// Backends the screen talks to
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Service {
    Orders,
    Inventory,
    Geocoder,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum GpsAccuracy {
    Low,
    Balanced,
    High,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocationSettings {
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
    #[serde(default = "default_latitude_delta")]
    pub latitude_delta: f64,
    #[serde(default = "default_longitude_delta")]
    pub longitude_delta: f64,
    #[serde(default = "default_accuracy")]
    pub gps_accuracy: GpsAccuracy,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapSettings {
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomerSettings {
    pub id: i32,
    pub token: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Simulated device for the runner
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeviceSettings {
    #[serde(default)]
    pub permission_granted: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub orders_addr: String,
    pub inventory_addr: String,
    pub geocoder_addr: String,
    #[serde(default)]
    pub location: LocationSettings,
    #[serde(default)]
    pub map: MapSettings,
    pub customer: Option<CustomerSettings>,
    #[serde(default)]
    pub device: DeviceSettings,
}

impl Config {
    /// Creates config from base.toml, which are overwritten by <env>.toml, where
    /// env is one of development, test, production. After that it could be overwritten
    /// by environment variables like ORD_ORDERS_ADDR (this will override `orders_addr` field in config)
    pub fn new() -> Result<Self, ConfigError> {
        let env = Env::new();
        let mut s = RawConfig::new();

        s.merge(File::with_name("config/base"))?;
        // Optional file specific for environment
        s.merge(File::with_name(&format!("config/{}", env.to_string())).required(false))?;

        // Add in settings from the environment (with a prefix of ORD)
        s.merge(Environment::with_prefix("ORD"))?;

        s.try_into()
    }

    pub fn service_url(&self, service: Service) -> String {
        match service {
            Service::Orders => self.orders_addr.clone(),
            Service::Inventory => self.inventory_addr.clone(),
            Service::Geocoder => self.geocoder_addr.clone(),
        }
    }

    pub fn default_coordinate(&self) -> Coordinate {
        Coordinate::validated(self.location.default_latitude, self.location.default_longitude).unwrap_or(DEFAULT_COORDINATE)
    }

    pub fn map_ready_timeout(&self) -> Duration {
        Duration::from_secs(self.map.ready_timeout_secs)
    }

    pub fn customer(&self) -> Option<Customer> {
        self.customer.as_ref().map(|settings| {
            let coordinate = match (settings.latitude, settings.longitude) {
                (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
                _ => None,
            };
            Customer {
                id: CustomerId(settings.id),
                token: settings.token.clone().into(),
                stored_address: settings.address.clone().map(|address| StoredAddress { address, coordinate }),
            }
        })
    }
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
            latitude_delta: default_latitude_delta(),
            longitude_delta: default_longitude_delta(),
            gps_accuracy: default_accuracy(),
        }
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            ready_timeout_secs: default_ready_timeout_secs(),
        }
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            permission_granted: false,
            latitude: None,
            longitude: None,
        }
    }
}

fn default_latitude() -> f64 {
    DEFAULT_COORDINATE.latitude
}

fn default_longitude() -> f64 {
    DEFAULT_COORDINATE.longitude
}

fn default_latitude_delta() -> f64 {
    LATITUDE_DELTA
}

fn default_longitude_delta() -> f64 {
    LONGITUDE_DELTA
}

fn default_accuracy() -> GpsAccuracy {
    GpsAccuracy::High
}

fn default_ready_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub fn test_config() -> Config {
        Config {
            orders_addr: "http://orders.local".to_string(),
            inventory_addr: "http://inventory.local".to_string(),
            geocoder_addr: "http://geocoder.local".to_string(),
            location: LocationSettings::default(),
            map: MapSettings::default(),
            customer: None,
            device: DeviceSettings::default(),
        }
    }

    #[test]
    fn out_of_range_default_falls_back_to_builtin() {
        let mut config = test_config();
        config.location.default_latitude = 120.0;
        assert_eq!(config.default_coordinate(), DEFAULT_COORDINATE);
    }

    #[test]
    fn customer_without_stored_coordinate() {
        let mut config = test_config();
        config.customer = Some(CustomerSettings {
            id: 7,
            token: "secret".to_string(),
            address: Some("Plot 4, Kampala Road".to_string()),
            latitude: Some(0.31),
            longitude: None,
        });
        let customer = config.customer().unwrap();
        assert_eq!(customer.id, CustomerId(7));
        let stored = customer.stored_address.unwrap();
        assert_eq!(stored.address, "Plot 4, Kampala Road");
        assert!(stored.coordinate.is_none());
    }
}
