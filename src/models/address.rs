use models::Coordinate;

/// One reverse geocoding result.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddressComponents {
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl AddressComponents {
    /// Joins name, street, city, region, postal code and country with ", ",
    /// skipping blank parts. `None` when every part is blank.
    pub fn display(&self) -> Option<String> {
        let parts: Vec<&str> = [
            self.name.as_ref(),
            self.street.as_ref(),
            self.city.as_ref(),
            self.region.as_ref(),
            self.postal_code.as_ref(),
            self.country.as_ref(),
        ].iter()
            .filter_map(|part| *part)
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Fallback address when nothing better is known.
pub fn coordinate_label(coordinate: &Coordinate) -> String {
    format!("Lat: {:.4}, Lng: {:.4}", coordinate.latitude, coordinate.longitude)
}
