use std::fmt;

use models::Coordinate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub i32);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bearer token issued by the auth backend
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for AuthToken {
    fn from(token: String) -> Self {
        AuthToken(token)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AuthToken(***)")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredAddress {
    pub address: String,
    pub coordinate: Option<Coordinate>,
}

/// Authenticated user placing the order
#[derive(Clone, Debug, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub token: AuthToken,
    pub stored_address: Option<StoredAddress>,
}

impl Customer {
    /// Stored coordinate, if one exists and passes validation.
    pub fn seed_coordinate(&self) -> Option<Coordinate> {
        self.stored_address
            .as_ref()
            .and_then(|stored| stored.coordinate)
            .filter(|coordinate| coordinate.is_valid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_not_leaked_in_debug_output() {
        let token = AuthToken::from("very-secret".to_string());
        assert_eq!(format!("{:?}", token), "AuthToken(***)");
        assert_eq!(token.as_str(), "very-secret");
    }

    #[test]
    fn invalid_stored_coordinate_is_not_a_seed() {
        let customer = Customer {
            id: CustomerId(1),
            token: AuthToken::from("t".to_string()),
            stored_address: Some(StoredAddress {
                address: "Ntinda".to_string(),
                coordinate: Some(Coordinate::new(200.0, 32.0)),
            }),
        };
        assert_eq!(customer.seed_coordinate(), None);
    }
}
