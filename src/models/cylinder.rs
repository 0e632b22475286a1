use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CylinderId(pub i32);

impl fmt::Display for CylinderId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gas cylinder as listed by the inventory API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cylinder {
    pub id: CylinderId,
    pub name: String,
    #[serde(default)]
    pub size: Option<String>,
    pub price: f64,
    pub stock_quantity: u32,
    pub is_available: bool,
}

impl Cylinder {
    pub fn is_orderable(&self) -> bool {
        self.is_available && self.stock_quantity > 0
    }
}
