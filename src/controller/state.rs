use models::*;
use services::location::{LocationReconciler, PermissionState};
use services::map::{MapPicker, MapStatus};
use services::submission::{Blocker, OrderForm, OrderSubmissionGate};

/// Everything the order screen holds between events.
#[derive(Clone, Debug)]
pub struct ScreenState {
    pub customer: Customer,
    pub location: LocationReconciler,
    pub map: MapPicker,
    pub cart: Cart,
    pub form: OrderForm,
    pub gate: OrderSubmissionGate,
    pub inventory: Vec<Cylinder>,
    pub acknowledgment: Option<OrderPlaced>,
    pub last_failure: Option<String>,
}

impl ScreenState {
    pub fn blockers(&self) -> Vec<Blocker> {
        self.gate.blockers(&self.cart, &self.form, &self.location)
    }

    pub fn can_submit(&self) -> bool {
        self.blockers().is_empty()
    }

    pub fn cylinder(&self, cylinder_id: CylinderId) -> Option<&Cylinder> {
        self.inventory.iter().find(|cylinder| cylinder.id == cylinder_id)
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        ScreenSnapshot {
            selected_location: self.location.selected_location(),
            map_region: self.location.map_region(),
            latitude_text: self.location.latitude_text().to_string(),
            longitude_text: self.location.longitude_text().to_string(),
            permission: self.location.permission(),
            map_status: self.map.status(),
            delivery_address: self.form.delivery_address.clone(),
            special_instructions: self.form.special_instructions.clone(),
            cart: self.cart.lines().to_vec(),
            cart_total: self.cart.total(),
            inventory: self.inventory.clone(),
            can_submit: self.can_submit(),
            blockers: self.blockers(),
            submitting: self.gate.is_submitting(),
            acknowledgment: self.acknowledgment.clone(),
            last_failure: self.last_failure.clone(),
        }
    }
}

/// Read-only view printed by the runner
#[derive(Clone, Debug, Serialize)]
pub struct ScreenSnapshot {
    pub selected_location: Coordinate,
    pub map_region: MapRegion,
    pub latitude_text: String,
    pub longitude_text: String,
    pub permission: PermissionState,
    pub map_status: MapStatus,
    pub delivery_address: String,
    pub special_instructions: String,
    pub cart: Vec<CartLine>,
    pub cart_total: f64,
    pub inventory: Vec<Cylinder>,
    pub can_submit: bool,
    pub blockers: Vec<Blocker>,
    pub submitting: bool,
    pub acknowledgment: Option<OrderPlaced>,
    pub last_failure: Option<String>,
}
