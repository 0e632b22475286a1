use std::rc::Rc;

use failure::Error as FailureError;
use futures::prelude::*;

use microservice::InventoryMicroservice;
use models::*;

/// Loads the cylinders a customer can actually order.
#[derive(Clone)]
pub struct InventoryService {
    inventory_microservice: Rc<dyn InventoryMicroservice>,
}

impl InventoryService {
    pub fn new(inventory_microservice: Rc<dyn InventoryMicroservice>) -> Self {
        Self { inventory_microservice }
    }

    pub fn load(&self, token: &AuthToken) -> Box<dyn Future<Item = Vec<Cylinder>, Error = FailureError>> {
        debug!("Loading available cylinders");
        let res = self.inventory_microservice.list_available_products(token).map(|cylinders| {
            let total = cylinders.len();
            let orderable: Vec<Cylinder> = cylinders.into_iter().filter(Cylinder::is_orderable).collect();
            debug!("{} of {} cylinders are orderable", orderable.len(), total);
            orderable
        });
        Box::new(res)
    }
}

#[cfg(test)]
mod tests {
    use futures::future;

    use super::*;
    use microservice::ApiFuture;

    struct Listing(Vec<Cylinder>);

    impl InventoryMicroservice for Listing {
        fn list_available_products(&self, _token: &AuthToken) -> ApiFuture<Vec<Cylinder>> {
            Box::new(future::ok::<_, FailureError>(self.0.clone()))
        }
    }

    fn cylinder(id: i32, stock: u32, available: bool) -> Cylinder {
        Cylinder {
            id: CylinderId(id),
            name: format!("cylinder {}", id),
            size: None,
            price: 1.0,
            stock_quantity: stock,
            is_available: available,
        }
    }

    #[test]
    fn keeps_only_available_in_stock() {
        let service = InventoryService::new(Rc::new(Listing(vec![
            cylinder(1, 3, true),
            cylinder(2, 0, true),
            cylinder(3, 5, false),
            cylinder(4, 1, true),
        ])));

        let loaded = service.load(&AuthToken::from("t".to_string())).wait().unwrap();
        let ids: Vec<CylinderId> = loaded.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![CylinderId(1), CylinderId(4)]);
    }
}
