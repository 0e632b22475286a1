use errors::Error;
use models::{Cylinder, CylinderId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub cylinder_id: CylinderId,
    pub name: String,
    pub unit_price: f64,
    pub stock_quantity: u32,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Every line satisfies `1 <= quantity <= stock_quantity`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn quantity_of(&self, cylinder_id: CylinderId) -> Option<u32> {
        self.line(cylinder_id).map(|line| line.quantity)
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Adds one unit. Returns the new quantity, or rejects the add and leaves
    /// the cart unchanged when stock would be exceeded.
    pub fn add(&mut self, cylinder: &Cylinder) -> Result<u32, Error> {
        if let Some(line) = self.lines.iter_mut().find(|line| line.cylinder_id == cylinder.id) {
            return increment_line(line);
        }

        if !cylinder.is_orderable() {
            return Err(Error::InsufficientStock {
                name: cylinder.name.clone(),
                available: 0,
            });
        }

        self.lines.push(CartLine {
            cylinder_id: cylinder.id,
            name: cylinder.name.clone(),
            unit_price: cylinder.price,
            stock_quantity: cylinder.stock_quantity,
            quantity: 1,
        });
        Ok(1)
    }

    pub fn increment(&mut self, cylinder_id: CylinderId) -> Result<u32, Error> {
        match self.lines.iter_mut().find(|line| line.cylinder_id == cylinder_id) {
            Some(line) => increment_line(line),
            None => Err(Error::UnknownCylinder),
        }
    }

    /// Returns the remaining quantity; `None` once the line is removed.
    pub fn decrement(&mut self, cylinder_id: CylinderId) -> Result<Option<u32>, Error> {
        let quantity = self.quantity_of(cylinder_id).ok_or(Error::UnknownCylinder)?;
        self.set_quantity(cylinder_id, i64::from(quantity) - 1)
    }

    /// Zero or less drops the line; more than the stock is rejected.
    pub fn set_quantity(&mut self, cylinder_id: CylinderId, quantity: i64) -> Result<Option<u32>, Error> {
        let index = self
            .lines
            .iter()
            .position(|line| line.cylinder_id == cylinder_id)
            .ok_or(Error::UnknownCylinder)?;

        if quantity <= 0 {
            self.lines.remove(index);
            return Ok(None);
        }

        let line = &mut self.lines[index];
        if quantity > i64::from(line.stock_quantity) {
            return Err(Error::InsufficientStock {
                name: line.name.clone(),
                available: line.stock_quantity,
            });
        }
        line.quantity = quantity as u32;
        Ok(Some(line.quantity))
    }

    pub fn remove(&mut self, cylinder_id: CylinderId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.cylinder_id != cylinder_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Applies a fresh inventory listing: lines whose cylinder is gone or out
    /// of stock are dropped, the rest are clamped to the new stock. Returns
    /// the ids of lines that changed.
    pub fn reconcile_stock(&mut self, inventory: &[Cylinder]) -> Vec<CylinderId> {
        let mut changed = vec![];
        self.lines.retain(|line| {
            let keep = inventory
                .iter()
                .any(|cylinder| cylinder.id == line.cylinder_id && cylinder.is_orderable());
            if !keep {
                changed.push(line.cylinder_id);
            }
            keep
        });

        for line in self.lines.iter_mut() {
            if let Some(cylinder) = inventory.iter().find(|cylinder| cylinder.id == line.cylinder_id) {
                line.stock_quantity = cylinder.stock_quantity;
                line.unit_price = cylinder.price;
                if line.quantity > line.stock_quantity {
                    line.quantity = line.stock_quantity;
                    changed.push(line.cylinder_id);
                }
            }
        }

        changed
    }

    fn line(&self, cylinder_id: CylinderId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.cylinder_id == cylinder_id)
    }
}

fn increment_line(line: &mut CartLine) -> Result<u32, Error> {
    if line.quantity >= line.stock_quantity {
        return Err(Error::InsufficientStock {
            name: line.name.clone(),
            available: line.stock_quantity,
        });
    }
    line.quantity += 1;
    Ok(line.quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cylinder(id: i32, stock: u32) -> Cylinder {
        Cylinder {
            id: CylinderId(id),
            name: format!("{}kg cylinder", id),
            size: None,
            price: 50_000.0,
            stock_quantity: stock,
            is_available: true,
        }
    }

    #[test]
    fn add_is_capped_by_stock() {
        let mut cart = Cart::new();
        let six = cylinder(6, 3);

        assert_eq!(cart.add(&six).unwrap(), 1);
        assert_eq!(cart.add(&six).unwrap(), 2);
        assert_eq!(cart.add(&six).unwrap(), 3);
        match cart.add(&six) {
            Err(Error::InsufficientStock { available, .. }) => assert_eq!(available, 3),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(cart.quantity_of(CylinderId(6)), Some(3));
    }

    #[test]
    fn out_of_stock_cylinder_is_not_added() {
        let mut cart = Cart::new();
        assert!(cart.add(&cylinder(12, 0)).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn decrement_of_last_unit_removes_line() {
        let mut cart = Cart::new();
        cart.add(&cylinder(6, 3)).unwrap();
        cart.add(&cylinder(12, 3)).unwrap();

        assert_eq!(cart.decrement(CylinderId(6)).unwrap(), None);
        assert_eq!(cart.quantity_of(CylinderId(6)), None);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn increment_unknown_line_fails() {
        let mut cart = Cart::new();
        match cart.increment(CylinderId(1)) {
            Err(Error::UnknownCylinder) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn set_quantity_clamps_or_removes() {
        let mut cart = Cart::new();
        cart.add(&cylinder(6, 4)).unwrap();

        assert_eq!(cart.set_quantity(CylinderId(6), 4).unwrap(), Some(4));
        assert!(cart.set_quantity(CylinderId(6), 5).is_err());
        assert_eq!(cart.quantity_of(CylinderId(6)), Some(4));
        assert_eq!(cart.set_quantity(CylinderId(6), -2).unwrap(), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn totals() {
        let mut cart = Cart::new();
        let six = cylinder(6, 5);
        cart.add(&six).unwrap();
        cart.add(&six).unwrap();
        cart.add(&cylinder(12, 5)).unwrap();

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), 150_000.0);
    }

    #[test]
    fn reconcile_drops_and_clamps() {
        let mut cart = Cart::new();
        let six = cylinder(6, 5);
        for _ in 0..4 {
            cart.add(&six).unwrap();
        }
        cart.add(&cylinder(12, 5)).unwrap();
        cart.add(&cylinder(45, 5)).unwrap();

        let mut sold_out = cylinder(12, 0);
        sold_out.is_available = false;
        let changed = cart.reconcile_stock(&[cylinder(6, 2), sold_out]);

        assert_eq!(changed, vec![CylinderId(12), CylinderId(45), CylinderId(6)]);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of(CylinderId(6)), Some(2));
        assert_eq!(cart.lines()[0].stock_quantity, 2);
    }
}
