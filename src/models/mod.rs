pub mod address;
pub mod cart;
pub mod coordinate;
pub mod customer;
pub mod cylinder;
pub mod order;

pub use self::address::*;
pub use self::cart::*;
pub use self::coordinate::*;
pub use self::customer::*;
pub use self::cylinder::*;
pub use self::order::*;
