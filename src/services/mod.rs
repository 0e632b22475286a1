pub mod geocode;
pub mod inventory;
pub mod location;
pub mod map;
pub mod order;
pub mod submission;
