//! Reference catalog of food items.
//!
//! The catalog is master data: shared, read-only from the ledger's point of
//! view, and maintained outside this core. Purchases use it to resolve weak
//! `FoodItemId` references and to default a lot's unit and expiration.

pub mod food_item;

pub use food_item::{FoodCatalog, FoodItem};
