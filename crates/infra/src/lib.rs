//! Infrastructure layer: the datastore adapter contract and the in-memory
//! implementation used by tests and local development.

pub mod store;

pub use store::{Datastore, InMemoryDatastore, TxAccess};
