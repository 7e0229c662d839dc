//! Persistence layer modules.

pub mod registry;
pub mod state_store;

pub use registry::StateStores;
pub use state_store::StateStore;
