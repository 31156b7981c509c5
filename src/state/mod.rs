//! State Management
//!
//! Session store shared by the router and the pages.

pub mod store;

pub use store::{AppState, Store, StoreEvent, StoreEventKind};
