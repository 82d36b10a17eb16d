//! Core module - fundamental types and utilities

pub mod catalog;
pub mod coerce;
pub mod config;
pub mod costing;
pub mod identity;
pub mod store;
pub mod workspace;

pub use catalog::{Catalog, CatalogError};
pub use config::Config;
pub use costing::{BreakEven, ResultSet};
pub use identity::{Keyed, LineKey, LineKeyError, LinePrefix};
pub use store::{ScenarioStore, StoreError};
pub use workspace::{Workspace, WorkspaceError};
