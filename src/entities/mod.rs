//! Entity type definitions
//!
//! - [`Scenario`] - the costing input for one article and one batch
//! - [`MaterialLine`] - a bill-of-materials line, per unit produced
//! - [`OperationLine`] - a routing step (operator, setter, or subcontract)

pub mod material;
pub mod operation;
pub mod scenario;

pub use material::MaterialLine;
pub use operation::{OperationLine, OperationType};
pub use scenario::{ImportSummary, Scenario, ScenarioError};
