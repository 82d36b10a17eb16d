//! ERP integration: BOM and routing loading
//!
//! [`client`] talks HTTP, [`adapter`] maps the payloads to scenario lines.

pub mod adapter;
pub mod client;

pub use adapter::{materials_from_bom, operations_from_routing};
pub use client::{Endpoint, ErpClient, ErpData, ErpError};
