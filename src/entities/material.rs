//! Material line - one component consumed per produced unit

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::coerce::{coerce_number, coerce_text};
use crate::core::identity::{Keyed, LineKey, LinePrefix};

/// A material/component consumed by the article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawMaterial")]
pub struct MaterialLine {
    /// Line key (editing only)
    pub id: LineKey,

    /// Designation, e.g. "Acier S235"
    pub name: String,

    /// Quantity needed for ONE produced unit
    pub qty: f64,

    /// Cost of one unit of this material
    pub unit_cost: f64,
}

impl MaterialLine {
    pub fn new(name: impl Into<String>, qty: f64, unit_cost: f64) -> Self {
        Self {
            id: LineKey::new(LinePrefix::Mat),
            name: name.into(),
            qty,
            unit_cost,
        }
    }

    /// Blank line as added from an empty form row
    pub fn blank() -> Self {
        Self::new("", 1.0, 0.0)
    }
}

impl Keyed for MaterialLine {
    fn key(&self) -> &LineKey {
        &self.id
    }
}

/// Wire shape accepted for material lines (every field optional, any type)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMaterial {
    id: Option<Value>,
    name: Option<Value>,
    qty: Option<Value>,
    unit_cost: Option<Value>,
}

impl From<RawMaterial> for MaterialLine {
    fn from(raw: RawMaterial) -> Self {
        Self {
            id: LineKey::from_value_or_new(raw.id.as_ref(), LinePrefix::Mat),
            name: raw.name.as_ref().map(coerce_text).unwrap_or_default(),
            qty: raw.qty.as_ref().map(coerce_number).unwrap_or(0.0),
            unit_cost: raw.unit_cost.as_ref().map(coerce_number).unwrap_or(0.0),
        }
    }
}
