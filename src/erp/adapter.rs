//! ERP payload mapping
//!
//! Turns BOM and routing payloads into scenario lines. Upstream data is
//! trusted as-is: only numeric coercion is applied, so malformed records
//! become zero-valued lines rather than errors.

use serde_json::Value;

use crate::core::coerce::{coerce_number, coerce_text};
use crate::entities::material::MaterialLine;
use crate::entities::operation::{OperationLine, OperationType};

/// Name given to routing steps that carry no usable label
pub const DEFAULT_OPERATION_NAME: &str = "Operation";

/// Separator between component code and name
const NAME_SEPARATOR: &str = " – ";

/// Map a BOM payload (`{components: [...]}` or a bare array) to material lines
pub fn materials_from_bom(payload: &Value) -> Vec<MaterialLine> {
    records(payload, "components")
        .map(|c| {
            let name = ["code", "name"]
                .iter()
                .map(|k| text(c, k))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(NAME_SEPARATOR);

            MaterialLine::new(
                name,
                first_number(c, &["qty_per", "qty"]),
                first_number(c, &["unit_cost", "cost"]),
            )
        })
        .collect()
}

/// Map a routing payload (`{operations: [...]}` or a bare array) to
/// operation lines
pub fn operations_from_routing(payload: &Value) -> Vec<OperationLine> {
    records(payload, "operations")
        .map(|o| {
            let op_type = OperationType::classify(&text(o, "type"));
            let name = first_text(o, &["name", "operation", "workcenter"]);
            let name = if name.is_empty() {
                DEFAULT_OPERATION_NAME.to_string()
            } else {
                name
            };

            let run_per_unit = first_number(o, &["run_h_per_unit"]);
            let cadence = if op_type == OperationType::Subcontract || run_per_unit <= 0.0 {
                0.0
            } else {
                1.0 / run_per_unit
            };
            let subcontract_cost = if op_type == OperationType::Subcontract {
                first_number(o, &["subcontract_cost", "cost"])
            } else {
                0.0
            };

            OperationLine::new(name, op_type)
                .with_machine(first_text(o, &["machine", "workcenter", "resource"]))
                .with_cadence(cadence)
                .with_rate(first_number(o, &["hourly_rate", "rate"]))
                .with_subcontract_cost(subcontract_cost)
        })
        .collect()
}

/// Records of a wrapped or bare payload
fn records<'a>(payload: &'a Value, wrapper: &str) -> std::slice::Iter<'a, Value> {
    let items: &[Value] = match payload {
        Value::Array(items) => items,
        Value::Object(obj) => match obj.get(wrapper) {
            Some(Value::Array(items)) => items,
            _ => &[],
        },
        _ => &[],
    };
    items.iter()
}

fn text(record: &Value, key: &str) -> String {
    record.get(key).map(coerce_text).unwrap_or_default()
}

/// First non-empty text among `keys`
fn first_text(record: &Value, keys: &[&str]) -> String {
    keys.iter()
        .map(|k| text(record, k))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// First non-zero number among `keys`, 0 when none
fn first_number(record: &Value, keys: &[&str]) -> f64 {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .map(coerce_number)
        .find(|n| *n != 0.0)
        .unwrap_or(0.0)
}
