//! Cost / margin calculation
//!
//! `compute` is a pure function of the scenario: every figure is rebuilt from
//! scratch on each call and no input is ever rejected. Numeric fields go
//! through [`crate::core::coerce`] first.
//!
//! Overhead is a percentage of *net revenue*, not of direct costs.

use serde::{Serialize, Serializer};

use crate::core::coerce::{finite_or_zero, parse_at_least_one, parse_non_negative};
use crate::entities::material::MaterialLine;
use crate::entities::operation::{OperationLine, OperationType};
use crate::entities::scenario::Scenario;

/// Break-even unit sale price
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakEven {
    /// Price per unit at which the margin is zero
    Price(f64),
    /// No finite price reaches zero margin (overhead takes 100 % or more of
    /// revenue, or the discount removes all revenue)
    Undefined,
}

impl BreakEven {
    pub fn price(&self) -> Option<f64> {
        match self {
            BreakEven::Price(p) => Some(*p),
            BreakEven::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, BreakEven::Price(_))
    }
}

/// Serialized as a number, or `null` when undefined
impl Serialize for BreakEven {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.price().serialize(serializer)
    }
}

/// Cost chart buckets, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CostBucket {
    Material,
    Operations,
    Overhead,
}

impl std::fmt::Display for CostBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostBucket::Material => write!(f, "Material"),
            CostBucket::Operations => write!(f, "Operations"),
            CostBucket::Overhead => write!(f, "Overhead"),
        }
    }
}

/// One slice of the cost breakdown chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartSlice {
    pub name: CostBucket,
    pub value: f64,
}

/// Everything derived from a scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    /// Batch size actually used (floored at 1)
    pub batch_qty: f64,
    pub material_total: f64,
    pub operation_total: f64,
    pub direct_costs: f64,
    pub overhead: f64,
    pub total_cost: f64,
    pub unit_cost: f64,
    pub net_revenue: f64,
    pub margin: f64,
    pub margin_per_unit: f64,
    pub margin_pct: f64,
    pub break_even_unit: BreakEven,
    pub chart: [ChartSlice; 3],
}

impl ResultSet {
    /// Negative margin: shown in a distinct colour
    pub fn is_loss(&self) -> bool {
        self.margin < 0.0
    }
}

/// Cost of one material line for the whole batch
pub fn material_line_cost(line: &MaterialLine, batch_qty: f64) -> f64 {
    parse_non_negative(line.qty) * batch_qty * parse_non_negative(line.unit_cost)
}

/// Cost of one operation line for the whole batch.
///
/// Subcontracting is a flat amount. Other lines are costed on the hours the
/// batch takes at the given cadence; a zero cadence means "not costed yet"
/// and contributes nothing.
pub fn operation_line_cost(line: &OperationLine, batch_qty: f64) -> f64 {
    if line.op_type == OperationType::Subcontract {
        return finite_or_zero(line.subcontract_cost);
    }

    let cadence = finite_or_zero(line.cadence_h);
    if cadence <= 0.0 {
        return 0.0;
    }

    let trg = finite_or_zero(line.trg_pct);
    let trg_factor = if line.op_type == OperationType::Operator && trg > 0.0 {
        100.0 / trg
    } else {
        1.0
    };

    let hours_for_batch = batch_qty / cadence;
    hours_for_batch * finite_or_zero(line.hourly_rate) * parse_at_least_one(line.crew) * trg_factor
}

/// Compute the full result set for a scenario
pub fn compute(scenario: &Scenario) -> ResultSet {
    let batch = parse_at_least_one(scenario.batch_qty);
    let sale_price = finite_or_zero(scenario.sale_price);
    let discount_pct = finite_or_zero(scenario.eoy_discount_pct);
    let overhead_pct = finite_or_zero(scenario.overhead_pct);

    let material_total: f64 = scenario
        .materials
        .iter()
        .map(|m| material_line_cost(m, batch))
        .sum();
    let operation_total: f64 = scenario
        .operations
        .iter()
        .map(|o| operation_line_cost(o, batch))
        .sum();
    let direct_costs = material_total + operation_total;

    let discount = discount_pct / 100.0;
    let net_revenue = sale_price * batch * (1.0 - discount);
    let overhead = overhead_pct / 100.0 * net_revenue;

    let total_cost = direct_costs + overhead;
    let unit_cost = total_cost / batch;

    let margin = net_revenue - total_cost;
    let margin_per_unit = margin / batch;
    let margin_pct = if net_revenue > 0.0 {
        margin / net_revenue * 100.0
    } else {
        0.0
    };

    ResultSet {
        batch_qty: batch,
        material_total,
        operation_total,
        direct_costs,
        overhead,
        total_cost,
        unit_cost,
        net_revenue,
        margin,
        margin_per_unit,
        margin_pct,
        break_even_unit: break_even(direct_costs, batch, discount, overhead_pct),
        chart: [
            ChartSlice {
                name: CostBucket::Material,
                value: material_total,
            },
            ChartSlice {
                name: CostBucket::Operations,
                value: operation_total,
            },
            ChartSlice {
                name: CostBucket::Overhead,
                value: overhead,
            },
        ],
    }
}

/// Solve `net_revenue(p) - direct - overhead(p) = 0` for the unit price `p`
fn break_even(direct_costs: f64, batch: f64, discount: f64, overhead_pct: f64) -> BreakEven {
    let k = 1.0 - overhead_pct / 100.0;
    let kept = 1.0 - discount;
    if k <= 0.0 || kept <= 0.0 {
        return BreakEven::Undefined;
    }
    let needed_net_revenue = direct_costs / k;
    BreakEven::Price(needed_net_revenue / (batch * kept))
}
