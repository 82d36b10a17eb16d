//! Operation line - one routing step (labour, setting, or subcontracting)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::coerce::{coerce_number, coerce_text};
use crate::core::identity::{Keyed, LineKey, LinePrefix};

/// How an operation is costed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum OperationType {
    /// Operator labour, derated by TRG and multiplied by crew
    #[default]
    Operator,
    /// Machine setter, not derated by TRG
    Setter,
    /// Flat subcontracted cost for the whole batch
    Subcontract,
}

impl OperationType {
    /// Classify a free-form routing keyword.
    ///
    /// Case-insensitive substring match: "sous"/"subcontract" wins over
    /// "regleur"/"régleur"; anything else is operator labour.
    pub fn classify(keyword: &str) -> Self {
        let k = keyword.to_lowercase();
        if k.contains("sous") || k.contains("subcontract") {
            OperationType::Subcontract
        } else if k.contains("régleur") || k.contains("regleur") {
            OperationType::Setter
        } else {
            OperationType::Operator
        }
    }

    /// Exact label first, keyword classification otherwise
    pub fn from_label_or_keyword(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| Self::classify(s))
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::Operator => write!(f, "Operator"),
            OperationType::Setter => write!(f, "Setter"),
            OperationType::Subcontract => write!(f, "Subcontract"),
        }
    }
}

impl std::str::FromStr for OperationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "operator" | "opérateur" | "operateur" => Ok(OperationType::Operator),
            "setter" | "régleur" | "regleur" => Ok(OperationType::Setter),
            "subcontract" | "sous-traitance" | "soustraitance" => Ok(OperationType::Subcontract),
            _ => Err(format!(
                "Invalid operation type: {}. Use operator, setter, or subcontract",
                s
            )),
        }
    }
}

impl<'de> Deserialize<'de> for OperationType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(OperationType::from_label_or_keyword(&coerce_text(&value)))
    }
}

/// One step of the routing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawOperation")]
pub struct OperationLine {
    pub id: LineKey,

    /// Workstation / operation name
    pub name: String,

    #[serde(rename = "type")]
    pub op_type: OperationType,

    /// Machine or supplier
    pub machine: String,

    /// Units produced per hour (unused for subcontracting)
    pub cadence_h: f64,

    /// Hourly rate
    pub hourly_rate: f64,

    /// Flat subcontracting cost for the batch
    pub subcontract_cost: f64,

    /// Efficiency percentage (operator lines only)
    pub trg_pct: f64,

    /// People on the station (operator lines only)
    pub crew: f64,
}

impl OperationLine {
    pub fn new(name: impl Into<String>, op_type: OperationType) -> Self {
        Self {
            id: LineKey::new(LinePrefix::Op),
            name: name.into(),
            op_type,
            machine: String::new(),
            cadence_h: 0.0,
            hourly_rate: 0.0,
            subcontract_cost: 0.0,
            trg_pct: 100.0,
            crew: 1.0,
        }
    }

    /// Blank operator row
    pub fn blank() -> Self {
        Self::new("", OperationType::Operator)
    }

    pub fn with_machine(mut self, machine: impl Into<String>) -> Self {
        self.machine = machine.into();
        self
    }

    pub fn with_cadence(mut self, cadence_h: f64) -> Self {
        self.cadence_h = cadence_h;
        self
    }

    pub fn with_rate(mut self, hourly_rate: f64) -> Self {
        self.hourly_rate = hourly_rate;
        self
    }

    pub fn with_subcontract_cost(mut self, cost: f64) -> Self {
        self.subcontract_cost = cost;
        self
    }

    pub fn with_trg(mut self, trg_pct: f64) -> Self {
        self.trg_pct = trg_pct;
        self
    }

    pub fn with_crew(mut self, crew: f64) -> Self {
        self.crew = crew;
        self
    }

    pub fn is_subcontract(&self) -> bool {
        self.op_type == OperationType::Subcontract
    }
}

impl Keyed for OperationLine {
    fn key(&self) -> &LineKey {
        &self.id
    }
}

/// Wire shape accepted for operation lines, including legacy records
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOperation {
    id: Option<Value>,
    name: Option<Value>,
    #[serde(rename = "type")]
    op_type: Option<Value>,
    machine: Option<Value>,
    cadence_h: Option<Value>,
    /// Legacy: hours per unit, superseded by `cadenceH`
    duration_h: Option<Value>,
    hourly_rate: Option<Value>,
    subcontract_cost: Option<Value>,
    trg_pct: Option<Value>,
    crew: Option<Value>,
}

impl From<RawOperation> for OperationLine {
    fn from(raw: RawOperation) -> Self {
        let number = |v: &Option<Value>| v.as_ref().map(coerce_number);

        let cadence_h = match number(&raw.cadence_h) {
            Some(c) => c,
            None => match number(&raw.duration_h) {
                Some(d) if d > 0.0 => 1.0 / d,
                _ => 0.0,
            },
        };

        Self {
            id: LineKey::from_value_or_new(raw.id.as_ref(), LinePrefix::Op),
            name: raw.name.as_ref().map(coerce_text).unwrap_or_default(),
            op_type: raw
                .op_type
                .as_ref()
                .map(|v| OperationType::from_label_or_keyword(&coerce_text(v)))
                .unwrap_or_default(),
            machine: raw.machine.as_ref().map(coerce_text).unwrap_or_default(),
            cadence_h,
            hourly_rate: number(&raw.hourly_rate).unwrap_or(0.0),
            subcontract_cost: number(&raw.subcontract_cost).unwrap_or(0.0),
            trg_pct: number(&raw.trg_pct).unwrap_or(100.0),
            crew: number(&raw.crew).unwrap_or(1.0),
        }
    }
}
