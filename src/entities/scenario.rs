//! Scenario - the whole costing input for one article
//!
//! Also holds the export/import document handling: a scenario file is the
//! scenario's fields in camelCase plus a `generatedAt` timestamp.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::coerce::{coerce_number, coerce_text};
use crate::core::costing::{self, ResultSet};
use crate::core::identity::{resolve_line, LineKeyError, LinePrefix};
use crate::entities::material::MaterialLine;
use crate::entities::operation::{OperationLine, OperationType};
use crate::json::{parse_json_str, JsonSyntaxError};

/// Costing scenario for one article and one batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Article family (display / catalog lookup only)
    pub family: String,

    /// Article reference, also used to query the ERP
    pub article_ref: String,

    /// Selected technical data (display only)
    pub selected_technical: String,

    /// Units per batch (floored at 1 when costing)
    pub batch_qty: f64,

    /// Sale price per unit, before discount
    pub sale_price: f64,

    /// End-of-year discount, percent of gross revenue
    pub eoy_discount_pct: f64,

    /// Overhead, percent of net revenue
    pub overhead_pct: f64,

    pub materials: Vec<MaterialLine>,

    pub operations: Vec<OperationLine>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            family: String::new(),
            article_ref: String::new(),
            selected_technical: String::new(),
            batch_qty: 1.0,
            sale_price: 0.0,
            eoy_discount_pct: 0.0,
            overhead_pct: 0.0,
            materials: Vec::new(),
            operations: Vec::new(),
        }
    }
}

impl Scenario {
    /// Starter scenario written by `costsim init`
    pub fn sample() -> Self {
        Self {
            batch_qty: 100.0,
            sale_price: 12.5,
            eoy_discount_pct: 3.0,
            overhead_pct: 12.0,
            materials: vec![MaterialLine::new("Acier S235", 2.0, 3.9)],
            operations: vec![OperationLine::new("Découpe laser", OperationType::Operator)
                .with_machine("Laser Bystronic")
                .with_cadence(10.0)
                .with_rate(55.0)],
            ..Self::default()
        }
    }

    /// Derived cost/margin figures
    pub fn results(&self) -> ResultSet {
        costing::compute(self)
    }

    // ---------------------------------------------------------------------
    // Article selection: changing a level clears the levels below it
    // ---------------------------------------------------------------------

    pub fn select_family(&mut self, family: impl Into<String>) {
        self.family = family.into();
        self.article_ref.clear();
        self.selected_technical.clear();
    }

    pub fn select_article(&mut self, article_ref: impl Into<String>) {
        self.article_ref = article_ref.into();
        self.selected_technical.clear();
    }

    pub fn select_technical(&mut self, technical: impl Into<String>) {
        self.selected_technical = technical.into();
    }

    // ---------------------------------------------------------------------
    // Line editing
    // ---------------------------------------------------------------------

    pub fn add_material(&mut self, line: MaterialLine) -> &MaterialLine {
        self.materials.push(line);
        &self.materials[self.materials.len() - 1]
    }

    pub fn material_mut(&mut self, reference: &str) -> Result<&mut MaterialLine, LineKeyError> {
        let pos = resolve_line(&self.materials, reference, LinePrefix::Mat)?;
        Ok(&mut self.materials[pos])
    }

    pub fn remove_material(&mut self, reference: &str) -> Result<MaterialLine, LineKeyError> {
        let pos = resolve_line(&self.materials, reference, LinePrefix::Mat)?;
        Ok(self.materials.remove(pos))
    }

    pub fn add_operation(&mut self, line: OperationLine) -> &OperationLine {
        self.operations.push(line);
        &self.operations[self.operations.len() - 1]
    }

    pub fn operation_mut(&mut self, reference: &str) -> Result<&mut OperationLine, LineKeyError> {
        let pos = resolve_line(&self.operations, reference, LinePrefix::Op)?;
        Ok(&mut self.operations[pos])
    }

    pub fn remove_operation(&mut self, reference: &str) -> Result<OperationLine, LineKeyError> {
        let pos = resolve_line(&self.operations, reference, LinePrefix::Op)?;
        Ok(self.operations.remove(pos))
    }

    // ---------------------------------------------------------------------
    // Export / import
    // ---------------------------------------------------------------------

    /// Export document stamped with the given time
    pub fn to_document(&self, generated_at: DateTime<Utc>) -> ScenarioDocument<'_> {
        ScenarioDocument {
            scenario: self,
            generated_at,
        }
    }

    /// Pretty JSON export document stamped now
    pub fn export_json(&self) -> Result<String, ScenarioError> {
        serde_json::to_string_pretty(&self.to_document(Utc::now())).map_err(ScenarioError::Encode)
    }

    /// Default export file name: `simu_<article>.json`
    pub fn export_file_name(&self) -> String {
        let article = self.article_ref.trim();
        let stem: String = if article.is_empty() {
            "article".to_string()
        } else {
            article
                .chars()
                .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
                .collect()
        };
        format!("simu_{}.json", stem)
    }

    /// Merge an export document into this scenario.
    ///
    /// The document is fully parsed before anything is applied, so a bad file
    /// leaves the scenario untouched. Fields missing from the document keep
    /// their current value; line lists are replaced only when present as
    /// arrays.
    pub fn import_json(&mut self, source: &str, filename: &str) -> Result<ImportSummary, ScenarioError> {
        let patch = ScenarioPatch::parse(source, filename)?;
        Ok(patch.apply(self))
    }

    /// Parse a scenario file into a fresh scenario
    pub fn from_json(source: &str, filename: &str) -> Result<Self, ScenarioError> {
        let mut scenario = Self::default();
        scenario.import_json(source, filename)?;
        Ok(scenario)
    }
}

/// Export shape: every scenario field plus a generation timestamp
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDocument<'a> {
    #[serde(flatten)]
    pub scenario: &'a Scenario,

    pub generated_at: DateTime<Utc>,
}

/// What an import changed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// Top-level scalar fields that were present and applied
    pub fields: Vec<&'static str>,
    /// Material lines loaded, when the list was replaced
    pub materials: Option<usize>,
    /// Operation lines loaded, when the list was replaced
    pub operations: Option<usize>,
    /// `generatedAt` of the document, when readable
    pub generated_at: Option<DateTime<Utc>>,
}

/// A fully-parsed import document, not yet applied
#[derive(Debug, Default)]
struct ScenarioPatch {
    family: Option<String>,
    article_ref: Option<String>,
    selected_technical: Option<String>,
    batch_qty: Option<f64>,
    sale_price: Option<f64>,
    eoy_discount_pct: Option<f64>,
    overhead_pct: Option<f64>,
    materials: Option<Vec<MaterialLine>>,
    operations: Option<Vec<OperationLine>>,
    generated_at: Option<DateTime<Utc>>,
}

impl ScenarioPatch {
    fn parse(source: &str, filename: &str) -> Result<Self, ScenarioError> {
        let root: Value = parse_json_str(source, filename)?;
        let Value::Object(obj) = root else {
            return Err(ScenarioError::NotAnObject {
                filename: filename.to_string(),
            });
        };

        let text = |key: &str| obj.get(key).map(coerce_text);
        let number = |key: &str| obj.get(key).map(coerce_number);

        Ok(Self {
            family: text("family"),
            article_ref: text("articleRef"),
            selected_technical: text("selectedTechnical"),
            batch_qty: number("batchQty"),
            sale_price: number("salePrice"),
            eoy_discount_pct: number("eoyDiscountPct"),
            overhead_pct: number("overheadPct"),
            materials: parse_lines(&obj, "materials", LinePrefix::Mat)?,
            operations: parse_lines(&obj, "operations", LinePrefix::Op)?,
            generated_at: obj
                .get("generatedAt")
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
        })
    }

    fn apply(self, scenario: &mut Scenario) -> ImportSummary {
        let mut summary = ImportSummary {
            generated_at: self.generated_at,
            ..ImportSummary::default()
        };

        if let Some(v) = self.family {
            scenario.family = v;
            summary.fields.push("family");
        }
        if let Some(v) = self.article_ref {
            scenario.article_ref = v;
            summary.fields.push("articleRef");
        }
        if let Some(v) = self.selected_technical {
            scenario.selected_technical = v;
            summary.fields.push("selectedTechnical");
        }
        if let Some(v) = self.batch_qty {
            scenario.batch_qty = v;
            summary.fields.push("batchQty");
        }
        if let Some(v) = self.sale_price {
            scenario.sale_price = v;
            summary.fields.push("salePrice");
        }
        if let Some(v) = self.eoy_discount_pct {
            scenario.eoy_discount_pct = v;
            summary.fields.push("eoyDiscountPct");
        }
        if let Some(v) = self.overhead_pct {
            scenario.overhead_pct = v;
            summary.fields.push("overheadPct");
        }

        if let Some(materials) = self.materials {
            summary.materials = Some(materials.len());
            scenario.materials = materials;
        }
        if let Some(operations) = self.operations {
            summary.operations = Some(operations.len());
            scenario.operations = operations;
        }

        summary
    }
}

/// Parse `obj[key]` as a line list; absent or non-array values are ignored
fn parse_lines<T: serde::de::DeserializeOwned>(
    obj: &Map<String, Value>,
    key: &'static str,
    prefix: LinePrefix,
) -> Result<Option<Vec<T>>, ScenarioError> {
    let Some(Value::Array(items)) = obj.get(key) else {
        return Ok(None);
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            T::deserialize(item).map_err(|e| ScenarioError::InvalidLine {
                kind: prefix.noun(),
                position: i + 1,
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<T>, _>>()
        .map(Some)
}

/// Errors reading or writing scenario documents
#[derive(Debug, Error, miette::Diagnostic)]
pub enum ScenarioError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] JsonSyntaxError),

    #[error("{filename}: a scenario file must contain a JSON object")]
    #[diagnostic(code(costsim::scenario::shape))]
    NotAnObject { filename: String },

    #[error("{kind} line #{position} is not a valid record: {reason}")]
    #[diagnostic(code(costsim::scenario::line))]
    InvalidLine {
        kind: &'static str,
        position: usize,
        reason: String,
    },

    #[error("failed to encode scenario: {0}")]
    Encode(#[source] serde_json::Error),
}
