//! JSON parsing helpers with source-located errors

pub mod diagnostics;

pub use diagnostics::JsonSyntaxError;

use serde::de::DeserializeOwned;

/// Parse JSON text, turning failures into a located diagnostic
pub fn parse_json_str<T: DeserializeOwned>(
    source: &str,
    filename: &str,
) -> Result<T, JsonSyntaxError> {
    serde_json::from_str(source)
        .map_err(|e| JsonSyntaxError::from_serde_error(&e, source, filename))
}
