//! JSON error diagnostics for scenario files

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// JSON syntax or shape error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("invalid scenario file: {message}")]
#[diagnostic(code(costsim::json::syntax))]
pub struct JsonSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    /// The underlying error message
    message: String,
}

impl JsonSyntaxError {
    /// Create a diagnostic from a serde_json error
    pub fn from_serde_error(err: &serde_json::Error, source: &str, filename: &str) -> Self {
        let line = err.line().max(1);
        let column = err.column().max(1);

        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Convert a 1-based line/column to a byte offset, clamped to the source
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut current_line = 1;
    let mut line_start = 0;

    if line > 1 {
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                current_line += 1;
                if current_line == line {
                    line_start = i + 1;
                    break;
                }
            }
        }
        if current_line < line {
            return source.len().saturating_sub(1);
        }
    }

    // serde_json columns count bytes, not chars
    let rest = &source[line_start..];
    for (j, c) in rest.char_indices() {
        if j + c.len_utf8() >= column || c == '\n' {
            return line_start + j;
        }
    }
    source.len().saturating_sub(1)
}

/// Generate helpful suggestions based on error message
fn generate_help(message: &str) -> Option<String> {
    let msg = message.to_lowercase();

    if msg.contains("trailing comma") {
        return Some("JSON does not allow a comma after the last item of a list or object.".to_string());
    }

    if msg.contains("eof while parsing") {
        return Some("The file ends early - check for a missing closing '}' or ']'.".to_string());
    }

    if msg.contains("key must be a string") {
        return Some("Object keys must be double-quoted: {\"batchQty\": 100}".to_string());
    }

    if msg.contains("expected value") {
        return Some(
            "Strings need double quotes and numbers use '.' as decimal separator.".to_string(),
        );
    }

    if msg.contains("invalid type") && msg.contains("expected a map") {
        return Some("A scenario file must be a JSON object at the top level.".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 1), 6);
        assert_eq!(line_col_to_offset(source, 3, 2), 13);
        assert_eq!(line_col_to_offset(source, 9, 1), source.len() - 1);
    }

    #[test]
    fn test_help_generation() {
        assert!(generate_help("trailing comma at line 3 column 1").is_some());
        assert!(generate_help("EOF while parsing an object").is_some());
        assert!(generate_help("expected value at line 1 column 2").is_some());
        assert!(generate_help("some random error").is_none());
    }

    #[test]
    fn test_from_serde_error_points_at_location() {
        let source = "{\n  \"batchQty\": 100,\n}";
        let err = serde_json::from_str::<serde_json::Value>(source).unwrap_err();
        let diag = JsonSyntaxError::from_serde_error(&err, source, "bad.json");
        assert!(diag.message().contains("trailing comma"));
        assert!(diag.help.is_some());
        assert!(diag.span.offset() < source.len());
    }

    #[test]
    fn test_offset_after_multibyte_text() {
        let source = "{\"family\": \"Tôlerie\", \"batchQty\": 1x}";
        let err = serde_json::from_str::<serde_json::Value>(source).unwrap_err();
        assert_eq!(err.line(), 1);

        let offset = line_col_to_offset(source, err.line(), err.column());
        assert!(source.is_char_boundary(offset));
        assert_eq!(offset, source.find('x').unwrap());

        let second_line = "{\n\"ô\": 1, \"b\": ?}";
        let col = "\"ô\": 1, \"b\": ?".find('?').unwrap() + 1;
        let offset = line_col_to_offset(second_line, 2, col);
        assert_eq!(&second_line[offset..], "?}");
    }
}
