//! Output formatting for the `feedback` binary.
//!
//! Provides text, JSON, and pretty output formats for CLI output.

use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON format - machine-readable output
    Json,
    /// Plain text format - one record per line
    #[default]
    Text,
    /// Pretty format - one field per line, records separated by blank lines
    Pretty,
}

/// Formatter that can output data in text, JSON, or pretty format
#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    #[must_use]
    pub const fn output_format(&self) -> OutputFormat {
        self.format
    }

    /// Format data according to the configured output format
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&value)?,
            OutputFormat::Text => render_text(&value),
            OutputFormat::Pretty => render_pretty(&value),
        })
    }

    /// Format and print data to stdout
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn print<T: Serialize>(&self, data: &T) -> Result<()> {
        let output = self.format(data)?;
        write_line(&output)
    }

    /// Format and print a list with a custom empty message
    ///
    /// For JSON, wraps the array in a named object together with `extra`
    /// fields. Other formats print the list, then `footer` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn print_list<T: Serialize>(
        &self,
        data: &[T],
        empty_message: &str,
        collection_name: &str,
        extra: &[(&str, Value)],
        footer: Option<&str>,
    ) -> Result<()> {
        if self.format == OutputFormat::Json {
            let mut envelope = serde_json::Map::new();
            envelope.insert(collection_name.to_string(), serde_json::to_value(data)?);
            envelope.insert("count".to_string(), serde_json::json!(data.len()));
            for (key, value) in extra {
                envelope.insert((*key).to_string(), value.clone());
            }
            return self.print(&Value::Object(envelope));
        }

        if data.is_empty() {
            write_line(empty_message)?;
        } else {
            self.print(&data)?;
        }
        if let Some(footer) = footer {
            write_line(footer)?;
        }
        Ok(())
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

/// Print preformatted text to stdout
///
/// # Errors
///
/// Returns an error if writing fails
pub fn write_line(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}")?;
    Ok(())
}

/// Render a JSON value as concise text
fn render_text(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            // Put the id first
            let mut parts = Vec::new();
            if let Some(id) = map.get("id").filter(|id| !id.is_null()) {
                parts.push(render_field_value(id));
            }

            for (key, val) in map {
                if key == "id" || is_blank(val) {
                    continue;
                }
                parts.push(format!("{}:{}", key, render_field_value(val)));
            }
            parts.join("  ")
        }
        Value::Array(arr) => arr.iter().map(render_text).collect::<Vec<_>>().join("\n"),
        _ => render_field_value(value),
    }
}

/// Render a JSON value with one `key: value` line per field
fn render_pretty(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let fields: Vec<_> = map.iter().filter(|(_, val)| !is_blank(val)).collect();
            let width = fields.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
            fields
                .into_iter()
                .map(|(key, val)| {
                    let rendered = match val {
                        Value::String(s) => s.clone(),
                        other => render_field_value(other),
                    };
                    format!("{key:>width$}: {rendered}")
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Value::Array(arr) => arr
            .iter()
            .map(render_pretty)
            .collect::<Vec<_>>()
            .join("\n\n"),
        _ => render_field_value(value),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(arr) => arr.is_empty(),
        _ => false,
    }
}

/// Render a single field value as concise text
fn render_field_value(value: &Value) -> String {
    match value {
        Value::String(s) => {
            if s.contains(' ') || s.contains('\n') {
                format!("\"{}\"", s.replace('\n', "\\n"))
            } else {
                s.clone()
            }
        }
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(render_field_value).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| format!("{}:{}", k, render_field_value(v)))
                .collect();
            format!("{{{}}}", parts.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Serialize)]
    struct Row {
        rating: u8,
        id: String,
        review: String,
        actions: Vec<String>,
        summary: Option<String>,
    }

    fn sample_row() -> Row {
        Row {
            rating: 4,
            id: "12".to_string(),
            review: "Arrived late but tasty".to_string(),
            actions: vec![],
            summary: None,
        }
    }

    #[test]
    fn test_json_format() {
        let output = Formatter::new(OutputFormat::Json)
            .format(&sample_row())
            .unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["id"], "12");
        assert_eq!(parsed["rating"], 4);
        assert!(parsed["summary"].is_null());
    }

    #[test]
    fn test_text_format_puts_id_first_and_skips_blanks() {
        let output = Formatter::new(OutputFormat::Text)
            .format(&sample_row())
            .unwrap();
        assert_eq!(output, "12  rating:4  review:\"Arrived late but tasty\"");
    }

    #[test]
    fn test_text_format_list_is_one_line_per_item() {
        let rows = vec![sample_row(), sample_row()];
        let output = Formatter::new(OutputFormat::Text).format(&rows).unwrap();
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_pretty_format_aligns_keys() {
        let output = Formatter::new(OutputFormat::Pretty)
            .format(&sample_row())
            .unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "    id: 12",
                "rating: 4",
                "review: Arrived late but tasty",
            ]
        );
    }

    #[test]
    fn test_pretty_format_separates_records() {
        let rows = vec![sample_row(), sample_row()];
        let output = Formatter::new(OutputFormat::Pretty).format(&rows).unwrap();
        assert_eq!(output.matches("\n\n").count(), 1);
    }

    #[test]
    fn test_nested_object_renders_inline() {
        let value = serde_json::json!({ "ratings": { "1": 0, "5": 3 } });
        assert_eq!(render_text(&value), "ratings:{1:0,5:3}");
    }
}
