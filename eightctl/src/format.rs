//! Output formatting utilities for the CLI
//!
//! Renders ordered columns and rows of named values as a table or JSON.

use anyhow::Result;
use colored::*;
use eight_core::{EightError, OutputRow};
use serde_json::Value;
use std::io::Write;
use tabled::{builder::Builder, settings::Style};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    /// Map a configuration string to a format (case-insensitive)
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow::anyhow!(
                "Invalid output format '{}'. Must be 'table' or 'json'",
                name
            )),
        }
    }
}

/// Project each row down to the requested fields, preserving row order.
///
/// An empty request returns the rows unchanged.
pub fn filter_fields(rows: Vec<OutputRow>, requested: &[String]) -> Vec<OutputRow> {
    if requested.is_empty() {
        return rows;
    }

    rows.into_iter()
        .map(|mut row| {
            requested
                .iter()
                .filter_map(|field| row.remove(field).map(|value| (field.clone(), value)))
                .collect()
        })
        .collect()
}

/// Columns to render: the requested ones that exist, in requested order,
/// or all of `columns` when nothing was requested.
pub fn select_columns(columns: &[&str], requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        return columns.iter().map(|c| c.to_string()).collect();
    }

    let mut selected: Vec<String> = Vec::new();
    for field in requested {
        if columns.contains(&field.as_str()) && !selected.contains(field) {
            selected.push(field.clone());
        }
    }
    selected
}

/// Render rows in the given column order
pub fn render(format: OutputFormat, columns: &[String], rows: &[OutputRow]) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let ordered: Vec<Value> = rows
                .iter()
                .map(|row| {
                    Value::Object(
                        columns
                            .iter()
                            .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                            .collect(),
                    )
                })
                .collect();
            serde_json::to_string_pretty(&ordered)
                .map_err(|e| EightError::Render(e.to_string()).into())
        }
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(columns.iter().cloned());
            for row in rows {
                builder.push_record(
                    columns
                        .iter()
                        .map(|c| row.get(c).map(format_cell).unwrap_or_default()),
                );
            }

            let mut table = builder.build();
            table.with(Style::rounded());
            Ok(table.to_string())
        }
    }
}

/// Render and write rows, followed by a newline
pub fn print(
    out: &mut dyn Write,
    format: OutputFormat,
    columns: &[String],
    rows: &[OutputRow],
) -> Result<()> {
    let rendered = render(format, columns, rows)?;
    writeln!(out, "{}", rendered).map_err(EightError::from)?;
    Ok(())
}

/// Flatten one value into a table cell
fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) if items.iter().all(is_scalar) => items
            .iter()
            .map(format_cell)
            .collect::<Vec<_>>()
            .join(","),
        _ => value.to_string(),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}
