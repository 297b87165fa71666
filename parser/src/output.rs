//! Output formatting for parse results.

use std::fmt::Write as _;

use crate::result::{ParseResult, ResultKind};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Diagram,
    Table,
}

/// Formats a parse result in the requested output format.
///
/// # Examples
///
/// ```
/// use command_line_core::*;
/// use command_line_parser::{OutputFormat, Parser, format_report};
///
/// let schema = CommandSchema::new("app").with_option(OptionSchema::new(["-x"], ValueType::Int));
/// let tree = SymbolTree::from_schema(&schema).unwrap();
/// let result = Parser::new(&tree).parse(&["-x", "5"]);
///
/// let json = format_report(&result, OutputFormat::Json).unwrap();
/// assert!(json.contains("\"command_path\""));
/// assert_eq!(format_report(&result, OutputFormat::Diagram).unwrap(), "[ app [ -x <5> ] ]");
/// ```
pub fn format_report(result: &ParseResult<'_>, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&result.report())
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => serde_yaml::to_string(&result.report())
            .map_err(|e| format!("YAML serialization failed: {e}")),
        OutputFormat::Diagram => Ok(result.diagram()),
        OutputFormat::Table => Ok(report_to_table(result)),
    }
}

fn report_to_table(result: &ParseResult<'_>) -> String {
    let mut out = String::new();

    let _ = write!(out, "Command: {}", result.command_path().join(" "));
    if result.is_success() {
        out.push_str("  Status: ok\n");
    } else {
        let _ = writeln!(out, "  Status: {} error(s)", result.errors().len());
    }

    let mut rows = Vec::new();
    let mut pending = vec![result.root_result()];
    while let Some(node) = pending.pop() {
        let mut children: Vec<_> = node.children().collect();
        children.reverse();
        pending.extend(children);
        if node.kind() == ResultKind::Command {
            continue;
        }
        let name = match node.kind() {
            ResultKind::Option => node.declaration().display_alias().to_string(),
            _ => format!("<{}>", node.name()),
        };
        let value = match node.value() {
            Some(value) => value.to_string(),
            None => node
                .tokens()
                .iter()
                .map(|t| t.value.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        };
        let note = if node.is_implicit() { "  (default)" } else { "" };
        rows.push((name, value, note));
    }

    if !rows.is_empty() {
        out.push_str("\nValues:\n");
        let width = rows.iter().map(|(n, _, _)| n.len()).max().unwrap_or(4);
        for (name, value, note) in &rows {
            let _ = writeln!(out, "  {name:<width$}  {value}{note}");
        }
    }

    if !result.directives().is_empty() {
        out.push_str("\nDirectives:\n");
        for (name, values) in result.directives() {
            let _ = writeln!(out, "  [{name}] {}", values.join(", "));
        }
    }

    if !result.unmatched().is_empty() {
        let _ = writeln!(out, "\nUnmatched: {}", result.unmatched_tokens().join(" "));
    }

    if !result.errors().is_empty() {
        out.push_str("\nErrors:\n");
        for error in result.errors() {
            let _ = writeln!(out, "  - {}", error.message);
        }
    }

    out
}
