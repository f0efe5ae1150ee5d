//! Text exposition helpers shared by every instrument.

use std::fmt::Write;

use crate::error::{PulseError, Result};

/// Escape a label value (`\`, `"`, newline).
pub(crate) fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Escape HELP text (`\`, newline). Quotes stay as-is.
pub(crate) fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Render a float the way Prometheus parsers expect it.
pub(crate) fn fmt_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{}", v)
    }
}

pub(crate) fn write_header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(help));
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

/// `{k="v",...}` or the empty string when there are no labels.
pub(crate) fn label_set(names: &[String], values: &[String]) -> String {
    if names.is_empty() {
        return String::new();
    }
    let pairs = names
        .iter()
        .zip(values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{}}}", pairs)
}

/// Metric names: `[a-zA-Z_:][a-zA-Z0-9_:]*`.
pub(crate) fn validate_metric_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let first_ok = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_' || c == ':')
        .unwrap_or(false);
    if !first_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':') {
        return Err(PulseError::InvalidMetric(format!("bad metric name: {name:?}")));
    }
    Ok(())
}

/// Label names: `[a-zA-Z_][a-zA-Z0-9_]*`, `__` prefix reserved.
pub(crate) fn validate_label_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let first_ok = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if !first_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(PulseError::InvalidMetric(format!("bad label name: {name:?}")));
    }
    if name.starts_with("__") {
        return Err(PulseError::InvalidMetric(format!("reserved label name: {name:?}")));
    }
    Ok(())
}
