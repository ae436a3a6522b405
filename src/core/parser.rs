//! Best-effort extraction of shipping attributes from free-form model text.
//!
//! The text model is asked for JSON but is only weakly steerable, so a reply
//! is first read as a JSON object and, when that yields nothing, scanned line
//! by line for the keywords `dimensions`, `perishable` and `explosive`.
//! Neither path ever fails: anything not found stays `"Not provided"`.

use crate::domain::model::{EnrichedAttributes, Flag};
use serde_json::Value;

pub fn parse_attributes(output: &str) -> EnrichedAttributes {
    match parse_structured(output) {
        Some(attributes) => attributes,
        None => {
            tracing::debug!("Model reply is not usable JSON, falling back to line scan");
            scan_lines(output)
        }
    }
}

/// Reads the outermost `{ ... }` span as a JSON object. Returns `None`
/// unless at least one attribute was recognized.
pub fn parse_structured(output: &str) -> Option<EnrichedAttributes> {
    let start = output.find('{')?;
    let end = output.rfind('}')?;
    if end <= start {
        return None;
    }

    let value: Value = serde_json::from_str(&output[start..=end]).ok()?;
    let object = value.as_object()?;

    let mut attributes = EnrichedAttributes::default();
    let mut found = false;

    for (key, value) in object {
        let key = key.to_lowercase();
        if key.contains("dimensions") {
            if let Some(dimensions) = dimensions_from_value(value) {
                attributes.dimensions = dimensions;
                found = true;
            }
        } else if key.contains("perishable") {
            if let Some(flag) = flag_from_value(value) {
                attributes.perishable = flag;
                found = true;
            }
        } else if key.contains("explosive") {
            if let Some(flag) = flag_from_value(value) {
                attributes.explosive = flag;
                found = true;
            }
        }
    }

    found.then_some(attributes)
}

/// Line scanner kept bit-for-bit compatible with existing consumers.
///
/// A line is matched against the keywords in the order dimensions,
/// perishable, explosive, and only the first match counts. Flags only test
/// whether `true` appears anywhere in the line, so negations are not
/// understood. Later lines overwrite earlier ones.
pub fn scan_lines(output: &str) -> EnrichedAttributes {
    let mut attributes = EnrichedAttributes::default();

    for line in output.split('\n') {
        let lower = line.to_lowercase();

        if lower.contains("dimensions") {
            // A dimensions line without a value separator carries nothing
            if let Some((_, value)) = line.split_once(':') {
                attributes.dimensions = value.trim().trim_matches(',').to_string();
            }
        } else if lower.contains("perishable") {
            attributes.perishable = Flag::from(lower.contains("true"));
        } else if lower.contains("explosive") {
            attributes.explosive = Flag::from(lower.contains("true"));
        }
    }

    attributes
}

fn dimensions_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let cleaned = s.trim().trim_matches(',').trim();
            (!cleaned.is_empty()).then(|| cleaned.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            (!parts.is_empty()).then(|| parts.join(" x "))
        }
        Value::Object(fields) => {
            let lookup = |wanted: &str| {
                fields
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(wanted))
                    .and_then(|(_, v)| scalar_text(v))
            };
            let width = lookup("width")?;
            let height = lookup("height")?;
            let length = lookup("length")?;
            Some(format!("{} x {} x {}", width, height, length))
        }
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn flag_from_value(value: &Value) -> Option<Flag> {
    match value {
        Value::Bool(b) => Some(Flag::from(*b)),
        Value::String(s) => Some(Flag::from(s.to_lowercase().contains("true"))),
        _ => None,
    }
}
