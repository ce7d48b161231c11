//! Plain-value helpers shared by the block tree

use serde_yaml::{Mapping, Value};

use jig_core::DocumentError;

/// Human readable node kind for error messages
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) | Value::Number(_) | Value::String(_) => "scalar",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Mapping keys are compared by their scalar text
pub(crate) fn key_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Merge `overlay` into `original` on plain values.
///
/// Used where the original node has no block layout to preserve (flow
/// collections, freshly rendered values).
pub(crate) fn deep_merge(original: &mut Value, overlay: Value, path: &str) -> Result<(), DocumentError> {
    match overlay {
        Value::Mapping(overlay) => match original {
            Value::Mapping(target) => merge_mappings(target, overlay, path),
            Value::Null => {
                *original = Value::Mapping(overlay);
                Ok(())
            }
            other => Err(DocumentError::KindMismatch {
                path: path.to_string(),
                original: kind_name(other),
                overlay: "mapping",
            }),
        },
        other => {
            *original = other;
            Ok(())
        }
    }
}

fn merge_mappings(target: &mut Mapping, overlay: Mapping, path: &str) -> Result<(), DocumentError> {
    for (key, value) in overlay {
        let child_path = format!("{}.{}", path, key_string(&key).unwrap_or_default());
        match target.get_mut(&key) {
            Some(existing) => deep_merge(existing, value, &child_path)?,
            None => {
                target.insert(key, value);
            }
        }
    }
    Ok(())
}

/// Render `key: value` at `indent`, one string per line.
///
/// Non-empty collections go on the following lines, indented two more
/// spaces; everything else stays on the key line.
pub(crate) fn render_entry(key: &str, value: &Value, indent: usize) -> Result<Vec<String>, DocumentError> {
    let pad = " ".repeat(indent);
    let key_text = render_key(key)?;
    let text = serde_yaml::to_string(value).map_err(DocumentError::Render)?;
    let body = text.trim_end_matches('\n');

    let mut lines = Vec::new();
    let is_block = match value {
        Value::Mapping(m) => !m.is_empty(),
        Value::Sequence(s) => !s.is_empty(),
        _ => false,
    };

    if is_block {
        lines.push(format!("{}{}:", pad, key_text));
        let child_pad = " ".repeat(indent + 2);
        lines.extend(body.split('\n').map(|line| prefixed(&child_pad, line)));
    } else {
        let mut body_lines = body.split('\n');
        let first = body_lines.next().unwrap_or_default();
        lines.push(format!("{}{}: {}", pad, key_text, first));
        lines.extend(body_lines.map(|line| prefixed(&pad, line)));
    }

    Ok(lines)
}

fn prefixed(pad: &str, line: &str) -> String {
    if line.is_empty() {
        String::new()
    } else {
        format!("{}{}", pad, line)
    }
}

fn render_key(key: &str) -> Result<String, DocumentError> {
    let text = serde_yaml::to_string(&Value::String(key.to_string())).map_err(DocumentError::Render)?;
    let text = text.trim_end_matches('\n');
    if text.contains('\n') {
        // multi-line keys only fit on one line as a double-quoted scalar
        return Ok(format!("{:?}", key));
    }
    Ok(text.to_string())
}
