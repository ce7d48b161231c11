//! Minimal YAML path expressions
//!
//! Supports `$`, `.key`, `['key']` / `["key"]` and `[index]`. A path that
//! does not start with `$` is read relative to the root, so `version` and
//! `$.version` are the same.

use std::fmt;
use std::str::FromStr;

use serde_yaml::Value;

use jig_core::DocumentError;

use super::value::{key_string, kind_name};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlPath {
    source: String,
    segments: Vec<Segment>,
}

impl YamlPath {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Node selected by the path, if any
    pub fn find<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments.iter().try_fold(root, |node, segment| match (segment, node) {
            (Segment::Key(key), Value::Mapping(mapping)) => mapping
                .iter()
                .find(|(k, _)| key_string(k).as_deref() == Some(key.as_str()))
                .map(|(_, v)| v),
            (Segment::Index(index), Value::Sequence(items)) => items.get(*index),
            _ => None,
        })
    }

    /// Scalar selected by the path, as text
    pub fn find_scalar(&self, root: &Value) -> Result<String, DocumentError> {
        let node = self
            .find(root)
            .ok_or_else(|| DocumentError::PathNotFound(self.source.clone()))?;

        match node {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Null => Ok(String::new()),
            other => Err(self.invalid(format!("selects a {}, not a scalar", kind_name(other)))),
        }
    }

    fn invalid(&self, message: impl Into<String>) -> DocumentError {
        invalid(&self.source, message)
    }
}

fn invalid(path: &str, message: impl Into<String>) -> DocumentError {
    DocumentError::InvalidPath {
        path: path.to_string(),
        message: message.into(),
    }
}

impl FromStr for YamlPath {
    type Err = DocumentError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let trimmed = source.trim();
        let relative = match trimmed.strip_prefix('$') {
            Some(rest) => rest.to_string(),
            None if trimmed.starts_with(['.', '[']) => trimmed.to_string(),
            None => format!(".{}", trimmed),
        };

        let mut segments = Vec::new();
        let mut rest = relative.as_str();
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('.') {
                let end = after.find(['.', '[']).unwrap_or(after.len());
                let key = &after[..end];
                if key.is_empty() {
                    return Err(invalid(source, "empty key"));
                }
                segments.push(Segment::Key(key.to_string()));
                rest = &after[end..];
            } else if let Some(after) = rest.strip_prefix('[') {
                let end = after
                    .find(']')
                    .ok_or_else(|| invalid(source, "unclosed bracket"))?;
                segments.push(bracket_segment(source, after[..end].trim())?);
                rest = &after[end + 1..];
            } else {
                return Err(invalid(source, format!("unexpected '{}'", rest)));
            }
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }
}

fn bracket_segment(source: &str, inner: &str) -> Result<Segment, DocumentError> {
    for quote in ['\'', '"'] {
        if inner.len() >= 2 && inner.starts_with(quote) && inner.ends_with(quote) {
            return Ok(Segment::Key(inner[1..inner.len() - 1].to_string()));
        }
    }
    inner
        .parse::<usize>()
        .map(Segment::Index)
        .map_err(|_| invalid(source, format!("'{}' is neither an index nor a quoted key", inner)))
}

impl fmt::Display for YamlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Value {
        serde_yaml::from_str(
            "version: 1.4.0\nimage:\n  tag: '2.0.1'\n  list:\n    - a\n    - name: b\nnum: 7\nmap:\n  x: 1\n",
        )
        .unwrap()
    }

    fn find(path: &str) -> Result<String, DocumentError> {
        path.parse::<YamlPath>()?.find_scalar(&doc())
    }

    #[test]
    fn test_parse_segments() {
        let path: YamlPath = "$.image['list'][1].name".parse().unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("image".to_string()),
                Segment::Key("list".to_string()),
                Segment::Index(1),
                Segment::Key("name".to_string()),
            ]
        );
        assert_eq!(path.to_string(), "$.image['list'][1].name");
    }

    #[test]
    fn test_find_values() {
        assert_eq!(find("version").unwrap(), "1.4.0");
        assert_eq!(find("$.version").unwrap(), "1.4.0");
        assert_eq!(find("$.image.tag").unwrap(), "2.0.1");
        assert_eq!(find("$[\"image\"].list[0]").unwrap(), "a");
        assert_eq!(find("$.image.list[1].name").unwrap(), "b");
        assert_eq!(find("num").unwrap(), "7");
    }

    #[test]
    fn test_root_selects_mapping() {
        assert!(matches!(find("$"), Err(DocumentError::InvalidPath { .. })));
        assert!(matches!(find("$.map"), Err(DocumentError::InvalidPath { .. })));
    }

    #[test]
    fn test_missing_path() {
        assert!(matches!(find("$.nope"), Err(DocumentError::PathNotFound(_))));
        assert!(matches!(find("$.image.list[5]"), Err(DocumentError::PathNotFound(_))));
        assert!(matches!(find("$.version.x"), Err(DocumentError::PathNotFound(_))));
    }

    #[test]
    fn test_invalid_syntax() {
        assert!("$..a".parse::<YamlPath>().is_err());
        assert!("$.a[".parse::<YamlPath>().is_err());
        assert!("$.a[x]".parse::<YamlPath>().is_err());
        assert!("$a".parse::<YamlPath>().is_err());
    }
}
