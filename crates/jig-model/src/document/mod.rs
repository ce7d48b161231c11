//! Comment-preserving YAML documents
//!
//! A [`Document`] keeps the text it was parsed from. Merging an overlay
//! value only re-renders the nodes the overlay actually changes; every
//! other line, comments included, is written back as it was read.
//!
//! Documents whose root is not a plain block mapping (flow style, anchors
//! and aliases, complex keys) are still accepted but lose their layout
//! when rendered.

mod block;
mod path;
mod value;

use serde_yaml::Value;
use tracing::debug;

use jig_core::DocumentError;

use self::block::BlockMapping;
pub use self::path::{Segment, YamlPath};
use self::value::{deep_merge, kind_name};

#[derive(Debug, Clone)]
enum Root {
    Block(BlockMapping),
    Value(Value),
}

/// A parsed YAML document that remembers its source text
#[derive(Debug, Clone)]
pub struct Document {
    root: Root,
    /// `"\r\n"` when the source used CRLF line endings
    line_ending: &'static str,
    final_newline: bool,
}

impl Document {
    /// Parse YAML text; blank or comment-only text is an empty document
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let value: Value = if text.lines().all(block::is_trivia) {
            Value::Null
        } else {
            serde_yaml::from_str(text).map_err(DocumentError::Malformed)?
        };

        let root = match &value {
            Value::Null | Value::Mapping(_) => match split_root(text, &value) {
                Some(mapping) => Root::Block(mapping),
                None => {
                    debug!("document layout not preserved");
                    Root::Value(value)
                }
            },
            _ => Root::Value(value),
        };

        Ok(Self {
            root,
            line_ending: if text.contains("\r\n") { "\r\n" } else { "\n" },
            final_newline: text.is_empty() || text.ends_with('\n'),
        })
    }

    /// Whether the document holds no value at all
    pub fn is_empty(&self) -> bool {
        match &self.root {
            Root::Block(mapping) => mapping.entries.is_empty(),
            Root::Value(value) => value.is_null(),
        }
    }

    /// Remove a top-level key; returns whether it was present
    pub fn remove(&mut self, key: &str) -> bool {
        match &mut self.root {
            Root::Block(mapping) => mapping.remove(key),
            Root::Value(Value::Mapping(mapping)) => mapping.remove(key).is_some(),
            Root::Value(_) => false,
        }
    }

    /// Merge `overlay` into the document.
    ///
    /// Mappings merge recursively; keys only present in the overlay are
    /// appended after the existing ones, in overlay order. Sequences and
    /// scalars from the overlay replace the original node. A mapping
    /// overlaid on a sequence or scalar is a [`DocumentError::KindMismatch`].
    pub fn merge(&mut self, overlay: Value) -> Result<(), DocumentError> {
        match (&mut self.root, overlay) {
            (_, Value::Null) => Ok(()),
            (Root::Block(mapping), Value::Mapping(overlay)) => mapping.merge(overlay, "$"),
            (Root::Value(value), overlay @ Value::Mapping(_)) => deep_merge(value, overlay, "$"),
            (Root::Value(value), overlay) if !value.is_mapping() => {
                *value = overlay;
                Ok(())
            }
            (_, overlay) => Err(DocumentError::KindMismatch {
                path: "$".to_string(),
                original: "mapping",
                overlay: kind_name(&overlay),
            }),
        }
    }

    /// Render the document back to text.
    ///
    /// Line endings and the presence of a final newline follow the parsed
    /// source; an empty source renders with LF and a final newline.
    pub fn render(&self) -> Result<String, DocumentError> {
        let lines: Vec<String> = match &self.root {
            Root::Block(mapping) => {
                let mut lines = Vec::new();
                mapping.render(&mut lines)?;
                lines
            }
            Root::Value(Value::Null) => Vec::new(),
            Root::Value(value) => serde_yaml::to_string(value)
                .map_err(DocumentError::Render)?
                .lines()
                .map(String::from)
                .collect(),
        };

        if lines.is_empty() {
            return Ok(String::new());
        }
        let mut text = lines.join(self.line_ending);
        if self.final_newline {
            text.push_str(self.line_ending);
        }
        Ok(text)
    }
}

/// Merge `overlay` into `original`, consuming both
pub fn merge(mut original: Document, overlay: Value) -> Result<Document, DocumentError> {
    original.merge(overlay)?;
    Ok(original)
}

fn split_root(text: &str, value: &Value) -> Option<BlockMapping> {
    let lines: Vec<String> = text.lines().map(String::from).collect();
    let indent = lines
        .iter()
        .find(|line| !block::is_trivia(line))
        .map(|line| block::indent_of(line))
        .unwrap_or(0);

    let mapping = BlockMapping::split(lines, indent)?;
    let parsed = mapping.source_mapping();
    let matches = match value {
        Value::Null => parsed.is_empty(),
        Value::Mapping(expected) => parsed == *expected,
        _ => false,
    };
    matches.then_some(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn merged(original: &str, overlay: &str) -> String {
        let document = Document::parse(original).unwrap();
        merge(document, yaml(overlay)).unwrap().render().unwrap()
    }

    #[test]
    fn test_merge_nested_mapping() {
        let out = merged("a:\n  x: 0\n  y: 2\nb: 3\n", "a:\n  x: 1\n");
        assert_eq!(out, "a:\n  x: 1\n  y: 2\nb: 3\n");
    }

    #[test]
    fn test_merge_keeps_original_key_order() {
        let out = merged(
            "key2: v2\nkey3: v3\nkey4: v4\n",
            "key1: v1\nkey2: v2-overwritten\nkey4: v4-overwritten\n",
        );
        assert_eq!(out, "key2: v2-overwritten\nkey3: v3\nkey4: v4-overwritten\nkey1: v1\n");
    }

    #[test]
    fn test_merge_preserves_comments() {
        let original = "\
# header comment
services:   # inline
  - label: a   # keep me
# about other
other: 1
";
        let out = merged(original, "other: 2\ngeneratedValues:\n  features: {}\n");
        assert_eq!(
            out,
            "\
# header comment
services:   # inline
  - label: a   # keep me
# about other
other: 2
generatedValues:
  features: {}
"
        );
    }

    #[test]
    fn test_merge_appends_with_original_indent() {
        let out = merged("a:\n    x: 1\n    y: 2\nb: 3\n", "a:\n  z: 9\n");
        assert_eq!(out, "a:\n    x: 1\n    y: 2\n    z: 9\nb: 3\n");
    }

    #[test]
    fn test_merge_keeps_compact_sequence_layout() {
        let original = "# header\ntitle: x   # keep\nservices:\n- label: a\n  version: 1.0.0\n";
        assert_eq!(merged(original, "title: x\n"), original);

        let out = merged(original, "title: y\n");
        assert_eq!(out, "# header\ntitle: y\nservices:\n- label: a\n  version: 1.0.0\n");
    }

    #[test]
    fn test_render_keeps_line_endings() {
        assert_eq!(merged("a: 1\r\nb: 2\r\n", "a: 1\n"), "a: 1\r\nb: 2\r\n");
        assert_eq!(merged("# c\r\na: 1\r\n", "b: 2\n"), "# c\r\na: 1\r\nb: 2\r\n");
        assert_eq!(merged("a: 1\nb: 2", "a: 1\n"), "a: 1\nb: 2");
        assert_eq!(merged("a: 1", "b: 2\n"), "a: 1\nb: 2");

        // fallback rendering follows the source too
        let out = merged("base: &b\r\n  x: 1\r\ncopy: *b", "extra: 2\n");
        assert!(out.contains("\r\n"));
        assert!(!out.ends_with('\n'));
        assert!(!out.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_merge_replaces_sequences() {
        let out = merged("list:\n  - a\n  - b\nafter: 1\n", "list: [c]\n");
        assert_eq!(out, "list:\n  - c\nafter: 1\n");
    }

    #[test]
    fn test_equal_scalar_keeps_formatting() {
        let out = merged("a: 'x'   # note\n", "a: x\n");
        assert_eq!(out, "a: 'x'   # note\n");
    }

    #[test]
    fn test_merge_into_flow_mapping() {
        let out = merged("a: {x: 0, y: 2}\n", "a:\n  x: 1\n");
        assert_eq!(out, "a:\n  x: 1\n  y: 2\n");
    }

    #[test]
    fn test_merge_into_null_value() {
        let out = merged("a:\nb: 1\n", "a:\n  x: 1\n");
        assert_eq!(out, "a:\n  x: 1\nb: 1\n");
    }

    #[test]
    fn test_merge_into_empty_document() {
        assert!(Document::parse("").unwrap().is_empty());
        assert!(Document::parse("# only a comment\n").unwrap().is_empty());
        assert!(!Document::parse("a: 1\n").unwrap().is_empty());
        assert_eq!(merged("", "a: 1\n"), "a: 1\n");
        assert_eq!(merged("# only a comment\n", "a: 1\n"), "# only a comment\na: 1\n");
    }

    #[test]
    fn test_kind_mismatch() {
        let document = Document::parse("a:\n  - 1\n").unwrap();
        let err = merge(document, yaml("a:\n  x: 1\n")).unwrap_err();
        assert!(matches!(err, DocumentError::KindMismatch { ref path, .. } if path == "$.a"));

        let document = Document::parse("a:\n  b: text\n").unwrap();
        let err = merge(document, yaml("a:\n  b:\n    c: 1\n")).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::KindMismatch { ref path, original: "scalar", overlay: "mapping" } if path == "$.a.b"
        ));
    }

    #[test]
    fn test_non_mapping_root() {
        let mut document = Document::parse("- 1\n- 2\n").unwrap();
        assert!(document.merge(yaml("a: 1\n")).is_err());
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            Document::parse("a: [1, 2\n"),
            Err(DocumentError::Malformed(_))
        ));
    }

    #[test]
    fn test_remove_then_merge_is_idempotent() {
        let original = "\
# model
services:
  - label: svc
    gitRepoID: \"1\"
generatedValues:
  stale: true
";
        let overlay = yaml(
            "\
services:
  - label: svc
    gitRepoID: \"1\"
generatedValues:
  features:
    svc:
      - issueKey: A-1
  gitRepos: []
",
        );

        let run = |text: &str| {
            let mut document = Document::parse(text).unwrap();
            document.remove("generatedValues");
            document.merge(overlay.clone()).unwrap();
            document.render().unwrap()
        };

        let first = run(original);
        let second = run(&first);
        assert_eq!(first, second);
        assert!(first.starts_with("# model\nservices:\n  - label: svc\n    gitRepoID: \"1\"\n"));
        assert!(!first.contains("stale"));
        assert!(first.contains("issueKey: A-1"));
    }

    #[test]
    fn test_anchors_fall_back_to_plain_rendering() {
        let mut document = Document::parse("base: &b\n  x: 1\ncopy: *b\n").unwrap();
        document.merge(yaml("extra: 2\n")).unwrap();
        let out: Value = serde_yaml::from_str(&document.render().unwrap()).unwrap();
        assert_eq!(out, yaml("base:\n  x: 1\ncopy:\n  x: 1\nextra: 2\n"));
    }
}
