//! Line-level view of a block mapping
//!
//! A block mapping is split into entries, each owning the raw lines it was
//! read from. Untouched entries render their original lines verbatim, so
//! comments, quoting and spacing survive a merge. Lines that are neither
//! blank nor comments are only ever attributed to an entry after the entry
//! text has been re-parsed and checked against the full parse.

use serde_yaml::{Mapping, Value};

use jig_core::DocumentError;

use super::value::{deep_merge, key_string, kind_name, render_entry};

/// Blank lines, comments, document markers and directives
pub(crate) fn is_trivia(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with('%')
        || trimmed == "---"
        || trimmed == "..."
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

pub(crate) fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn dedent(line: &str, indent: usize) -> &str {
    if line.len() >= indent && line.as_bytes()[..indent].iter().all(|b| *b == b' ') {
        &line[indent..]
    } else {
        line.trim_start()
    }
}

/// What an entry renders as
#[derive(Debug, Clone)]
pub(crate) enum Body {
    /// Original lines, with the value they parse to
    Raw { lines: Vec<String>, value: Value },
    /// Original key line over a nested block mapping
    Nested { key_line: String, mapping: BlockMapping },
    /// Value rendered fresh on output
    Rendered(Value),
}

/// One `key: value` pair of a block mapping
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub key: String,
    /// Key as parsed, used to check the split against the full parse
    source_key: Value,
    pub body: Body,
    /// Blank and comment lines following the entry's content
    pub trailing: Vec<String>,
}

impl Entry {
    pub fn rendered(key: String, value: Value) -> Self {
        Self {
            source_key: Value::String(key.clone()),
            key,
            body: Body::Rendered(value),
            trailing: Vec::new(),
        }
    }

    fn raw(lines: Vec<String>, indent: usize) -> Option<Self> {
        let text: Vec<&str> = lines.iter().map(|line| dedent(line, indent)).collect();
        let Value::Mapping(mapping) = serde_yaml::from_str::<Value>(&text.join("\n")).ok()? else {
            return None;
        };
        if mapping.len() != 1 {
            return None;
        }
        let (source_key, value) = mapping.into_iter().next()?;
        Some(Self {
            key: key_string(&source_key)?,
            source_key,
            body: Body::Raw { lines, value },
            trailing: Vec::new(),
        })
    }

    fn value(&self) -> Value {
        match &self.body {
            Body::Raw { value, .. } | Body::Rendered(value) => value.clone(),
            Body::Nested { mapping, .. } => Value::Mapping(mapping.source_mapping()),
        }
    }

    /// Merge an overlay value into this entry.
    ///
    /// Mappings merge key by key, keeping the original layout where the
    /// nested block can be split; anything else replaces the value unless
    /// it is equal to what is already there.
    pub fn merge(&mut self, overlay: Value, path: &str) -> Result<(), DocumentError> {
        let overlay = match overlay {
            Value::Mapping(overlay) => overlay,
            other => {
                if !matches!(&self.body, Body::Raw { value, .. } if *value == other) {
                    self.body = Body::Rendered(other);
                }
                return Ok(());
            }
        };

        if let Body::Raw { lines, value } = &self.body {
            self.body = open_raw(lines, value, path)?;
        }

        match &mut self.body {
            Body::Nested { mapping, .. } => mapping.merge(overlay, path),
            Body::Rendered(value) | Body::Raw { value, .. } => {
                deep_merge(value, Value::Mapping(overlay), path)
            }
        }
    }

    fn render(&self, indent: usize, out: &mut Vec<String>) -> Result<(), DocumentError> {
        match &self.body {
            Body::Raw { lines, .. } => out.extend(lines.iter().cloned()),
            Body::Nested { key_line, mapping } => {
                out.push(key_line.clone());
                mapping.render(out)?;
            }
            Body::Rendered(value) => out.extend(render_entry(&self.key, value, indent)?),
        }
        out.extend(self.trailing.iter().cloned());
        Ok(())
    }
}

/// Prepare a raw entry for a mapping overlay
fn open_raw(lines: &[String], value: &Value, path: &str) -> Result<Body, DocumentError> {
    match value {
        Value::Mapping(_) => Ok(match nest(lines, value) {
            Some((key_line, mapping)) => Body::Nested { key_line, mapping },
            None => Body::Rendered(value.clone()),
        }),
        Value::Null => Ok(Body::Rendered(Value::Null)),
        other => Err(DocumentError::KindMismatch {
            path: path.to_string(),
            original: kind_name(other),
            overlay: "mapping",
        }),
    }
}

/// Split the lines under a key line into a nested block mapping, if they
/// form one that parses to exactly `value`
fn nest(lines: &[String], value: &Value) -> Option<(String, BlockMapping)> {
    let (key_line, children) = lines.split_first()?;
    let parent_indent = indent_of(key_line);
    let child_indent = children
        .iter()
        .find(|line| !is_trivia(line))
        .map(|line| indent_of(line))?;
    if child_indent <= parent_indent {
        return None;
    }

    let mapping = BlockMapping::split(children.to_vec(), child_indent)?;
    if Value::Mapping(mapping.source_mapping()) != *value {
        return None;
    }
    Some((key_line.clone(), mapping))
}

/// Entries of one block mapping, all at the same indentation
#[derive(Debug, Clone)]
pub(crate) struct BlockMapping {
    indent: usize,
    /// Trivia before the first entry
    head: Vec<String>,
    pub entries: Vec<Entry>,
}

impl BlockMapping {
    /// Split `lines` into entries starting at column `indent`.
    ///
    /// Sequence items at the mapping's own column belong to the entry
    /// above them. Returns `None` when the lines do not look like a plain
    /// block mapping (a sequence or flow collection at the root, complex
    /// keys, content left of the mapping) or an entry fails to parse on
    /// its own.
    pub fn split(lines: Vec<String>, indent: usize) -> Option<Self> {
        let mut head = Vec::new();
        let mut entries = Vec::new();
        let mut current: Option<Vec<String>> = None;

        for line in lines {
            if is_trivia(&line) {
                match current.as_mut() {
                    Some(buffer) => buffer.push(line),
                    None => head.push(line),
                }
                continue;
            }

            let line_indent = indent_of(&line);
            if line_indent < indent {
                return None;
            }
            if line_indent == indent {
                let rest = &line[indent..];
                // compact sequence under the open entry's key
                if rest == "-" || rest.starts_with("- ") {
                    current.as_mut()?.push(line);
                    continue;
                }
                if rest.starts_with(['-', '?', '[', '{', '\t']) {
                    return None;
                }
                if let Some(buffer) = current.take() {
                    entries.push(Self::finish_entry(buffer, indent)?);
                }
                current = Some(vec![line]);
                continue;
            }

            current.as_mut()?.push(line);
        }

        if let Some(buffer) = current.take() {
            entries.push(Self::finish_entry(buffer, indent)?);
        }

        Some(Self { indent, head, entries })
    }

    fn finish_entry(mut lines: Vec<String>, indent: usize) -> Option<Entry> {
        let mut trailing = Vec::new();
        while let Some(last) = lines.last() {
            let belongs_after = last.trim().is_empty() || (is_comment(last) && indent_of(last) <= indent);
            if lines.len() == 1 || !belongs_after {
                break;
            }
            if let Some(line) = lines.pop() {
                trailing.push(line);
            }
        }
        trailing.reverse();

        let mut entry = Entry::raw(lines, indent)?;
        entry.trailing = trailing;
        Some(entry)
    }

    /// Current content, keyed as the keys were parsed
    pub fn source_mapping(&self) -> Mapping {
        self.entries
            .iter()
            .map(|entry| (entry.source_key.clone(), entry.value()))
            .collect()
    }

    pub fn merge(&mut self, overlay: Mapping, path: &str) -> Result<(), DocumentError> {
        for (key, value) in overlay {
            let key = key_string(&key).ok_or_else(|| DocumentError::InvalidPath {
                path: path.to_string(),
                message: format!("unsupported {} key in overlay", kind_name(&key)),
            })?;
            let child_path = format!("{}.{}", path, key);

            match self.entries.iter_mut().find(|entry| entry.key == key) {
                Some(entry) => entry.merge(value, &child_path)?,
                None => self.entries.push(Entry::rendered(key, value)),
            }
        }
        Ok(())
    }

    /// Remove an entry, keeping any comments that followed it
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.key == key) else {
            return false;
        };
        let removed = self.entries.remove(index);

        if removed.trailing.iter().any(|line| is_comment(line)) {
            match index.checked_sub(1).and_then(|i| self.entries.get_mut(i)) {
                Some(previous) => previous.trailing.extend(removed.trailing),
                None => self.head.extend(removed.trailing),
            }
        }
        true
    }

    pub fn render(&self, out: &mut Vec<String>) -> Result<(), DocumentError> {
        out.extend(self.head.iter().cloned());
        for entry in &self.entries {
            entry.render(self.indent, out)?;
        }
        Ok(())
    }
}
