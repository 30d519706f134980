use std::collections::HashMap;
use std::ops::Index;
use bytes::Bytes;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// How the `LEEF:` marker region is removed from a raw header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerMode {
    /// Trim every leading/trailing character in the set `{L, E, F, :}`.
    /// Legacy behavior; can eat field data that starts or ends with
    /// those characters.
    CharClass,
    /// Remove one leading literal `LEEF:` when present, nothing else.
    Prefix,
}

impl MarkerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerMode::CharClass => "char_class",
            MarkerMode::Prefix => "prefix",
        }
    }
}

impl Default for MarkerMode {
    fn default() -> Self {
        MarkerMode::CharClass
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("wrong header shape: {} fields {segments:?}, schema expects {expected}", .segments.len())]
    HeaderShapeMismatch {
        segments: Vec<String>,
        expected: usize,
    },

    #[error("duplicate schema field: {0:?}")]
    DuplicateSchemaField(String),

    #[error("unknown header field: {0:?}")]
    UnknownField(String),

    #[error("body segment without '=': {segment:?}")]
    MalformedBodyField { segment: String },

    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Annotate a per-line failure with its zero-based payload line index.
    pub(crate) fn at_line(self, line: usize) -> Self {
        ParseError::AtLine {
            line,
            source: Box::new(self),
        }
    }

    /// The underlying error, with any line annotation peeled off.
    pub fn root(&self) -> &ParseError {
        match self {
            ParseError::AtLine { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Ordered list of expected header field names.
///
/// Built once per parsing session and shared read-only across every
/// line. Construction rejects duplicate names, so per-line parsing
/// never has to re-check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSchema {
    fields: Vec<String>,
}

impl HeaderSchema {
    pub fn new<I, S>(fields: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        for (i, name) in fields.iter().enumerate() {
            if fields[..i].contains(name) {
                return Err(ParseError::DuplicateSchemaField(name.clone()));
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }
}

/// One parsed header: field name → raw value, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    fields: Vec<(String, String)>,
}

impl Header {
    pub(crate) fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Look up a header field by name.
    pub fn get(&self, name: &str) -> Result<&str, ParseError> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| ParseError::UnknownField(name.to_string()))
    }

    /// Iterate `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One parsed log event: structured header plus body attributes.
///
/// A pure value type; built once by the file parser and never mutated.
/// The raw source line is always preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    header: Header,
    body: HashMap<String, String>,
    raw: Bytes,
}

impl Record {
    pub(crate) fn new(header: Header, body: HashMap<String, String>, raw: Bytes) -> Self {
        Self { header, body, raw }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn body(&self) -> &HashMap<String, String> {
        &self.body
    }

    /// Header field lookup, failing on names outside the schema.
    pub fn field(&self, name: &str) -> Result<&str, ParseError> {
        self.header.get(name)
    }

    /// Body attribute lookup. Absent keys are not an error: the body is
    /// an open set of attributes.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.body.get(key).map(String::as_str)
    }

    pub fn raw(&self) -> &Bytes {
        &self.raw
    }
}

/// Ordered collection of records, one per non-blank payload line.
///
/// Iteration via [`ParsedFile::records`] is finite and restartable; the
/// collection is frozen once returned to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFile {
    records: Vec<Record>,
}

impl ParsedFile {
    pub(crate) fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn records(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl Index<usize> for ParsedFile {
    type Output = Record;

    fn index(&self, index: usize) -> &Record {
        &self.records[index]
    }
}

impl<'a> IntoIterator for &'a ParsedFile {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for ParsedFile {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
