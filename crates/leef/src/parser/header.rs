use crate::parser::model::{Header, HeaderSchema, MarkerMode, ParseError};
use crate::parser::MARKER;

/// Parses one header segment against a fixed [`HeaderSchema`].
///
/// The schema is validated at construction of the schema itself, so a
/// `HeaderParser` only has to strip the marker, split on `|`, and
/// assign segments positionally.
#[derive(Debug, Clone)]
pub struct HeaderParser {
    schema: HeaderSchema,
    marker: MarkerMode,
}

impl HeaderParser {
    pub fn new(schema: HeaderSchema) -> Self {
        Self {
            schema,
            marker: MarkerMode::default(),
        }
    }

    pub fn with_marker(schema: HeaderSchema, marker: MarkerMode) -> Self {
        Self { schema, marker }
    }

    pub fn schema(&self) -> &HeaderSchema {
        &self.schema
    }

    pub fn marker(&self) -> MarkerMode {
        self.marker
    }

    pub fn parse(&self, raw: &str) -> Result<Header, ParseError> {
        let stripped = match self.marker {
            // Character-class trim: every leading/trailing 'L', 'E',
            // 'F' or ':' goes, wherever it came from.
            MarkerMode::CharClass => raw.trim_matches(|c| matches!(c, 'L' | 'E' | 'F' | ':')),
            MarkerMode::Prefix => raw.strip_prefix(MARKER).unwrap_or(raw),
        };

        // Empty segments (trailing pipes, doubled pipes) are discarded,
        // so header fields are treated as always non-empty.
        let segments: Vec<&str> = stripped.split('|').filter(|s| !s.is_empty()).collect();

        if segments.len() != self.schema.len() {
            return Err(ParseError::HeaderShapeMismatch {
                segments: segments.iter().map(|s| s.to_string()).collect(),
                expected: self.schema.len(),
            });
        }

        let fields = self
            .schema
            .fields()
            .iter()
            .zip(segments)
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();

        Ok(Header::new(fields))
    }
}
