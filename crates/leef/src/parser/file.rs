use std::collections::HashMap;
use bytes::Bytes;
use tracing::{debug, trace};

use crate::parser::header::HeaderParser;
use crate::parser::model::{HeaderSchema, MarkerMode, ParseError, ParsedFile, Record};
use crate::parser::DEFAULT_DELIMITER;

/// Parses a full LEEF payload into an ordered sequence of [`Record`]s.
///
/// Lines are independent: no state crosses from one line to the next
/// and the parser holds nothing back after returning. Any per-line
/// failure aborts the whole parse, annotated with the offending
/// zero-based payload line index.
#[derive(Debug, Clone)]
pub struct FileParser {
    header: HeaderParser,
    delimiter: String,
}

impl FileParser {
    pub fn new(schema: HeaderSchema) -> Self {
        Self {
            header: HeaderParser::new(schema),
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }

    /// Override the body-field delimiter (default: a single tab).
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_marker(mut self, marker: MarkerMode) -> Self {
        self.header = HeaderParser::with_marker(self.header.schema().clone(), marker);
        self
    }

    pub fn schema(&self) -> &HeaderSchema {
        self.header.schema()
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn parse(&self, payload: &str) -> Result<ParsedFile, ParseError> {
        let mut records = Vec::new();

        for (idx, line) in payload.split('\n').enumerate() {
            // Blank and whitespace-only lines carry no event.
            if line.trim().is_empty() {
                continue;
            }

            let mut segments = line.split(self.delimiter.as_str());
            // split yields at least one segment for a non-empty line
            let header_text = segments.next().unwrap_or(line);
            let header = self
                .header
                .parse(header_text)
                .map_err(|e| e.at_line(idx))?;

            let mut body = HashMap::new();
            for segment in segments {
                let (key, value) = segment.split_once('=').ok_or_else(|| {
                    ParseError::MalformedBodyField {
                        segment: segment.to_string(),
                    }
                    .at_line(idx)
                })?;
                // later duplicates overwrite earlier ones
                body.insert(key.to_string(), value.to_string());
            }

            trace!(line = idx, body_fields = body.len(), "parsed record");
            records.push(Record::new(header, body, Bytes::copy_from_slice(line.as_bytes())));
        }

        debug!(records = records.len(), "parsed LEEF payload");
        Ok(ParsedFile::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_parser() -> FileParser {
        let schema =
            HeaderSchema::new(["Version", "Vendor", "Product", "ProductVersion", "rule"]).unwrap();
        FileParser::new(schema)
    }

    #[test]
    fn test_parse_single_line_payload() {
        let parser = canonical_parser();
        assert_eq!(parser.schema().len(), 5);
        assert_eq!(parser.delimiter(), "\t");

        let payload = "LEEF:1.0|Vendor|Product|1.0|ruleA\tsrc=10.0.0.1\tdst=10.0.0.2\n";

        let file = parser.parse(payload).unwrap();
        assert_eq!(file.len(), 1);

        let record = &file[0];
        assert_eq!(record.field("Version").unwrap(), "1.0");
        assert_eq!(record.field("Vendor").unwrap(), "Vendor");
        assert_eq!(record.field("Product").unwrap(), "Product");
        assert_eq!(record.field("ProductVersion").unwrap(), "1.0");
        assert_eq!(record.field("rule").unwrap(), "ruleA");

        assert_eq!(record.attribute("src"), Some("10.0.0.1"));
        assert_eq!(record.attribute("dst"), Some("10.0.0.2"));
        assert_eq!(record.body().len(), 2);
    }

    #[test]
    fn test_record_order_matches_line_order() {
        let parser = canonical_parser();
        let payload = "\
LEEF:1.0|V|P|1|first\tn=1
LEEF:1.0|V|P|1|second\tn=2
LEEF:1.0|V|P|1|third\tn=3
";

        let file = parser.parse(payload).unwrap();
        assert_eq!(file.len(), 3);

        let rules: Vec<&str> = file
            .records()
            .map(|r| r.field("rule").unwrap())
            .collect();
        assert_eq!(rules, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_blank_and_whitespace_lines_skipped() {
        let parser = canonical_parser();
        let payload = "\n   \nLEEF:1.0|V|P|1|r\tk=v\n\t\n\nLEEF:1.0|V|P|1|r\tk=v\n";

        let file = parser.parse(payload).unwrap();
        assert_eq!(file.len(), 2);
    }

    #[test]
    fn test_empty_payload_is_empty_not_error() {
        let parser = canonical_parser();
        assert!(parser.parse("").unwrap().is_empty());
        assert!(parser.parse("\n\n  \n").unwrap().is_empty());
    }

    #[test]
    fn test_body_value_may_contain_equals() {
        let parser = canonical_parser();
        let payload = "LEEF:1.0|V|P|1|r\tkey=a=b\n";

        let file = parser.parse(payload).unwrap();
        assert_eq!(file[0].attribute("key"), Some("a=b"));
    }

    #[test]
    fn test_duplicate_body_key_last_wins() {
        let parser = canonical_parser();
        let payload = "LEEF:1.0|V|P|1|r\tsrc=first\tsrc=second\n";

        let file = parser.parse(payload).unwrap();
        assert_eq!(file[0].attribute("src"), Some("second"));
        assert_eq!(file[0].body().len(), 1);
    }

    #[test]
    fn test_malformed_body_segment_fails_whole_parse() {
        let parser = canonical_parser();
        let payload = "LEEF:1.0|V|P|1|r\tok=1\tnoequals\n";

        let err = parser.parse(payload).unwrap_err();
        assert!(matches!(
            err.root(),
            ParseError::MalformedBodyField { segment } if segment == "noequals"
        ));
    }

    #[test]
    fn test_error_carries_payload_line_index() {
        let parser = canonical_parser();
        // Line 0 is fine, line 1 is blank, line 2 has a bad header.
        let payload = "LEEF:1.0|V|P|1|r\tk=v\n\nLEEF:1.0|V|P|missing\tk=v\n";

        let err = parser.parse(payload).unwrap_err();
        assert!(matches!(err, ParseError::AtLine { line: 2, .. }));
        assert!(matches!(
            err.root(),
            ParseError::HeaderShapeMismatch { expected: 5, .. }
        ));
    }

    #[test]
    fn test_header_failure_yields_no_partial_file() {
        let parser = canonical_parser();
        let payload = "LEEF:1.0|V|P|1|r\tk=v\nLEEF:bad\n";
        assert!(parser.parse(payload).is_err());
    }

    #[test]
    fn test_custom_delimiter() {
        let parser = canonical_parser().with_delimiter(";");
        assert_eq!(parser.delimiter(), ";");

        let payload = "LEEF:1.0|V|P|1|r;src=10.0.0.1;dst=10.0.0.2\n";

        let file = parser.parse(payload).unwrap();
        assert_eq!(file[0].attribute("src"), Some("10.0.0.1"));
        assert_eq!(file[0].attribute("dst"), Some("10.0.0.2"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = canonical_parser();
        let payload = "LEEF:1.0|V|P|1|r\tsrc=10.0.0.1\nLEEF:1.0|V|P|1|r2\tdst=10.0.0.2\n";

        let first = parser.parse(payload).unwrap();
        let second = parser.parse(payload).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_record_preserves_raw_line() {
        let parser = canonical_parser();
        let line = "LEEF:1.0|V|P|1|r\tsrc=10.0.0.1";
        let payload = format!("{line}\n");

        let file = parser.parse(&payload).unwrap();
        assert_eq!(file[0].raw(), line.as_bytes());
    }

    #[test]
    fn test_records_iteration_is_restartable() {
        let parser = canonical_parser();
        let payload = "LEEF:1.0|V|P|1|r\tk=v\nLEEF:1.0|V|P|1|r\tk=v\n";
        let file = parser.parse(payload).unwrap();

        assert_eq!(file.records().count(), 2);
        assert_eq!(file.records().count(), 2);
    }

    #[test]
    fn test_into_records_transfers_ownership() {
        let parser = canonical_parser();
        let payload = "LEEF:1.0|V|P|1|first\tk=v\nLEEF:1.0|V|P|1|second\tk=v\n";

        let records = parser.parse(payload).unwrap().into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].field("rule").unwrap(), "second");
    }

    #[test]
    fn test_line_with_no_body_fields() {
        let parser = canonical_parser();
        let file = parser.parse("LEEF:1.0|V|P|1|r\n").unwrap();
        assert_eq!(file.len(), 1);
        assert!(file[0].body().is_empty());
    }

    #[test]
    fn test_prefix_marker_mode_applies_per_line() {
        let schema =
            HeaderSchema::new(["Version", "Vendor", "Product", "ProductVersion", "rule"]).unwrap();
        let parser = FileParser::new(schema).with_marker(MarkerMode::Prefix);

        let file = parser.parse("LEEF:1.0|V|P|1|FLEE\tk=v\n").unwrap();
        assert_eq!(file[0].field("rule").unwrap(), "FLEE");
    }
}
