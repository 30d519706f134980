//! LEEF parsing and normalization module.
//!
//! Converts raw LEEF payloads into structured, schema-validated records.
//!
//! # Architecture
//!
//! - `model.rs`: Data model (schema, header, record, parsed file) and errors
//! - `header.rs`: Header parser (marker strip, pipe split, positional assign)
//! - `file.rs`: File parser (line split, header/body decomposition)
//! - `metrics.rs`: Parsing counters
//!
//! # Guarantees
//!
//! - Fail-fast: any malformed line aborts the whole parse, no partial results
//! - Lines are independent; no cross-line state, no backtracking
//! - Every output structure is built once and frozen

pub mod model;
pub mod header;
pub mod file;
pub mod metrics;

// Re-export commonly used types
pub use model::{Header, HeaderSchema, MarkerMode, ParseError, ParsedFile, Record};
pub use header::HeaderParser;
pub use file::FileParser;
pub use metrics::{MetricsSnapshot, ParsingMetrics};

// Constants
pub const MARKER: &str = "LEEF:";
pub const DEFAULT_DELIMITER: &str = "\t";
