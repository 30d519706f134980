use std::sync::atomic::{AtomicU64, Ordering};
use serde::Serialize;

use crate::parser::model::ParseError;

/// Counters for parsing operations.
///
/// All operations use `Ordering::Relaxed`: these are observability
/// counters, eventual correctness is sufficient. A snapshot is not
/// transactional across fields; slight tearing between counters is
/// acceptable.
#[derive(Debug, Default)]
pub struct ParsingMetrics {
    payloads_parsed: AtomicU64,
    records_produced: AtomicU64,
    header_errors: AtomicU64,
    body_errors: AtomicU64,
    schema_errors: AtomicU64,
    parse_time_nanos: AtomicU64,
}

impl ParsingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successfully parsed payload.
    #[inline]
    pub fn record_payload(&self, records: u64, time_nanos: u64) {
        self.payloads_parsed.fetch_add(1, Ordering::Relaxed);
        self.records_produced.fetch_add(records, Ordering::Relaxed);
        self.parse_time_nanos.fetch_add(time_nanos, Ordering::Relaxed);
    }

    /// Record a failed parse, classified by the root cause.
    #[inline]
    pub fn record_error(&self, error: &ParseError) {
        match error.root() {
            ParseError::HeaderShapeMismatch { .. } | ParseError::UnknownField(_) => {
                self.header_errors.fetch_add(1, Ordering::Relaxed)
            }
            ParseError::MalformedBodyField { .. } => {
                self.body_errors.fetch_add(1, Ordering::Relaxed)
            }
            ParseError::DuplicateSchemaField(_) => {
                self.schema_errors.fetch_add(1, Ordering::Relaxed)
            }
            // root() never returns AtLine
            ParseError::AtLine { .. } => 0,
        };
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let payloads = self.payloads_parsed.load(Ordering::Relaxed);
        let records = self.records_produced.load(Ordering::Relaxed);
        let time_nanos = self.parse_time_nanos.load(Ordering::Relaxed);

        let header_errors = self.header_errors.load(Ordering::Relaxed);
        let body_errors = self.body_errors.load(Ordering::Relaxed);
        let schema_errors = self.schema_errors.load(Ordering::Relaxed);
        let failures = header_errors + body_errors + schema_errors;
        let attempts = payloads + failures;

        MetricsSnapshot {
            payloads_parsed: payloads,
            records_produced: records,
            header_errors,
            body_errors,
            schema_errors,
            avg_parse_time_us: if payloads > 0 {
                (time_nanos as f64 / payloads as f64) / 1000.0
            } else {
                0.0
            },
            success_rate: if attempts > 0 {
                payloads as f64 / attempts as f64
            } else {
                1.0
            },
        }
    }
}

/// A read-only, serializable snapshot of [`ParsingMetrics`].
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub payloads_parsed: u64,
    pub records_produced: u64,
    pub header_errors: u64,
    pub body_errors: u64,
    pub schema_errors: u64,
    pub avg_parse_time_us: f64,
    pub success_rate: f64,
}
