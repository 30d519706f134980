use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leef::config::ParserConfig;
use leef::parser::ParsingMetrics;

/// Initialise the tracing / logging subsystem.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leef=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = ParserConfig::load()?;
    config.validate()?;
    info!(
        "Schema: {}, delimiter: {:?}, marker: {}",
        config.header_fields.join("|"),
        config.delimiter,
        config.marker.as_str()
    );

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: leef <path-to-log-file>")?;
    let payload = std::fs::read_to_string(&path)?;

    let parser = config.build()?;
    let metrics = ParsingMetrics::new();

    let start = Instant::now();
    match parser.parse(&payload) {
        Ok(file) => {
            metrics.record_payload(file.len() as u64, start.elapsed().as_nanos() as u64);
            let snapshot = metrics.snapshot();
            info!(
                records = file.len(),
                avg_parse_time_us = snapshot.avg_parse_time_us,
                "parsed {}",
                path
            );
            for record in file.records() {
                debug!(?record, "record");
            }
            Ok(())
        }
        Err(e) => {
            metrics.record_error(&e);
            error!("failed to parse {}: {}", path, e);
            Err(e.into())
        }
    }
}
