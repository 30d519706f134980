// LEEF (Log Event Extended Format) parsing library.

// Core parsing pipeline
pub mod parser;

// Configuration layer
pub mod config;

pub use config::ParserConfig;
pub use parser::{
    FileParser, Header, HeaderParser, HeaderSchema, MarkerMode, ParseError, ParsedFile, Record,
};
