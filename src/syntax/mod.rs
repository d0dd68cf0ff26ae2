//! Resilient parser for schema documents
//!
//! Parsing never fails: malformed input yields a best-effort tree plus
//! diagnostics in [`ParseResult::errors`].

pub mod delimited;
pub mod grammar;
pub mod reader;

pub use delimited::TrailingSeparator;
pub use grammar::{ParseOptions, ParseResult, parse, parse_table};
