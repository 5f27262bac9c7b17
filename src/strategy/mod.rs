//! Parsing Strategy Module
//!
//! - Streaming: chunk-fed parser for sockets, pipes and large files
//! - Parallel: Rayon batch parsing of independent documents

pub mod parallel;
pub mod streaming;

pub use parallel::{parse_batch, parse_files};
pub use streaming::{parse_reader, SchemaStream};
