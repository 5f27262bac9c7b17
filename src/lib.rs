//! RustyPDM - Streaming decoder for PowerDesigner physical data model exports
//!
//! Turns the XML export of a modeling tool into a graph of tables, columns
//! and resolved foreign-key references.
//!
//! Pipeline:
//! - `xml`: resumable push scanner, delivers element/text events
//! - `decoder`: context state machine, stages and commits entities
//! - `decoder` resolver: post-pass turning foreign keys into table links
//!
//! Entry points:
//! - `parse_schema` / `parse_schema_with`: whole document in memory
//! - `parse_reader` / `parse_file` / `SchemaStream`: chunked input
//! - `parse_batch` / `parse_files`: many documents in parallel
//!
//! ```
//! let xml = br#"<Model>
//!   <o:Table Id="1"><a:Code>author</a:Code></o:Table>
//!   <o:Table Id="2"><a:Code>book</a:Code></o:Table>
//!   <o:Reference Id="3">
//!     <c:ParentTable><o:Table Ref="1"/></c:ParentTable>
//!     <c:ChildTable><o:Table Ref="2"/></c:ChildTable>
//!   </o:Reference>
//! </Model>"#;
//!
//! let schema = rustypdm::parse_schema(xml).unwrap();
//! let book = schema.find_by_code("book").unwrap();
//! let parents: Vec<_> = schema.refs_of(book).map(|t| t.code.as_str()).collect();
//! assert_eq!(parents, ["author"]);
//! ```

use std::path::Path;

pub mod decoder;
pub mod error;
pub mod options;
pub mod schema;
pub mod strategy;
pub mod xml;

pub use decoder::SchemaDecoder;
pub use error::{Entity, Error, Result};
pub use options::{IncompletePolicy, ParseOptions};
pub use schema::{Column, ColumnType, Length, ReferenceEnd, Schema, Table, TableIndex, TypeFamily};
pub use strategy::{parse_batch, parse_files, parse_reader, SchemaStream};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Entry Points
// ============================================================================

/// Parse a complete document with default options
pub fn parse_schema(input: &[u8]) -> Result<Schema> {
    parse_schema_with(input, &ParseOptions::default())
}

/// Parse a complete document
///
/// The scan runs in a single pass over `input`; foreign keys are resolved
/// once the document has been fully consumed.
pub fn parse_schema_with(input: &[u8], options: &ParseOptions) -> Result<Schema> {
    let mut decoder = SchemaDecoder::with_options(options.clone());
    xml::EventScanner::new().scan(input, true, &mut decoder)?;
    decoder.finish()
}

/// Parse a document from disk in `options.chunk_size` reads
pub fn parse_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Schema> {
    strategy::streaming::parse_path(path.as_ref(), options)
}
