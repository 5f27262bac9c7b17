//! Streaming Schema Parser
//!
//! Stateful parser that accepts a document in arbitrary chunks with bounded
//! buffering. Only the trailing incomplete construct is retained between
//! `feed` calls; everything before it has already been pushed through the
//! decoder.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::decoder::SchemaDecoder;
use crate::error::{Error, Result};
use crate::options::ParseOptions;
use crate::schema::Schema;
use crate::xml::EventScanner;

/// Chunk-fed schema parser
#[derive(Debug)]
pub struct SchemaStream {
    /// Unconsumed tail of previous chunks
    buffer: Vec<u8>,
    scanner: EventScanner,
    decoder: SchemaDecoder,
    /// Set once any feed fails; the stream cannot recover
    failed: bool,
}

impl SchemaStream {
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    pub fn with_options(options: ParseOptions) -> Self {
        SchemaStream {
            buffer: Vec::with_capacity(options.chunk_size),
            scanner: EventScanner::new(),
            decoder: SchemaDecoder::with_options(options),
            failed: false,
        }
    }

    /// Feed a chunk of data to the parser
    pub fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        if self.failed {
            return Err(Error::StreamAborted);
        }
        self.buffer.extend_from_slice(chunk);

        match self.scanner.scan(&self.buffer, false, &mut self.decoder) {
            Ok(consumed) => {
                self.buffer.drain(..consumed);
                Ok(())
            }
            Err(err) => {
                self.failed = true;
                Err(err)
            }
        }
    }

    /// Scan the remaining buffer as end of document and resolve the graph
    pub fn finish(mut self) -> Result<Schema> {
        if self.failed {
            return Err(Error::StreamAborted);
        }
        self.scanner.scan(&self.buffer, true, &mut self.decoder)?;
        self.decoder.finish()
    }

    /// Bytes held back waiting for more input
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Total bytes pushed through the decoder so far
    pub fn position(&self) -> usize {
        self.scanner.position()
    }
}

impl Default for SchemaStream {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull a document from a reader in `chunk_size` reads
pub fn parse_reader<R: Read>(mut reader: R, options: &ParseOptions) -> Result<Schema> {
    let mut stream = SchemaStream::with_options(options.clone());
    let mut chunk = vec![0u8; options.chunk_size.max(1)];
    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        stream.feed(&chunk[..read])?;
    }
    stream.finish()
}

/// Stream a document from disk
pub(crate) fn parse_path(path: &Path, options: &ParseOptions) -> Result<Schema> {
    let file = File::open(path)?;
    parse_reader(BufReader::new(file), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const DOCUMENT: &str = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <!-- PowerDesigner physical model -->
        <Model xmlns:a="attribute" xmlns:c="collection" xmlns:o="object">
          <o:Table Id="o1">
            <a:Name>Author</a:Name>
            <a:Code>author</a:Code>
            <c:Columns>
              <o:Column Id="o2"><a:Name>id</a:Name><a:DataType>int</a:DataType></o:Column>
              <o:Column Id="o3"><a:Name>pen_name</a:Name><a:DataType>varchar(40)</a:DataType></o:Column>
            </c:Columns>
          </o:Table>
          <o:Table Id="o4">
            <a:Name>Book</a:Name>
            <a:Code>book</a:Code>
            <a:Comment>Title &amp; edition</a:Comment>
            <c:Columns>
              <o:Column Id="o5"><a:Name>author_id</a:Name><a:DataType>integer</a:DataType></o:Column>
            </c:Columns>
          </o:Table>
          <o:Reference Id="o6">
            <c:ParentTable><o:Table Ref="o1"/></c:ParentTable>
            <c:ChildTable><o:Table Ref="o4"/></c:ChildTable>
          </o:Reference>
        </Model>
    "#};

    #[test]
    fn test_byte_by_byte_matches_whole() {
        let whole = crate::parse_schema(DOCUMENT.as_bytes()).unwrap();

        let mut stream = SchemaStream::new();
        for byte in DOCUMENT.as_bytes() {
            stream.feed(std::slice::from_ref(byte)).unwrap();
        }
        let streamed = stream.finish().unwrap();

        assert_eq!(streamed, whole);
        let book = streamed.find_by_code("book").unwrap();
        assert_eq!(book.comment.as_deref(), Some("Title & edition"));
        assert_eq!(book.columns[0].col_type, Some(ColumnType::Int));
        assert_eq!(streamed.refs_of(book).next().map(|t| t.code.as_str()), Some("author"));
    }

    #[test]
    fn test_buffer_holds_only_incomplete_tail() {
        let mut stream = SchemaStream::new();
        stream.feed(b"<Model><o:Table Id=\"o1\"><a:Co").unwrap();
        assert_eq!(stream.buffer_size(), 5);
        assert!(stream.has_pending());
        assert_eq!(stream.position(), 24);
    }

    #[test]
    fn test_stream_aborts_after_error() {
        let mut stream = SchemaStream::new();
        assert!(matches!(
            stream.feed(b"<a></b>"),
            Err(Error::MalformedDocument { .. })
        ));
        assert!(matches!(stream.feed(b"<c/>"), Err(Error::StreamAborted)));
        assert!(matches!(stream.finish(), Err(Error::StreamAborted)));
    }

    #[test]
    fn test_truncated_stream() {
        let mut stream = SchemaStream::new();
        stream.feed(&DOCUMENT.as_bytes()[..DOCUMENT.len() / 2]).unwrap();
        assert!(matches!(stream.finish(), Err(Error::MalformedDocument { .. })));
    }

    #[test]
    fn test_parse_reader_small_chunks() {
        let options = ParseOptions::new().with_chunk_size(7);
        let schema = parse_reader(DOCUMENT.as_bytes(), &options).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.tables()[0].columns.len(), 2);
    }

    #[test]
    fn test_parse_path_reads_file() {
        let path = std::env::temp_dir().join(format!("rustypdm-streaming-{}.pdm", std::process::id()));
        std::fs::write(&path, DOCUMENT).unwrap();

        let schema = parse_path(&path, &ParseOptions::new().with_chunk_size(11)).unwrap();
        assert_eq!(schema, crate::parse_schema(DOCUMENT.as_bytes()).unwrap());

        std::fs::remove_file(&path).ok();
        assert!(matches!(parse_path(&path, &ParseOptions::new()), Err(Error::Io(_))));
    }
}
