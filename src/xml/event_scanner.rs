//! Event Scanner with ScanHandler Trait
//!
//! Push-style XML tokenizer: the scanner walks a window of input and calls
//! the handler for each element opening, element closing and text run, in
//! document order. Comments, processing instructions and the DOCTYPE are
//! consumed silently; CDATA content is reported as text.
//!
//! The scanner is resumable. `scan` returns how many bytes of the window
//! were consumed; an incomplete trailing construct is left unconsumed so the
//! caller can append the next chunk and call again. Only the final call
//! treats leftover input as an error.
//!
//! Well-formedness is checked as the input is consumed: matching tags, a
//! single root element, quoted unique attributes, terminated markup, valid
//! UTF-8 and entity references. Any violation is `Error::MalformedDocument`.

use std::borrow::Cow;

use super::entities::decode_text;
use super::scanner::{is_name_start_char, is_whitespace, Scanner};
use super::tag::{Attribute, Tag};
use crate::error::{Error, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Trait for receiving scan events
///
/// Returning an error from any callback aborts the scan immediately.
pub trait ScanHandler {
    /// Called when an element opens; self-closing elements are followed by
    /// an immediate `end_element`
    fn start_element(&mut self, tag: &Tag<'_>) -> Result<()>;

    /// Called when an element closes
    fn end_element(&mut self, name: &str) -> Result<()>;

    /// Called for entity-decoded character data. One text node may arrive
    /// as several calls.
    fn text(&mut self, content: &str) -> Result<()>;
}

/// Outcome of scanning one construct
enum Step {
    Done,
    Incomplete,
}

/// Resumable, validating XML scanner
#[derive(Debug)]
pub struct EventScanner {
    /// Names of open elements, innermost last
    open: Vec<String>,
    seen_root: bool,
    at_start: bool,
    /// Absolute stream offset of the current window
    offset: usize,
}

impl EventScanner {
    /// Create a scanner positioned at the start of a document
    pub fn new() -> Self {
        Self {
            open: Vec::with_capacity(16),
            seen_root: false,
            at_start: true,
            offset: 0,
        }
    }

    /// Total bytes consumed across all windows
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Scan a window of input, returning the number of bytes consumed
    ///
    /// With `is_final` set the window must hold the rest of the document:
    /// leftover partial markup or unclosed elements are reported as errors.
    pub fn scan<H: ScanHandler>(
        &mut self,
        input: &[u8],
        is_final: bool,
        handler: &mut H,
    ) -> Result<usize> {
        let mut cursor = Scanner::new(input);

        if self.at_start {
            if let Step::Incomplete = self.skip_byte_order_mark(&mut cursor, is_final)? {
                return Ok(0);
            }
        }

        while !cursor.is_eof() {
            let start = cursor.position();
            let step = if cursor.peek() == Some(b'<') {
                self.scan_markup(&mut cursor, handler)?
            } else {
                self.scan_text(&mut cursor, is_final, handler)?
            };

            if let Step::Incomplete = step {
                if is_final {
                    return Err(self.error("unexpected end of document", start));
                }
                cursor.set_position(start);
                break;
            }
        }

        let consumed = cursor.position();
        if is_final {
            self.check_complete(consumed)?;
        }
        self.offset += consumed;
        Ok(consumed)
    }

    fn skip_byte_order_mark(&mut self, cursor: &mut Scanner<'_>, is_final: bool) -> Result<Step> {
        if cursor.starts_with(UTF8_BOM) {
            cursor.advance(UTF8_BOM.len());
        } else if cursor.starts_with(&[0xFE, 0xFF]) || cursor.starts_with(&[0xFF, 0xFE]) {
            return Err(self.error("UTF-16 input is not supported", 0));
        } else if !is_final && cursor.is_prefix_of(UTF8_BOM) {
            return Ok(Step::Incomplete);
        }
        self.at_start = false;
        Ok(Step::Done)
    }

    fn check_complete(&self, local: usize) -> Result<()> {
        if let Some(name) = self.open.last() {
            return Err(self.error(format!("unclosed element <{name}>"), local));
        }
        if !self.seen_root {
            return Err(self.error("document has no root element", local));
        }
        Ok(())
    }

    /// Scan markup starting with '<'
    fn scan_markup<H: ScanHandler>(&mut self, cursor: &mut Scanner<'_>, handler: &mut H) -> Result<Step> {
        match cursor.peek_at(1) {
            None => Ok(Step::Incomplete),
            Some(b'/') => self.scan_end_tag(cursor, handler),
            Some(b'?') => self.scan_processing_instruction(cursor),
            Some(b'!') => self.scan_declaration(cursor, handler),
            Some(c) if is_name_start_char(c) => self.scan_start_tag(cursor, handler),
            Some(_) => Err(self.error("invalid character after '<'", cursor.position())),
        }
    }

    fn scan_start_tag<H: ScanHandler>(&mut self, cursor: &mut Scanner<'_>, handler: &mut H) -> Result<Step> {
        let start = cursor.position();
        cursor.advance(1);

        let name_start = cursor.position();
        let Some(raw_name) = cursor.read_name() else {
            return Err(self.error("expected element name", name_start));
        };

        let mut attributes: Vec<Attribute<'_>> = Vec::new();
        let is_empty = loop {
            let before_space = cursor.position();
            cursor.skip_whitespace();
            match cursor.peek() {
                None => return Ok(Step::Incomplete),
                Some(b'>') => {
                    cursor.advance(1);
                    break false;
                }
                Some(b'/') => match cursor.peek_at(1) {
                    None => return Ok(Step::Incomplete),
                    Some(b'>') => {
                        cursor.advance(2);
                        break true;
                    }
                    Some(_) => return Err(self.error("expected '>' after '/'", cursor.position())),
                },
                Some(c) if is_name_start_char(c) => {
                    if cursor.position() == before_space {
                        return Err(self.error("missing whitespace before attribute", cursor.position()));
                    }
                    let attr_start = cursor.position();
                    let Some(attribute) = self.scan_attribute(cursor)? else {
                        return Ok(Step::Incomplete);
                    };
                    if attributes.iter().any(|a| a.name == attribute.name) {
                        return Err(self.error(
                            format!("duplicate attribute '{}'", attribute.name),
                            attr_start,
                        ));
                    }
                    attributes.push(attribute);
                }
                Some(_) => return Err(self.error("unexpected character in tag", cursor.position())),
            }
        };

        let name = self.utf8(raw_name, name_start)?;
        if self.open.is_empty() {
            if self.seen_root {
                return Err(self.error("multiple root elements", start));
            }
            self.seen_root = true;
        }

        handler.start_element(&Tag::new(name, &attributes))?;
        if is_empty {
            handler.end_element(name)?;
        } else {
            self.open.push(name.to_string());
        }
        Ok(Step::Done)
    }

    /// Scan `name="value"`, returning None if the window ends first
    fn scan_attribute<'a>(&self, cursor: &mut Scanner<'a>) -> Result<Option<Attribute<'a>>> {
        let name_start = cursor.position();
        let Some(raw_name) = cursor.read_name() else {
            return Err(self.error("expected attribute name", name_start));
        };

        cursor.skip_whitespace();
        match cursor.peek() {
            None => return Ok(None),
            Some(b'=') => cursor.advance(1),
            Some(_) => return Err(self.error("expected '=' after attribute name", cursor.position())),
        }

        cursor.skip_whitespace();
        let quote = match cursor.peek() {
            None => return Ok(None),
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => return Err(self.error("attribute value must be quoted", cursor.position())),
        };
        cursor.advance(1);

        let value_start = cursor.position();
        let Some(value_end) = cursor.find_byte2(quote, b'<') else {
            return Ok(None);
        };
        cursor.set_position(value_end);
        if cursor.peek() == Some(b'<') {
            return Err(self.error("'<' is not allowed in attribute values", value_end));
        }
        cursor.advance(1);

        let name = self.utf8(raw_name, name_start)?;
        let value = self.decode(cursor.slice(value_start, value_end), value_start)?;
        Ok(Some(Attribute { name, value }))
    }

    fn scan_end_tag<H: ScanHandler>(&mut self, cursor: &mut Scanner<'_>, handler: &mut H) -> Result<Step> {
        let start = cursor.position();
        cursor.advance(2);

        let name_start = cursor.position();
        let Some(raw_name) = cursor.read_name() else {
            if cursor.is_eof() {
                return Ok(Step::Incomplete);
            }
            return Err(self.error("expected element name in closing tag", name_start));
        };

        cursor.skip_whitespace();
        match cursor.peek() {
            None => return Ok(Step::Incomplete),
            Some(b'>') => cursor.advance(1),
            Some(_) => return Err(self.error("expected '>' to end closing tag", cursor.position())),
        }

        let name = self.utf8(raw_name, name_start)?;
        match self.open.pop() {
            Some(expected) if expected == name => {}
            Some(expected) => {
                return Err(self.error(
                    format!("mismatched closing tag </{name}>, expected </{expected}>"),
                    start,
                ))
            }
            None => {
                return Err(self.error(format!("closing tag </{name}> has no opening tag"), start))
            }
        }

        handler.end_element(name)?;
        Ok(Step::Done)
    }

    /// Scan `<!--`, `<![CDATA[` or `<!DOCTYPE`
    fn scan_declaration<H: ScanHandler>(&mut self, cursor: &mut Scanner<'_>, handler: &mut H) -> Result<Step> {
        let start = cursor.position();

        if cursor.starts_with(b"<!--") {
            cursor.advance(4);
            return Ok(self.skip_past(cursor, b"-->"));
        }

        if cursor.starts_with(b"<![CDATA[") {
            if self.open.is_empty() {
                return Err(self.error("CDATA section outside of root element", start));
            }
            cursor.advance(9);
            let content_start = cursor.position();
            let Some(content_end) = cursor.find_sequence(b"]]>") else {
                return Ok(Step::Incomplete);
            };
            let content = self.utf8(cursor.slice(content_start, content_end), content_start)?;
            if !content.is_empty() {
                handler.text(content)?;
            }
            cursor.set_position(content_end + 3);
            return Ok(Step::Done);
        }

        if cursor.starts_with(b"<!DOCTYPE") {
            if self.seen_root {
                return Err(self.error("DOCTYPE after root element", start));
            }
            cursor.advance(9);
            return Ok(self.skip_doctype(cursor));
        }

        let could_grow = [b"<!--".as_slice(), b"<![CDATA[", b"<!DOCTYPE"]
            .iter()
            .any(|marker| cursor.is_prefix_of(marker));
        if could_grow {
            return Ok(Step::Incomplete);
        }
        Err(self.error("unsupported markup declaration", start))
    }

    fn scan_processing_instruction(&mut self, cursor: &mut Scanner<'_>) -> Result<Step> {
        let start = cursor.position();
        cursor.advance(2);
        if cursor.is_eof() {
            return Ok(Step::Incomplete);
        }
        if cursor.read_name().is_none() {
            return Err(self.error("processing instruction without target", start));
        }
        Ok(self.skip_past(cursor, b"?>"))
    }

    /// Skip DOCTYPE content, handling an internal subset and quoted literals
    fn skip_doctype(&self, cursor: &mut Scanner<'_>) -> Step {
        let mut depth = 0usize;
        let mut quote: Option<u8> = None;

        while let Some(c) = cursor.peek() {
            cursor.advance(1);
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(c),
                (None, b'[') => depth += 1,
                (None, b']') => depth = depth.saturating_sub(1),
                (None, b'>') if depth == 0 => return Step::Done,
                _ => {}
            }
        }
        Step::Incomplete
    }

    fn skip_past(&self, cursor: &mut Scanner<'_>, terminator: &[u8]) -> Step {
        match cursor.find_sequence(terminator) {
            Some(pos) => {
                cursor.set_position(pos + terminator.len());
                Step::Done
            }
            None => Step::Incomplete,
        }
    }

    fn scan_text<H: ScanHandler>(
        &mut self,
        cursor: &mut Scanner<'_>,
        is_final: bool,
        handler: &mut H,
    ) -> Result<Step> {
        let start = cursor.position();
        let end = match cursor.find_tag_start() {
            Some(end) => end,
            None if is_final => start + cursor.remaining().len(),
            None => return Ok(Step::Incomplete),
        };
        let raw = cursor.slice(start, end);
        cursor.set_position(end);

        if self.open.is_empty() {
            if raw.iter().all(|&b| is_whitespace(b)) {
                return Ok(Step::Done);
            }
            return Err(self.error("text outside of root element", start));
        }

        let content = self.decode(raw, start)?;
        handler.text(&content)?;
        Ok(Step::Done)
    }

    fn utf8<'b>(&self, raw: &'b [u8], local: usize) -> Result<&'b str> {
        std::str::from_utf8(raw).map_err(|e| self.error("invalid UTF-8", local + e.valid_up_to()))
    }

    fn decode<'b>(&self, raw: &'b [u8], local: usize) -> Result<Cow<'b, str>> {
        let text = self.utf8(raw, local)?;
        decode_text(text).map_err(|(at, message)| self.error(message, local + at))
    }

    fn error(&self, message: impl Into<String>, local: usize) -> Error {
        Error::malformed(message, self.offset + local)
    }
}

impl Default for EventScanner {
    fn default() -> Self {
        Self::new()
    }
}
