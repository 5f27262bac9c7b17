//! XML Entity Decoding
//!
//! Handles the five predefined entities (`&lt; &gt; &amp; &quot; &apos;`)
//! and numeric character references (`&#123; &#x7B;`). Schema exports carry
//! no DTD, so any other named reference is a well-formedness error.
//!
//! Uses Cow for zero-copy when no entities are present.

use memchr::memchr;
use std::borrow::Cow;

/// Decode text or attribute content
///
/// Returns Borrowed if no entities present (zero-copy), Owned otherwise.
/// The error carries the byte offset of the offending `&` within `input`.
pub fn decode_text(input: &str) -> Result<Cow<'_, str>, (usize, &'static str)> {
    let bytes = input.as_bytes();
    if memchr(b'&', bytes).is_none() {
        return Ok(Cow::Borrowed(input));
    }

    let mut result = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(amp) = memchr(b'&', &bytes[pos..]) {
        let amp = pos + amp;
        result.push_str(&input[pos..amp]);

        let semi = memchr(b';', &bytes[amp..])
            .map(|offset| amp + offset)
            .ok_or((amp, "unterminated entity reference"))?;
        let decoded = decode_entity(&input[amp + 1..semi]).ok_or((amp, "unknown entity reference"))?;
        result.push(decoded);
        pos = semi + 1;
    }
    result.push_str(&input[pos..]);

    Ok(Cow::Owned(result))
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => decode_numeric_entity(entity.strip_prefix('#')?),
    }
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let codepoint = match entity.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => entity.parse::<u32>().ok()?,
    };
    if !is_valid_xml_char(codepoint) {
        return None;
    }
    char::from_u32(codepoint)
}

/// Check if a code point is a valid XML 1.0 Char
/// Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
#[inline]
pub fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}
