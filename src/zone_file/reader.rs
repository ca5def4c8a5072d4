// Copyright 2023 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! The zone-file tokenizer.
//!
//! This splits the input into logical lines of fields, processing the
//! lexical features of [RFC 1035 § 5.1] on the way: `;` comments,
//! parenthesized line continuation, quoted strings, and
//! backslash-escaping. Escape sequences are *not* decoded here; a
//! field's raw text is preserved, because how escapes are interpreted
//! depends on whether the field is a domain name, a
//! `<character-string>`, or something else. [`decode_escapes`]
//! performs the decoding for fields that need it.
//!
//! [RFC 1035 § 5.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-5.1

use std::io::{self, Read};

use super::error::{Error, ErrorKind, Position, Result};

////////////////////////////////////////////////////////////////////////
// FIELDS AND LOGICAL LINES                                           //
////////////////////////////////////////////////////////////////////////

/// One whitespace-separated field of a logical line. The text is raw:
/// escape sequences are preserved, and the surrounding quotes of a
/// quoted field are stripped (with `quoted` recording that they were
/// there).
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct Field {
    pub text: Vec<u8>,
    pub quoted: bool,
}

impl Field {
    /// Returns the field's text as UTF-8, if it is valid UTF-8. Fields
    /// holding numbers, type names, and the like go through this.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.text).ok()
    }
}

/// A logical line: one or more physical lines joined by parentheses,
/// split into fields.
#[derive(Clone, Debug)]
pub(super) struct LogicalLine {
    pub position: Position,
    pub leading_whitespace: bool,
    pub fields: Vec<Field>,
}

////////////////////////////////////////////////////////////////////////
// THE TOKENIZER                                                      //
////////////////////////////////////////////////////////////////////////

/// Tokenizes zone-file input into [`LogicalLine`]s.
///
/// The entire input is buffered at construction; zone files are small
/// compared to the zones built from them.
pub(super) struct Reader {
    octets: Vec<u8>,
    pos: usize,
    line: usize,
}

impl Reader {
    /// Creates a `Reader`, consuming the stream.
    pub fn new<S: Read>(mut stream: S) -> io::Result<Self> {
        let mut octets = Vec::new();
        stream.read_to_end(&mut octets)?;
        Ok(Self {
            octets,
            pos: 0,
            line: 1,
        })
    }

    /// Returns the next non-blank logical line, or `None` at the end
    /// of the input.
    pub fn next_line(&mut self) -> Result<Option<LogicalLine>> {
        loop {
            if self.pos >= self.octets.len() {
                return Ok(None);
            }

            let position = Position { line: self.line };
            let leading_whitespace = matches!(self.peek(), Some(b' ' | b'\t'));
            let mut fields = Vec::new();
            let mut paren_depth = 0usize;

            loop {
                match self.peek() {
                    None => {
                        if paren_depth > 0 {
                            return Err(Error::new(position, ErrorKind::UnbalancedParentheses));
                        }
                        break;
                    }
                    Some(b'\n') => {
                        self.advance();
                        self.line += 1;
                        if paren_depth == 0 {
                            break;
                        }
                    }
                    Some(b' ' | b'\t' | b'\r') => {
                        self.advance();
                    }
                    Some(b';') => {
                        self.skip_comment();
                    }
                    Some(b'(') => {
                        self.advance();
                        paren_depth += 1;
                    }
                    Some(b')') => {
                        if paren_depth == 0 {
                            return Err(Error::new(position, ErrorKind::UnbalancedParentheses));
                        }
                        self.advance();
                        paren_depth -= 1;
                    }
                    Some(b'"') => {
                        fields.push(self.read_quoted_field(position)?);
                    }
                    Some(_) => {
                        fields.push(self.read_unquoted_field());
                    }
                }
            }

            if !fields.is_empty() {
                return Ok(Some(LogicalLine {
                    position,
                    leading_whitespace,
                    fields,
                }));
            }
            // Blank line (or comment-only line); keep going.
        }
    }

    fn peek(&self) -> Option<u8> {
        self.octets.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Skips a `;` comment up to (but not including) the newline.
    fn skip_comment(&mut self) {
        while let Some(octet) = self.peek() {
            if octet == b'\n' {
                break;
            }
            self.advance();
        }
    }

    /// Reads a quoted field, stripping the quotes. Escaped characters
    /// (including `\"`) are kept raw in the field text.
    fn read_quoted_field(&mut self, position: Position) -> Result<Field> {
        self.advance(); // Consume the opening quote.
        let mut text = Vec::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    return Err(Error::new(position, ErrorKind::UnterminatedString))
                }
                Some(b'"') => {
                    self.advance();
                    return Ok(Field { text, quoted: true });
                }
                Some(b'\\') => {
                    text.push(b'\\');
                    self.advance();
                    if let Some(escaped) = self.peek() {
                        if escaped == b'\n' {
                            return Err(Error::new(position, ErrorKind::UnterminatedString));
                        }
                        text.push(escaped);
                        self.advance();
                    }
                }
                Some(octet) => {
                    text.push(octet);
                    self.advance();
                }
            }
        }
    }

    /// Reads an unquoted field. A backslash escapes the following
    /// character, so an escaped delimiter (say, `\(`) is field
    /// content; the backslash is kept raw in the field text.
    fn read_unquoted_field(&mut self) -> Field {
        let mut text = Vec::new();
        while let Some(octet) = self.peek() {
            match octet {
                b' ' | b'\t' | b'\r' | b'\n' | b';' | b'(' | b')' | b'"' => break,
                b'\\' => {
                    text.push(b'\\');
                    self.advance();
                    if let Some(escaped) = self.peek() {
                        if escaped == b'\n' {
                            break;
                        }
                        text.push(escaped);
                        self.advance();
                    }
                }
                _ => {
                    text.push(octet);
                    self.advance();
                }
            }
        }
        Field {
            text,
            quoted: false,
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ESCAPE DECODING                                                    //
////////////////////////////////////////////////////////////////////////

/// Decodes the [RFC 1035 § 5.1] escapes (`\X` and `\DDD`) in a field's
/// raw text, yielding the octets the field denotes. Used for
/// `<character-string>` fields; domain-name fields decode escapes as
/// part of name parsing.
///
/// [RFC 1035 § 5.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-5.1
pub(super) fn decode_escapes(raw: &[u8]) -> Option<Vec<u8>> {
    let mut decoded = Vec::with_capacity(raw.len());
    let mut remaining = raw;
    while let Some(&octet) = remaining.first() {
        if octet != b'\\' {
            decoded.push(octet);
            remaining = &remaining[1..];
            continue;
        }
        remaining = &remaining[1..];
        let &first = remaining.first()?;
        if first.is_ascii_digit() {
            if remaining.len() < 3
                || !remaining[1].is_ascii_digit()
                || !remaining[2].is_ascii_digit()
            {
                return None;
            }
            let value = (first - b'0') as u16 * 100
                + (remaining[1] - b'0') as u16 * 10
                + (remaining[2] - b'0') as u16;
            if value > 255 {
                return None;
            }
            decoded.push(value as u8);
            remaining = &remaining[3..];
        } else {
            decoded.push(first);
            remaining = &remaining[1..];
        }
    }
    Some(decoded)
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(input: &str) -> Reader {
        Reader::new(input.as_bytes()).unwrap()
    }

    fn field_texts(line: &LogicalLine) -> Vec<String> {
        line.fields
            .iter()
            .map(|field| String::from_utf8_lossy(&field.text).into_owned())
            .collect()
    }

    #[test]
    fn fields_are_split_on_whitespace() {
        let mut reader = reader("www  IN\tA 192.0.2.1\n");
        let line = reader.next_line().unwrap().unwrap();
        assert_eq!(field_texts(&line), ["www", "IN", "A", "192.0.2.1"]);
        assert!(!line.leading_whitespace);
        assert!(reader.next_line().unwrap().is_none());
    }

    #[test]
    fn leading_whitespace_is_reported() {
        let mut reader = reader("  IN A 192.0.2.1\n");
        let line = reader.next_line().unwrap().unwrap();
        assert!(line.leading_whitespace);
    }

    #[test]
    fn comments_are_skipped() {
        let mut reader = reader("www IN A 192.0.2.1 ; the web server\nmail IN A 192.0.2.2\n");
        assert_eq!(
            field_texts(&reader.next_line().unwrap().unwrap()),
            ["www", "IN", "A", "192.0.2.1"]
        );
        assert_eq!(
            field_texts(&reader.next_line().unwrap().unwrap()),
            ["mail", "IN", "A", "192.0.2.2"]
        );
    }

    #[test]
    fn parentheses_join_lines() {
        let mut reader = reader("@ IN SOA ns1 admin (\n  1 ; serial\n  2 3 4 5 )\n");
        let line = reader.next_line().unwrap().unwrap();
        assert_eq!(
            field_texts(&line),
            ["@", "IN", "SOA", "ns1", "admin", "1", "2", "3", "4", "5"]
        );
        assert_eq!(line.position.line, 1);
    }

    #[test]
    fn unbalanced_parentheses_are_rejected() {
        let mut reader = reader("@ IN SOA ns1 admin (1 2 3 4 5\n");
        assert!(reader.next_line().is_err());
        let mut reader = Reader::new(&b") oops\n"[..]).unwrap();
        assert!(reader.next_line().is_err());
    }

    #[test]
    fn quoted_fields_keep_spaces() {
        let mut reader = reader("txt IN TXT \"two words\" unquoted\n");
        let line = reader.next_line().unwrap().unwrap();
        assert_eq!(line.fields[3].text, b"two words");
        assert!(line.fields[3].quoted);
        assert!(!line.fields[4].quoted);
    }

    #[test]
    fn escaped_quotes_stay_in_quoted_fields() {
        let mut reader = reader("txt IN TXT \"say \\\"hi\\\"\"\n");
        let line = reader.next_line().unwrap().unwrap();
        assert_eq!(line.fields[3].text, b"say \\\"hi\\\"");
    }

    #[test]
    fn unterminated_strings_are_rejected() {
        let mut reader = reader("txt IN TXT \"oops\n");
        assert!(reader.next_line().is_err());
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        let mut reader = reader("\n; nothing here\n\nwww IN A 192.0.2.1\n");
        let line = reader.next_line().unwrap().unwrap();
        assert_eq!(line.position.line, 4);
    }

    #[test]
    fn decode_escapes_works() {
        assert_eq!(decode_escapes(b"plain").unwrap(), b"plain");
        assert_eq!(decode_escapes(b"a\\.b").unwrap(), b"a.b");
        assert_eq!(decode_escapes(b"\\065").unwrap(), b"A");
        assert_eq!(decode_escapes(b"\\\\").unwrap(), b"\\");
        assert!(decode_escapes(b"\\26").is_none());
        assert!(decode_escapes(b"\\999").is_none());
        assert!(decode_escapes(b"dangling\\").is_none());
    }
}
