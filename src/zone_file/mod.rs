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

//! Parsing of the [RFC 1035 § 5] zone file format.
//!
//! This module provides the [`Parser`] structure, which accepts a
//! stream implementing the [`Read`] trait. It can subsequently be
//! iterated over to read DNS records stored in [RFC 1035 § 5] format.
//! The `$ORIGIN`, `$TTL`, and `$GENERATE` directives are processed
//! internally; `$INCLUDE` directives are reported to the caller, who
//! knows how to resolve paths. To receive only records (treating
//! `$INCLUDE` as an error), call [`Parser::records_only`], which
//! converts the [`Parser`] into a [`RecordsOnly`] iterator.
//!
//! Errors (which may be I/O errors or syntax errors) are reported
//! through the [`Error`] type. Iteration ends and parsing cannot be
//! continued after an error is returned.
//!
//! ```
//! use std::io::Cursor;
//! use quagmire::rr::Type;
//! use quagmire::zone_file::Parser;
//!
//! const ZONE_FILE: &[u8] = br#"
//! $ORIGIN quagmire.test.
//! $TTL 86400
//! @   IN SOA ns1 admin (
//!     123     ; SERIAL
//!     3600    ; REFRESH
//!     900     ; RETRY
//!     86400   ; EXPIRE
//!     3600    ; MINIMUM
//! )
//!     IN NS ns1
//! ns1 IN A 127.0.0.1
//!     IN AAAA ::1
//! "#;
//!
//! let mut parser = Parser::new(Cursor::new(ZONE_FILE)).records_only();
//! assert_eq!(parser.next().unwrap().unwrap().rr_type, Type::SOA);
//! assert_eq!(parser.next().unwrap().unwrap().rr_type, Type::NS);
//! assert_eq!(parser.next().unwrap().unwrap().rr_type, Type::A);
//! assert_eq!(parser.next().unwrap().unwrap().rr_type, Type::AAAA);
//! assert!(parser.next().is_none());
//! ```
//!
//! [RFC 1035 § 5]: https://datatracker.ietf.org/doc/html/rfc1035#section-5

use std::collections::VecDeque;
use std::io::Read;

use crate::class::Class;
use crate::name::Name;
use crate::rr::{Rdata, Ttl, Type};

mod directive;
pub mod error;
mod reader;
mod record;

use directive::GenerateRange;
pub use error::{Error, ErrorKind, Position, Result};
use reader::{Field, LogicalLine, Reader};

////////////////////////////////////////////////////////////////////////
// STRUCTURES                                                         //
////////////////////////////////////////////////////////////////////////

/// A parser for [RFC 1035 § 5] DNS zone files.
///
/// A `Parser` accepts a stream implementing [`Read`] and can then be
/// iterated to read DNS records and `$INCLUDE` directives from the
/// stream. See the [module-level documentation](self) for details and
/// example usage.
///
/// [RFC 1035 § 5]: https://datatracker.ietf.org/doc/html/rfc1035#section-5
pub struct Parser {
    reader: Option<Reader>,
    io_error: Option<std::io::Error>,
    error: bool,
    context: Context,
    generated: VecDeque<ParsedRr>,
}

/// Tracks the parse context of a [`Parser`].
///
/// Zone files have a number of context-dependent features. An `@`
/// symbol can be used as a shorthand for the current origin (set with
/// `$ORIGIN`), and partially qualified domain names are interpreted
/// relative to the origin. Default TTLs can be set with `$TTL`, and
/// omitted TTLs otherwise default to the previous record's TTL.
/// Omitted classes default to the previous record's class. Omitted
/// owner names default to the previous owner. This structure
/// encapsulates all this information.
#[derive(Clone, Default)]
pub(self) struct Context {
    pub origin: Option<Name>,
    pub previous_owner: Option<Name>,
    pub previous_ttl: Option<Ttl>,
    pub previous_class: Option<Class>,
    pub default_ttl: Option<Ttl>,
}

/// A line parsed from a zone file, as returned by [`Parser::next`].
///
/// This actually represents a logical line; if parentheses are used,
/// it may be several physical lines in the file. Furthermore, only
/// lines that require the caller's attention (records and `$INCLUDE`
/// directives) are returned. Blank lines and `$TTL` directives, for
/// instance, are processed internally and are not reported through
/// this data type.
#[derive(Clone, Debug)]
pub enum Line {
    Include(Include),
    Record(ParsedRr),
}

/// A parsed `$INCLUDE` directive.
#[derive(Clone, Debug)]
pub struct Include {
    pub line: usize,
    pub path: Vec<u8>,
    pub origin: Option<Name>,
}

/// Parsed resource record data.
#[derive(Clone, Debug)]
pub struct ParsedRr {
    pub line: usize,
    pub owner: Name,
    pub ttl: Ttl,
    pub class: Class,
    pub rr_type: Type,
    pub rdata: Box<Rdata>,
}

////////////////////////////////////////////////////////////////////////
// PARSER CONSTRUCTION AND ITERATION                                  //
////////////////////////////////////////////////////////////////////////

impl Parser {
    /// Creates a new [`Parser`] to read a zone file from the provided
    /// stream. The stream is consumed up front; any I/O error is
    /// reported on the first iteration.
    pub fn new<S: Read>(stream: S) -> Self {
        let (reader, io_error) = match Reader::new(stream) {
            Ok(reader) => (Some(reader), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            reader,
            io_error,
            error: false,
            context: Context::default(),
            generated: VecDeque::new(),
        }
    }

    /// Sets the initial origin for relative names. (Equivalent to the
    /// file starting with an `$ORIGIN` directive.)
    pub fn set_origin(&mut self, origin: Name) {
        self.context.origin = Some(origin);
    }

    /// Converts this [`Parser`] into an iterator that produces only
    /// resource records. Any `$INCLUDE` directives found will trigger
    /// an ["include not supported"](ErrorKind::IncludeNotSupported)
    /// error.
    pub fn records_only(self) -> RecordsOnly {
        RecordsOnly { parser: self }
    }

    /// Fetches the next raw logical line, for single-record parsing.
    pub(self) fn next_record_line(&mut self) -> Result<Option<LogicalLine>> {
        if let Some(e) = self.io_error.take() {
            return Err(Error::new(Position { line: 0 }, ErrorKind::Io(e)));
        }
        self.reader.as_mut().unwrap().next_line()
    }

    /// An internal helper to parse lines until one with returnable
    /// data is found.
    fn parse_lines_until_returnable_data_found(&mut self) -> Result<Option<Line>> {
        if let Some(e) = self.io_error.take() {
            return Err(Error::new(Position { line: 0 }, ErrorKind::Io(e)));
        }
        loop {
            if let Some(generated) = self.generated.pop_front() {
                return Ok(Some(Line::Record(generated)));
            }
            let line = match self.reader.as_mut().unwrap().next_line()? {
                Some(line) => line,
                None => return Ok(None),
            };
            if !line.leading_whitespace && line.fields[0].text.starts_with(b"$") {
                if let Some(include) = self.parse_directive(&line)? {
                    return Ok(Some(Line::Include(include)));
                }
            } else {
                let record = record::parse_record(&line, &mut self.context)?;
                return Ok(Some(Line::Record(record)));
            }
        }
    }

    /// Processes a `$` directive, returning an [`Include`] when the
    /// caller must act on it.
    fn parse_directive(&mut self, line: &LogicalLine) -> Result<Option<Include>> {
        let position = line.position;
        let directive = line.fields[0]
            .as_str()
            .map(str::to_ascii_uppercase)
            .ok_or_else(|| Error::new(position, ErrorKind::UnknownDirective))?;
        let mut fields = record::Fields::new(
            &line.fields[1..],
            position,
            self.context.origin.as_ref(),
        );
        match directive.as_str() {
            "$ORIGIN" => {
                let origin = fields.name()?;
                fields.finish()?;
                self.context.origin = Some(origin);
                Ok(None)
            }
            "$TTL" => {
                let ttl = fields.time()?;
                fields.finish()?;
                self.context.default_ttl = Some(Ttl::from(ttl));
                Ok(None)
            }
            "$INCLUDE" => {
                let path = fields.next()?.text.clone();
                let origin = if fields.is_empty() {
                    self.context.origin.clone()
                } else {
                    Some(fields.name()?)
                };
                fields.finish()?;
                Ok(Some(Include {
                    line: position.line,
                    path,
                    origin,
                }))
            }
            "$GENERATE" => {
                self.parse_generate(line)?;
                Ok(None)
            }
            _ => Err(Error::new(position, ErrorKind::UnknownDirective)),
        }
    }

    /// Expands a `$GENERATE` directive into the pending record queue.
    fn parse_generate(&mut self, line: &LogicalLine) -> Result<()> {
        let position = line.position;
        let malformed = |detail| Error::new(position, ErrorKind::BadGenerate(detail));

        // $GENERATE range lhs [ttl] [class] type rhs
        let fields = &line.fields[1..];
        if fields.len() < 4 {
            return Err(malformed("too few fields"));
        }
        let range_text = fields[0]
            .as_str()
            .ok_or_else(|| malformed("malformed range"))?;
        let range = GenerateRange::parse(range_text, position)?;
        let lhs = fields[1]
            .as_str()
            .ok_or_else(|| malformed("malformed owner template"))?
            .to_owned();
        let rhs = fields[fields.len() - 1]
            .as_str()
            .ok_or_else(|| malformed("malformed RDATA template"))?
            .to_owned();
        let middle = &fields[2..fields.len() - 1];

        for value in range.values() {
            // Build a synthetic record line and run it through the
            // ordinary record parser.
            let owner = directive::substitute(&lhs, value, position)?;
            let rdata = directive::substitute(&rhs, value, position)?;
            let mut synthetic: Vec<Field> = Vec::with_capacity(middle.len() + 2);
            synthetic.push(Field {
                text: owner.into_bytes(),
                quoted: false,
            });
            synthetic.extend(middle.iter().cloned());
            synthetic.push(Field {
                text: rdata.into_bytes(),
                quoted: false,
            });
            let synthetic_line = LogicalLine {
                position,
                leading_whitespace: false,
                fields: synthetic,
            };
            let record = record::parse_record(&synthetic_line, &mut self.context)?;
            self.generated.push_back(record);
        }
        Ok(())
    }
}

impl Iterator for Parser {
    type Item = Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error {
            // We don't try to guarantee that internal state is
            // consistent after an error. Hence, if an error has
            // already occurred, we stop immediately.
            return None;
        }

        match self.parse_lines_until_returnable_data_found() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => None,
            Err(e) => {
                self.error = true;
                Some(Err(e))
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////
// RECORDS-ONLY ITERATOR                                              //
////////////////////////////////////////////////////////////////////////

/// An iterator that parses only resource records from a zone file and
/// returns an [error](ErrorKind::IncludeNotSupported) if an `$INCLUDE`
/// directive is found. See [`Parser::records_only`].
pub struct RecordsOnly {
    parser: Parser,
}

impl Iterator for RecordsOnly {
    type Item = Result<ParsedRr>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.parser.next() {
            Some(Ok(Line::Record(rr))) => Some(Ok(rr)),
            Some(Ok(Line::Include(include))) => {
                // We set the error flag on the underlying parser so
                // that iteration ends.
                self.parser.error = true;
                Some(Err(Error::new(
                    Position { line: include.line },
                    ErrorKind::IncludeNotSupported,
                )))
            }
            Some(Err(e)) => Some(Err(e)),
            None => None,
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn make_parser(data: &[u8]) -> Parser {
        Parser::new(Cursor::new(data))
    }

    #[test]
    fn context_carries_owner_ttl_and_class() {
        let input = b"\
$ORIGIN quagmire.test.
$TTL 3600
www IN A 192.0.2.1
    A 192.0.2.2
";
        let mut parser = make_parser(input).records_only();
        let first = parser.next().unwrap().unwrap();
        let second = parser.next().unwrap().unwrap();
        assert!(parser.next().is_none());
        assert_eq!(first.owner, second.owner);
        assert_eq!(second.class, Class::IN);
        assert_eq!(second.ttl, Ttl::from(3600));
        assert_eq!(second.rdata.octets(), b"\xc0\x00\x02\x02");
    }

    #[test]
    fn relative_names_resolve_against_the_origin() {
        let input = b"\
$ORIGIN quagmire.test.
mail 300 IN MX 10 mx1
";
        let mut parser = make_parser(input).records_only();
        let record = parser.next().unwrap().unwrap();
        assert_eq!(record.owner, "mail.quagmire.test.".parse().unwrap());
        let (_, exchange) = record.rdata.u16_and_name().unwrap();
        assert_eq!(exchange, "mx1.quagmire.test.".parse().unwrap());
    }

    #[test]
    fn relative_names_without_an_origin_are_rejected() {
        let mut parser = make_parser(b"www 300 IN A 192.0.2.1\n").records_only();
        assert!(parser.next().unwrap().is_err());
    }

    #[test]
    fn includes_are_reported() {
        let input = b"\
$ORIGIN quagmire.test.
$INCLUDE sub.zone sub
";
        let mut parser = make_parser(input);
        match parser.next().unwrap().unwrap() {
            Line::Include(include) => {
                assert_eq!(include.path, b"sub.zone");
                assert_eq!(include.origin, Some("sub.quagmire.test.".parse().unwrap()));
            }
            other => panic!("expected an include, got {:?}", other),
        }
    }

    #[test]
    fn records_only_rejects_includes() {
        let mut parser = make_parser(b"$INCLUDE sub.zone\n").records_only();
        let error = parser.next().unwrap().unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::IncludeNotSupported));
        assert!(parser.next().is_none());
    }

    #[test]
    fn generate_expands_templates() {
        let input = b"\
$ORIGIN 10.0.192.in-addr.arpa.
$TTL 300
$GENERATE 1-4 $ IN PTR host-${0,3}.quagmire.test.
";
        let parser = make_parser(input).records_only();
        let records: Vec<ParsedRr> = parser.map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 4);
        assert_eq!(
            records[0].owner,
            "1.10.0.192.in-addr.arpa.".parse().unwrap()
        );
        assert_eq!(records[0].rr_type, Type::PTR);
        assert_eq!(
            records[0].rdata.single_name(),
            Some("host-001.quagmire.test.".parse().unwrap())
        );
        assert_eq!(
            records[3].rdata.single_name(),
            Some("host-004.quagmire.test.".parse().unwrap())
        );
    }

    #[test]
    fn unknown_directives_are_rejected() {
        let mut parser = make_parser(b"$BOGUS 1\n").records_only();
        assert!(matches!(
            parser.next().unwrap().unwrap_err().kind(),
            ErrorKind::UnknownDirective
        ));
    }

    #[test]
    fn errors_end_iteration() {
        let mut parser = make_parser(b"not-a-record\nwww 300 IN A 192.0.2.1\n").records_only();
        assert!(parser.next().unwrap().is_err());
        assert!(parser.next().is_none());
    }

    #[test]
    fn a_zone_can_be_loaded_from_a_file() {
        use crate::zone::Zone;

        let input = b"\
$ORIGIN quagmire.test.
$TTL 3600
@    IN SOA ns1 admin ( 123 3600 900 86400 300 )
     IN NS ns1
ns1  IN A 127.0.0.1
www  IN CNAME ns1
";
        let origin: Name = "quagmire.test.".parse().unwrap();
        let mut zone = Zone::new(origin, Class::IN);
        for record in make_parser(input).records_only() {
            let record = record.unwrap();
            zone.add(
                &record.owner,
                record.rr_type,
                record.class,
                record.ttl,
                &record.rdata,
            )
            .unwrap();
        }
        zone.validate().unwrap();
    }
}
