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

//! Error reporting for zone-file parsing.

use std::fmt;
use std::io;

use crate::name;

/// A position in a zone file, for error reporting. Since logical lines
/// may span physical lines, the line of the start of the logical line
/// is reported.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Position {
    pub line: usize,
}

/// An error produced while parsing a zone file.
#[derive(Debug)]
pub struct Error {
    position: Position,
    kind: ErrorKind,
}

impl Error {
    pub(super) fn new(position: Position, kind: ErrorKind) -> Self {
        Self { position, kind }
    }

    /// Returns the position at which the error occurred.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.position.line, self.kind)
    }
}

impl std::error::Error for Error {}

/// The kinds of errors produced while parsing a zone file.
#[derive(Debug)]
pub enum ErrorKind {
    /// Reading the underlying stream failed.
    Io(io::Error),

    /// A `(` was never closed.
    UnbalancedParentheses,

    /// A quoted string was never closed.
    UnterminatedString,

    /// The line ended where another field was expected.
    UnexpectedEol,

    /// There were fields left over at the end of the line.
    TrailingFields,

    /// A domain name field was invalid.
    BadName(name::Error),

    /// A numeric field was invalid.
    BadNumber,

    /// A TTL field was invalid.
    BadTtl,

    /// An escape sequence was invalid.
    BadEscape,

    /// The record type field was not recognized.
    UnknownType,

    /// The class field was not recognized.
    UnknownClass,

    /// A relative domain name was used with no origin in effect.
    NoOrigin,

    /// A record with no owner field appeared before any record with
    /// one.
    NoPreviousOwner,

    /// A record with no TTL field appeared with no default or previous
    /// TTL in effect.
    NoTtl,

    /// The RDATA did not match the record type's presentation format.
    BadRdata(&'static str),

    /// An unknown `$` directive was found.
    UnknownDirective,

    /// An `$INCLUDE` directive was found, but the caller does not
    /// support inclusion.
    IncludeNotSupported,

    /// A `$GENERATE` directive was malformed.
    BadGenerate(&'static str),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::UnbalancedParentheses => f.write_str("unbalanced parentheses"),
            Self::UnterminatedString => f.write_str("unterminated quoted string"),
            Self::UnexpectedEol => f.write_str("unexpected end of line"),
            Self::TrailingFields => f.write_str("extra fields at end of line"),
            Self::BadName(e) => write!(f, "invalid domain name: {}", e),
            Self::BadNumber => f.write_str("invalid number"),
            Self::BadTtl => f.write_str("invalid TTL"),
            Self::BadEscape => f.write_str("invalid escape sequence"),
            Self::UnknownType => f.write_str("unknown RR type"),
            Self::UnknownClass => f.write_str("unknown class"),
            Self::NoOrigin => f.write_str("relative name with no origin in effect"),
            Self::NoPreviousOwner => f.write_str("no previous owner"),
            Self::NoTtl => f.write_str("no TTL and no default in effect"),
            Self::BadRdata(detail) => write!(f, "invalid RDATA: {}", detail),
            Self::UnknownDirective => f.write_str("unknown directive"),
            Self::IncludeNotSupported => f.write_str("$INCLUDE is not supported here"),
            Self::BadGenerate(detail) => write!(f, "invalid $GENERATE: {}", detail),
        }
    }
}

/// The type returned by fallible zone-file operations.
pub type Result<T> = std::result::Result<T, Error>;
