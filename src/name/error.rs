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

//! The error type for domain-name operations.

use std::fmt;

/// An error encountered while constructing or parsing a
/// [`Name`](super::Name).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// A label exceeds 63 octets.
    LabelTooLong,

    /// The name's uncompressed on-the-wire form exceeds 255 octets.
    NameTooLong,

    /// The data ended in the middle of the name.
    UnexpectedEom,

    /// There was data left over after the name, and the operation
    /// required the name to occupy the whole buffer.
    ExtraData,

    /// A compression pointer did not point to an earlier position in
    /// the message.
    InvalidPointer,

    /// Decompression followed more pointers than the implementation
    /// allows.
    TooManyPointers,

    /// An empty string cannot be parsed as a domain name.
    StrEmpty,

    /// The string contains non-ASCII characters.
    StrNotAscii,

    /// The string does not end with a dot (the name is not fully
    /// qualified).
    NonNullTerminal,

    /// An empty label occurred somewhere other than the end of the
    /// name.
    NullNonTerminal,

    /// An invalid escape sequence was found.
    InvalidEscape,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::LabelTooLong => f.write_str("label exceeds 63 octets"),
            Self::NameTooLong => f.write_str("name exceeds 255 octets"),
            Self::UnexpectedEom => f.write_str("unexpected end of data in name"),
            Self::ExtraData => f.write_str("extra data after name"),
            Self::InvalidPointer => f.write_str("compression pointer does not point backward"),
            Self::TooManyPointers => f.write_str("too many compression pointers"),
            Self::StrEmpty => f.write_str("empty string"),
            Self::StrNotAscii => f.write_str("string is not ASCII"),
            Self::NonNullTerminal => f.write_str("name is not fully qualified"),
            Self::NullNonTerminal => f.write_str("empty non-terminal label"),
            Self::InvalidEscape => f.write_str("invalid escape sequence"),
        }
    }
}

impl std::error::Error for Error {}
