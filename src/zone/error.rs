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

//! The error type for zone operations.

use std::fmt;

use crate::rr::RrsetListAddError;

/// An error encountered while building or validating a
/// [`Zone`](super::Zone).
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The record's owner is not at or below the zone's origin.
    NotInZone,

    /// The record's class does not match the zone's class.
    ClassMismatch,

    /// The record's TTL does not match other records in its RRset.
    TtlMismatch,

    /// The zone has no SOA record at its origin.
    NoSoa,

    /// The zone has more than one SOA record at its origin.
    MultipleSoas,

    /// The zone has no NS records at its origin.
    NoNs,
}

impl From<RrsetListAddError> for Error {
    fn from(err: RrsetListAddError) -> Self {
        match err {
            RrsetListAddError::ClassMismatch => Self::ClassMismatch,
            RrsetListAddError::TtlMismatch => Self::TtlMismatch,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::NotInZone => f.write_str("record is not within the zone"),
            Self::ClassMismatch => f.write_str("CLASS mismatch"),
            Self::TtlMismatch => f.write_str("TTL mismatch"),
            Self::NoSoa => f.write_str("no SOA record at the zone origin"),
            Self::MultipleSoas => f.write_str("more than one SOA record at the zone origin"),
            Self::NoNs => f.write_str("no NS records at the zone origin"),
        }
    }
}

impl std::error::Error for Error {}
