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

//! Implementation of the [`Reader`] type to read on-the-wire DNS
//! messages.

use std::fmt;

use super::constants::*;
use super::{Header, Question};
use crate::name::{self, Name};
use crate::rr::rdata::{Rdata, ReadRdataError};
use crate::rr::{Record, Ttl, Type};

////////////////////////////////////////////////////////////////////////
// READER                                                             //
////////////////////////////////////////////////////////////////////////

/// A "frame" around a buffer containing a DNS message that enables
/// reading the message data.
///
/// A `Reader` is constructed using its [`TryFrom`] implementation. Any
/// underlying buffer for a reader must contain at least a full DNS
/// message header of 12 octets; otherwise the construction will fail.
///
/// Since header information is in a fixed position, it can be read at
/// any time through [`Reader::header`]. For reading questions and RRs,
/// the [`Reader::read_question`] and [`Reader::read_rr`] methods are
/// provided. These read using a cursor, which is initially set to the
/// first octet after the DNS header. They must be called sequentially
/// to read any questions, and then any records, in the order they
/// appear in the message.
#[derive(Eq, PartialEq)]
pub struct Reader<'a> {
    octets: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    /// Parses the message header.
    pub fn header(&self) -> Header {
        // The constructor checked that a full header is present.
        Header::parse(self.octets).unwrap()
    }

    /// Returns the current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the portion of the message before the current cursor.
    /// TSIG verification uses this to obtain the message up to (but not
    /// including) the TSIG record.
    pub fn message_to_cursor(&self) -> &'a [u8] {
        &self.octets[..self.cursor]
    }

    /// Returns the message from `start` on, or an empty slice when
    /// `start` is past the end. Field reads bounds-check against the
    /// result instead of panicking on truncated messages.
    fn tail(&self, start: usize) -> &'a [u8] {
        self.octets.get(start..).unwrap_or(&[])
    }

    /// Reads a [`Question`] starting at the current cursor.
    ///
    /// This method is atomic, in that the cursor is not changed on
    /// failure.
    pub fn read_question(&mut self) -> Result<Question> {
        let (qname, qname_len) =
            Name::try_from_compressed(self.octets, self.cursor).map_err(Error::InvalidOwner)?;
        let qname_end = self.cursor + qname_len;
        let qtype = read_u16(self.tail(qname_end))?.into();
        let qclass = read_u16(self.tail(qname_end + 2))?.into();
        self.cursor += qname_len + 4;
        Ok(Question {
            qname,
            qtype,
            qclass,
        })
    }

    /// Reads a resource record at the current cursor.
    ///
    /// This method is atomic, in that the cursor is not changed on
    /// failure.
    pub fn read_rr(&mut self) -> Result<Record> {
        let (owner, owner_len) =
            Name::try_from_compressed(self.octets, self.cursor).map_err(Error::InvalidOwner)?;
        let owner_end = self.cursor + owner_len;
        let rr_type = Type::from(read_u16(self.tail(owner_end))?);
        let class = read_u16(self.tail(owner_end + 2))?.into();
        let raw_ttl = read_u32(self.tail(owner_end + 4))?;
        let rdlength = read_u16(self.tail(owner_end + 8))?;
        let rdata = Rdata::read(class, rr_type, self.octets, owner_end + 10, rdlength)?;
        // The TTL field of an OPT pseudo-record carries EDNS flags, so
        // the RFC 2181 clamping must not apply to it.
        let ttl = if rr_type == Type::OPT {
            Ttl::from_unchecked(raw_ttl)
        } else {
            Ttl::from(raw_ttl)
        };
        self.cursor = owner_end + 10 + rdlength as usize;
        Ok(Record {
            owner,
            rr_type,
            class,
            ttl,
            rdata: rdata.into_owned(),
        })
    }

    /// Skips a resource record at the current cursor without decoding
    /// its RDATA.
    ///
    /// This method is atomic, in that the cursor is not changed on
    /// failure.
    pub fn skip_rr(&mut self) -> Result<()> {
        let owner_len =
            Name::skip_compressed(self.tail(self.cursor)).map_err(Error::InvalidOwner)?;
        let owner_end = self.cursor + owner_len;
        let rdlength = read_u16(self.tail(owner_end + 8))? as usize;
        let end = owner_end + 10 + rdlength;
        if end > self.octets.len() {
            return Err(Error::UnexpectedEomInField);
        }
        self.cursor = end;
        Ok(())
    }

    /// Returns whether the `Reader`'s cursor has reached the end of the
    /// message.
    pub fn at_eom(&self) -> bool {
        self.cursor >= self.octets.len()
    }
}

impl<'a> TryFrom<&'a [u8]> for Reader<'a> {
    type Error = Error;

    fn try_from(octets: &'a [u8]) -> Result<Self> {
        if octets.len() >= HEADER_SIZE {
            Ok(Self {
                octets,
                cursor: HEADER_SIZE,
            })
        } else {
            Err(Error::HeaderTooShort)
        }
    }
}

impl fmt::Debug for Reader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Reader")
            .field("header", &self.header())
            .field("cursor", &self.cursor)
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////
// HELPERS FOR READING MULTI-BYTE INTEGERS                            //
////////////////////////////////////////////////////////////////////////

/// Reads a network-byte-order `u16` from the beginning of `octets`.
fn read_u16(octets: &[u8]) -> Result<u16> {
    let array = octets
        .get(0..2)
        .ok_or(Error::UnexpectedEomInField)?
        .try_into()
        .unwrap();
    Ok(u16::from_be_bytes(array))
}

/// Reads a network-byte-order `u32` from the beginning of `octets`.
fn read_u32(octets: &[u8]) -> Result<u32> {
    let array = octets
        .get(0..4)
        .ok_or(Error::UnexpectedEomInField)?
        .try_into()
        .unwrap();
    Ok(u32::from_be_bytes(array))
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that a [`Question`] or resource record could not
/// be read.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    HeaderTooShort,
    UnexpectedEomInField,
    InvalidOwner(name::Error),
    InvalidRdata(ReadRdataError),
}

impl From<ReadRdataError> for Error {
    fn from(err: ReadRdataError) -> Self {
        Self::InvalidRdata(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::HeaderTooShort => f.write_str("header too short"),
            Self::UnexpectedEomInField => f.write_str("unexpected end of message in field"),
            Self::InvalidOwner(err) => write!(f, "invalid owner: {}", err),
            Self::InvalidRdata(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

/// The type returned by fallible [`Reader`] methods.
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::super::{Opcode, Qclass, Qtype, Rcode};
    use super::*;
    use crate::class::Class;

    /// This is a reply to a query for example.com. IN NS to a recursive
    /// server, made on January 7, 2022.
    const EXAMPLE_COM_NS_MESSAGE: &[u8] =
        b"\xe2\xd7\x81\x80\x00\x01\x00\x02\x00\x00\x00\x01\x07\x65\x78\x61\
          \x6d\x70\x6c\x65\x03\x63\x6f\x6d\x00\x00\x02\x00\x01\xc0\x0c\x00\
          \x02\x00\x01\x00\x01\x50\xa2\x00\x14\x01\x61\x0c\x69\x61\x6e\x61\
          \x2d\x73\x65\x72\x76\x65\x72\x73\x03\x6e\x65\x74\x00\xc0\x0c\x00\
          \x02\x00\x01\x00\x01\x50\xa2\x00\x04\x01\x62\xc0\x2b\x00\x00\x29\
          \x10\x00\x00\x00\x00\x00\x00\x00";

    #[test]
    fn reader_works() {
        let mut reader = Reader::try_from(EXAMPLE_COM_NS_MESSAGE).unwrap();
        let expected_qname: Name = "example.com.".parse().unwrap();
        let expected_ns_a: Name = "a.iana-servers.net.".parse().unwrap();
        let expected_ns_b: Name = "b.iana-servers.net.".parse().unwrap();

        // Check the header.
        let header = reader.header();
        assert_eq!(header.id, 0xe2d7);
        assert!(header.qr);
        assert_eq!(header.opcode, Opcode::Query);
        assert!(!header.aa);
        assert!(!header.tc);
        assert!(header.rd);
        assert!(header.ra);
        assert_eq!(header.rcode, Rcode::NoError);
        assert_eq!(header.count(0), 1);
        assert_eq!(header.count(1), 2);
        assert_eq!(header.count(2), 0);
        assert_eq!(header.count(3), 1);

        // Check the question.
        let question = reader.read_question().unwrap();
        assert_eq!(question.qname, expected_qname);
        assert_eq!(question.qtype, Qtype::from(Type::NS));
        assert_eq!(question.qclass, Qclass::from(Class::IN));

        // Check the answers.
        let answer_1 = reader.read_rr().unwrap();
        assert_eq!(answer_1.owner, expected_qname);
        assert_eq!(answer_1.rr_type, Type::NS);
        assert_eq!(answer_1.class, Class::IN);
        assert_eq!(answer_1.ttl, Ttl::from(86178));
        assert_eq!(answer_1.rdata.octets(), expected_ns_a.wire_repr());
        let answer_2 = reader.read_rr().unwrap();
        assert_eq!(answer_2.owner, expected_qname);
        assert_eq!(answer_2.rr_type, Type::NS);
        assert_eq!(answer_2.class, Class::IN);
        assert_eq!(answer_2.ttl, Ttl::from(86178));
        assert_eq!(answer_2.rdata.octets(), expected_ns_b.wire_repr());

        // Check the OPT record.
        let opt = reader.read_rr().unwrap();
        assert_eq!(&opt.owner, Name::root());
        assert_eq!(opt.rr_type, Type::OPT);
        assert_eq!(opt.class, Class::from(4096));
        assert!(opt.rdata.is_empty());

        // And that should be it!
        assert!(reader.at_eom());
    }

    #[test]
    fn skip_rr_works() {
        let mut reader = Reader::try_from(EXAMPLE_COM_NS_MESSAGE).unwrap();
        reader.read_question().unwrap();
        reader.skip_rr().unwrap();
        let answer_2 = reader.read_rr().unwrap();
        assert_eq!(
            answer_2.rdata.octets(),
            "b.iana-servers.net."
                .parse::<Name>()
                .unwrap()
                .wire_repr()
        );
    }

    #[test]
    fn reader_constructor_rejects_short_message() {
        for size in 0..HEADER_SIZE {
            let buf = vec![0; size];
            assert_eq!(Reader::try_from(buf.as_slice()), Err(Error::HeaderTooShort));
        }
    }
}
