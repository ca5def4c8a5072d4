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

//! Implementation of the [`Writer`] type to write on-the-wire DNS
//! messages.

use std::collections::HashMap;
use std::fmt;

use super::constants::*;
use super::{Header, Question};
use crate::name::Name;
use crate::rr::rdata::Component;
use crate::rr::Record;

////////////////////////////////////////////////////////////////////////
// WRITER                                                             //
////////////////////////////////////////////////////////////////////////

/// A bounded, growable writer that serializes a DNS message.
///
/// A `Writer` appends to an internal buffer, up to a size limit fixed
/// at construction. All `try_*` methods fail with
/// [`Error::Truncation`] instead of exceeding the limit. On top of the
/// primitive append operations, the `Writer` provides
///
/// * positional backpatching ([`Writer::write_u16_at`]), used for
///   RDLENGTH fields and header rewrites;
/// * position marks ([`Writer::mark`]/[`Writer::rewind`]), used to
///   undo partially written records during message truncation;
/// * space reservation ([`Writer::reserve`]), used to hold room for a
///   trailing TSIG record; and
/// * domain-name emission with RFC 1035 pointer compression driven by
///   a table mapping each written name suffix to its earliest offset.
///
/// The compression behavior is controlled by [`CompressionMode`]; in
/// canonical mode names are lowercased and never compressed, as DNSSEC
/// and TSIG digesting require.
pub struct Writer {
    octets: Vec<u8>,
    limit: usize,
    reserved: usize,
    compression: HashMap<Name, u16>,
    mode: CompressionMode,
}

/// How a [`Writer`] may (when allowed by the DNS standard) compress and
/// fold domain names in a message.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CompressionMode {
    /// Perform standard compression. Case is preserved in the output,
    /// but compression matches suffixes case-insensitively.
    Standard,

    /// Do not compress domain names. However, note that
    /// [RFC 1123 § 6.1.2.4] requires name servers to use compression
    /// in responses, since it helps prevent truncation and retries
    /// over TCP.
    ///
    /// [RFC 1123 § 6.1.2.4]: https://datatracker.ietf.org/doc/html/rfc1123#section-6.1.2.4
    Disabled,

    /// Emit names uncompressed and lowercased, per the DNSSEC
    /// canonical form of [RFC 4034 § 6.2]. This is the form TSIG and
    /// signature digests are computed over.
    ///
    /// [RFC 4034 § 6.2]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.2
    Canonical,
}

impl Writer {
    /// Creates a new `Writer` with the given total size limit. This
    /// fails if the limit cannot accommodate a DNS message header.
    pub fn new(limit: usize) -> Result<Self> {
        if limit < HEADER_SIZE {
            Err(Error::Truncation)
        } else {
            Ok(Self {
                octets: Vec::with_capacity(limit.min(512)),
                limit: limit.min(MAX_MESSAGE_SIZE),
                reserved: 0,
                compression: HashMap::new(),
                mode: CompressionMode::Standard,
            })
        }
    }

    /// Configures how the `Writer` may compress domain names in the
    /// message. Changing this setting does not affect domain names
    /// already written.
    pub fn set_compression_mode(&mut self, mode: CompressionMode) {
        self.mode = mode;
    }

    /// Reserves `n` octets of the remaining space (e.g. for a TSIG
    /// record to be added at the end of the message). Fails if the
    /// space is not available.
    pub fn reserve(&mut self, n: usize) -> Result<()> {
        if self.octets.len() + self.reserved + n > self.limit {
            Err(Error::Truncation)
        } else {
            self.reserved += n;
            Ok(())
        }
    }

    /// Releases `n` previously [`reserve`](Writer::reserve)d octets.
    pub fn unreserve(&mut self, n: usize) {
        self.reserved = self.reserved.saturating_sub(n);
    }

    /// Returns the number of octets written so far.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    /// Returns the octets written so far. TSIG signing digests the
    /// message before the TSIG record is appended.
    pub fn as_slice(&self) -> &[u8] {
        &self.octets
    }

    /// Returns an opaque token for the current position.
    pub fn mark(&self) -> usize {
        self.octets.len()
    }

    /// Rewinds the output to a position previously obtained from
    /// [`Writer::mark`]. Compression-table entries pointing at or past
    /// the mark are dropped, since the octets they reference are gone.
    pub fn rewind(&mut self, mark: usize) {
        self.octets.truncate(mark);
        self.compression
            .retain(|_, offset| (*offset as usize) < mark);
    }

    /// Writes the message header. The header occupies the first twelve
    /// octets; if they have already been written, they are overwritten
    /// in place.
    pub fn write_header(&mut self, header: &Header) -> Result<()> {
        let encoded = header.encode();
        if self.octets.is_empty() {
            self.try_push(&encoded)
        } else {
            self.octets[0..HEADER_SIZE].copy_from_slice(&encoded);
            Ok(())
        }
    }

    /// Adds a question at the current position.
    pub fn add_question(&mut self, question: &Question) -> Result<()> {
        self.write_name(&question.qname, true)?;
        self.try_push_u16(question.qtype.into())?;
        self.try_push_u16(question.qclass.into())
    }

    /// Adds a resource record at the current position. The RDLENGTH
    /// field is backpatched after the (possibly compressed) RDATA is
    /// written.
    pub fn add_rr(&mut self, record: &Record) -> Result<()> {
        self.write_name(&record.owner, true)?;
        self.try_push_u16(record.rr_type.into())?;
        self.try_push_u16(record.class.into())?;
        self.try_push_u32(record.ttl.into())?;

        let rdlength_at = self.octets.len();
        self.try_push(&[0, 0])?;
        for component in record.rdata.components(record.class, record.rr_type) {
            match component.or(Err(Error::InvalidRdata))? {
                Component::CompressibleName(name) => self.write_name(&name, true)?,
                Component::UncompressibleName(name) => self.write_name(&name, false)?,
                Component::Other(octets) => self.try_push(octets)?,
            }
        }
        let rdlength = self.octets.len() - rdlength_at - 2;
        self.write_u16_at(rdlength_at, rdlength as u16);
        Ok(())
    }

    /// Finishes writing and returns the message octets.
    pub fn finish(self) -> Vec<u8> {
        self.octets
    }

    ////////////////////////////////////////////////////////////////////
    // NAME EMISSION                                                  //
    ////////////////////////////////////////////////////////////////////

    /// Writes a domain name at the current position. When compression
    /// is enabled and `compressible` is true, the longest suffix of
    /// the name already present in the message is replaced by a
    /// pointer, and newly written suffixes at pointer-representable
    /// offsets are recorded for later use.
    fn write_name(&mut self, name: &Name, compressible: bool) -> Result<()> {
        match self.mode {
            CompressionMode::Canonical => self.try_push(name.to_lowercase().wire_repr()),
            CompressionMode::Disabled => self.try_push(name.wire_repr()),
            CompressionMode::Standard if !compressible => self.try_push(name.wire_repr()),
            CompressionMode::Standard => {
                for skip in 0..name.len() - 1 {
                    let suffix = name.superdomain(skip).unwrap();
                    if let Some(&pointer) = self.compression.get(&suffix) {
                        self.try_push(name.wire_repr_to(skip))?;
                        return self.try_push_u16(0xc000 | pointer);
                    }
                    let offset = self.octets.len() + name.wire_repr_to(skip).len();
                    if offset <= POINTER_MAX {
                        self.compression.insert(suffix, offset as u16);
                    }
                }
                self.try_push(name.wire_repr())
            }
        }
    }

    ////////////////////////////////////////////////////////////////////
    // PRIMITIVE APPENDS                                              //
    ////////////////////////////////////////////////////////////////////

    /// Tries to append `data`, failing if there is not sufficient
    /// space.
    pub fn try_push(&mut self, data: &[u8]) -> Result<()> {
        if self.octets.len() + self.reserved + data.len() > self.limit {
            Err(Error::Truncation)
        } else {
            self.octets.extend_from_slice(data);
            Ok(())
        }
    }

    /// Tries to append a single octet, failing if there is not
    /// sufficient space.
    pub fn try_push_u8(&mut self, data: u8) -> Result<()> {
        self.try_push(&[data])
    }

    /// Tries to append `data` in network byte order, failing if there
    /// is not sufficient space.
    pub fn try_push_u16(&mut self, data: u16) -> Result<()> {
        self.try_push(&data.to_be_bytes())
    }

    /// Tries to append `data` in network byte order, failing if there
    /// is not sufficient space.
    pub fn try_push_u32(&mut self, data: u32) -> Result<()> {
        self.try_push(&data.to_be_bytes())
    }

    /// Tries to append a `<character-string>` (a one-octet length
    /// followed by up to 255 octets), failing if there is not
    /// sufficient space.
    pub fn try_push_character_string(&mut self, data: &[u8]) -> Result<()> {
        debug_assert!(data.len() <= u8::MAX as usize);
        self.try_push_u8(data.len() as u8)?;
        self.try_push(data)
    }

    /// Writes `data` in network byte order at `position`, which must
    /// already have been written. This is how RDLENGTH and EDNS option
    /// lengths are backpatched.
    pub fn write_u16_at(&mut self, position: usize, data: u16) {
        self.octets[position..position + 2].copy_from_slice(&data.to_be_bytes());
    }
}

impl fmt::Debug for Writer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Writer")
            .field("len", &self.octets.len())
            .field("limit", &self.limit)
            .field("reserved", &self.reserved)
            .field("mode", &self.mode)
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that a [`Writer`] operation could not be
/// performed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// There is not enough room left in the message.
    Truncation,

    /// The operation required parsing of RDATA, and it was found to be
    /// invalid.
    InvalidRdata,

    /// Adding the question or resource record(s) would overflow the
    /// corresponding 16-bit counter in the DNS header.
    CountOverflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Truncation => f.write_str("message would be truncated"),
            Self::InvalidRdata => f.write_str("invalid RDATA"),
            Self::CountOverflow => f.write_str("record count would overflow"),
        }
    }
}

impl std::error::Error for Error {}

/// The type returned by fallible [`Writer`] methods.
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::super::{Qclass, Qtype};
    use super::*;
    use crate::class::Class;
    use crate::rr::rdata::Rdata;
    use crate::rr::{Ttl, Type};

    fn question() -> Question {
        Question {
            qname: "quagmire.test.".parse().unwrap(),
            qtype: Qtype::from(Type::A),
            qclass: Qclass::from(Class::IN),
        }
    }

    fn a_record(owner: &str) -> Record {
        Record::new(
            owner.parse().unwrap(),
            Type::A,
            Class::IN,
            Ttl::from(3600),
            Rdata::new_a("127.0.0.1".parse().unwrap()),
        )
    }

    #[test]
    fn writer_works() {
        // This is not meant to be exhaustive by any means. Rather, it's
        // just a check that the Writer works in a basic scenario.
        let mut header = Header::with_id(0x0703);
        header.qr = true;
        header.aa = true;
        header.set_count(0, 1);
        header.set_count(1, 1);
        let mut writer = Writer::new(512).unwrap();
        writer.write_header(&header).unwrap();
        writer.add_question(&question()).unwrap();
        writer.add_rr(&a_record("quagmire.test.")).unwrap();
        assert_eq!(
            writer.finish(),
            b"\x07\x03\x84\x00\x00\x01\x00\x01\x00\x00\x00\x00\
              \x08quagmire\x04test\x00\x00\x01\x00\x01\
              \xc0\x0c\x00\x01\x00\x01\x00\x00\x0e\x10\x00\x04\
              \x7f\x00\x00\x01"
        );
    }

    #[test]
    fn owner_suffixes_are_compressed() {
        let mut writer = Writer::new(512).unwrap();
        writer.write_header(&Header::with_id(0)).unwrap();
        writer.add_rr(&a_record("ns1.example.com.")).unwrap();
        let mark = writer.len();
        writer.add_rr(&a_record("ns2.example.com.")).unwrap();
        let octets = writer.finish();
        // The second owner is written as the label "ns2" plus a
        // pointer to "example.com." inside the first owner.
        assert_eq!(&octets[mark..mark + 6], b"\x03ns2\xc0\x10");
    }

    #[test]
    fn compression_matches_suffixes_case_insensitively() {
        let mut writer = Writer::new(512).unwrap();
        writer.write_header(&Header::with_id(0)).unwrap();
        writer.add_rr(&a_record("ns1.example.com.")).unwrap();
        let mark = writer.len();
        writer.add_rr(&a_record("ns2.EXAMPLE.COM.")).unwrap();
        let octets = writer.finish();
        assert_eq!(&octets[mark..mark + 6], b"\x03ns2\xc0\x10");
    }

    #[test]
    fn names_in_rdata_are_compressed() {
        let exchange: Name = "mail.quagmire.test.".parse().unwrap();
        let mx = Record::new(
            "quagmire.test.".parse().unwrap(),
            Type::MX,
            Class::IN,
            Ttl::from(3600),
            Rdata::new_mx(10, &exchange),
        );
        let mut writer = Writer::new(512).unwrap();
        writer.write_header(&Header::with_id(0)).unwrap();
        writer.add_question(&question()).unwrap();
        writer.add_rr(&mx).unwrap();
        let octets = writer.finish();
        // Owner compresses to a pointer to the QNAME, and the exchange
        // compresses its "quagmire.test." suffix likewise.
        assert_eq!(
            &octets[HEADER_SIZE + 19..],
            b"\xc0\x0c\x00\x0f\x00\x01\x00\x00\x0e\x10\x00\x09\
              \x00\x0a\x04mail\xc0\x0c"
        );
    }

    #[test]
    fn uncompressible_names_are_not_compressed() {
        let target: Name = "quagmire.test.".parse().unwrap();
        let dname = Record::new(
            "quagmire.test.".parse().unwrap(),
            Type::DNAME,
            Class::IN,
            Ttl::from(3600),
            Rdata::new_dname(&target),
        );
        let mut writer = Writer::new(512).unwrap();
        writer.write_header(&Header::with_id(0)).unwrap();
        writer.add_question(&question()).unwrap();
        writer.add_rr(&dname).unwrap();
        let octets = writer.finish();
        // The DNAME target appears in full despite the earlier
        // occurrence of the same name.
        assert_eq!(
            &octets[HEADER_SIZE + 19..],
            b"\xc0\x0c\x00\x27\x00\x01\x00\x00\x0e\x10\x00\x0f\
              \x08quagmire\x04test\x00"
        );
    }

    #[test]
    fn canonical_mode_lowercases_and_never_compresses() {
        let mut writer = Writer::new(512).unwrap();
        writer.set_compression_mode(CompressionMode::Canonical);
        writer.write_header(&Header::with_id(0)).unwrap();
        writer.add_rr(&a_record("NS1.Example.COM.")).unwrap();
        writer.add_rr(&a_record("NS2.Example.COM.")).unwrap();
        let octets = writer.finish();
        assert_eq!(
            &octets[HEADER_SIZE..HEADER_SIZE + 17],
            b"\x03ns1\x07example\x03com\x00"
        );
        assert_eq!(
            &octets[HEADER_SIZE + 31..HEADER_SIZE + 48],
            b"\x03ns2\x07example\x03com\x00"
        );
    }

    #[test]
    fn limit_is_enforced() {
        let mut writer = Writer::new(20).unwrap();
        writer.write_header(&Header::with_id(0)).unwrap();
        assert_eq!(writer.add_question(&question()), Err(Error::Truncation));
    }

    #[test]
    fn reservation_reduces_available_space() {
        let mut writer = Writer::new(40).unwrap();
        writer.write_header(&Header::with_id(0)).unwrap();
        writer.reserve(25).unwrap();
        // 40 - 12 - 25 = 3 octets left; the question needs 19.
        assert_eq!(writer.add_question(&question()), Err(Error::Truncation));
        writer.unreserve(25);
        writer.add_question(&question()).unwrap();
    }

    #[test]
    fn rewind_discards_stale_compression_entries() {
        let mut writer = Writer::new(512).unwrap();
        writer.write_header(&Header::with_id(0)).unwrap();
        let mark = writer.mark();
        writer.add_rr(&a_record("ns1.example.com.")).unwrap();
        writer.rewind(mark);
        writer.add_rr(&a_record("ns2.example.com.")).unwrap();
        let octets = writer.finish();
        // No pointer may refer into the discarded record; the name is
        // written in full.
        assert_eq!(
            &octets[mark..mark + 21],
            b"\x03ns2\x07example\x03com\x00\x00\x01\x00\x01"
        );
    }

    #[test]
    fn writer_constructor_rejects_short_limits() {
        for limit in 0..HEADER_SIZE {
            assert!(matches!(Writer::new(limit), Err(Error::Truncation)));
        }
    }
}
