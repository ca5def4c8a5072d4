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

//! Implementation of RRset-related data structures.

use std::fmt;
use std::iter::FusedIterator;

use super::rdata::Rdata;
use super::{Record, Ttl, Type};
use crate::class::Class;
use crate::name::Name;

////////////////////////////////////////////////////////////////////////
// RRSETS                                                             //
////////////////////////////////////////////////////////////////////////

/// A set of resource records sharing an owner, class, and type.
///
/// [RFC 2181 § 5] defined an RRset as a group of records with the same
/// owner, class, and type, and also stipulated that all records in an
/// RRset have the same TTL. DNS data is looked up and transferred
/// RRset by RRset, so this is the unit the zone and cache layers work
/// in. Multiple records are stored in the same `Rrset` structure by
/// setting their common fields and then pushing their [`Rdata`]s, one
/// for each record.
///
/// Two wrinkles, both following later specifications:
///
/// * RRSIG/SIG records covering the set's type are kept alongside the
///   data as "signature siblings" (see [`Rrset::sigs`]), since DNSSEC
///   treats the signatures as traveling with the data they cover.
/// * When records with differing TTLs are merged into one set, the
///   minimum TTL wins, per [RFC 2181 § 5.2].
///
/// [RFC 2181 § 5]: https://datatracker.ietf.org/doc/html/rfc2181#section-5
/// [RFC 2181 § 5.2]: https://datatracker.ietf.org/doc/html/rfc2181#section-5.2
#[derive(Clone)]
pub struct Rrset {
    pub owner: Name,
    pub rr_type: Type,
    pub class: Class,
    pub ttl: Ttl,
    rdatas: Vec<u8>,
    sigs: Vec<Box<Rdata>>,
}

impl Rrset {
    /// Creates a new `Rrset` with the given owner, RR type, class, and
    /// TTL. It will initially contain no record data.
    pub fn new(owner: Name, rr_type: Type, class: Class, ttl: Ttl) -> Self {
        Self {
            owner,
            rr_type,
            class,
            ttl,
            rdatas: Vec::new(),
            sigs: Vec::new(),
        }
    }

    /// Creates a new `Rrset` containing (only) the given record. A
    /// signature record starts a set of its covered type.
    pub fn from_record(record: &Record) -> Self {
        let mut rrset = Self::new(
            record.owner.clone(),
            record.rrset_type(),
            record.class,
            record.ttl,
        );
        rrset.absorb(record);
        rrset
    }

    /// Adds a record to this `Rrset`. This fails if the record does not
    /// belong to this set (same owner, class, and RRset type). A TTL
    /// lower than the set's current TTL lowers the set's TTL.
    pub fn add_record(&mut self, record: &Record) -> Result<(), WrongRrsetError> {
        if record.rrset_type() != self.rr_type
            || record.class != self.class
            || record.owner != self.owner
        {
            return Err(WrongRrsetError);
        }
        if record.ttl < self.ttl {
            self.ttl = record.ttl;
        }
        self.absorb(record);
        Ok(())
    }

    /// Files the record's RDATA into the data or signature sequence.
    fn absorb(&mut self, record: &Record) {
        if record.rr_type == Type::RRSIG || record.rr_type == Type::SIG {
            self.sigs.push(record.rdata.clone());
        } else {
            self.push_rdata(&record.rdata);
        }
    }

    /// Adds an [`Rdata`] to this `Rrset`. Following the behavior of
    /// other DNS implementations, we silently discard [`Rdata`] that is
    /// already present in the `Rrset`.
    pub fn push_rdata(&mut self, rdata: &Rdata) {
        for existing_rdata in self.rdatas() {
            if rdata.equals(existing_rdata, self.class, self.rr_type) {
                return;
            }
        }
        self.rdatas.reserve(2 + rdata.len());
        self.rdatas
            .extend_from_slice(&(rdata.len() as u16).to_ne_bytes());
        self.rdatas.extend_from_slice(rdata);
    }

    /// Returns an iterator over the [`Rdata`] of this `Rrset`.
    pub fn rdatas(&self) -> RdataIterator {
        RdataIterator {
            cursor: &self.rdatas,
        }
    }

    /// Returns an iterator over the covering signature RDATAs of this
    /// `Rrset` (RRSIG/SIG records whose type covered is the set's
    /// type).
    pub fn sigs(&self) -> impl Iterator<Item = &Rdata> {
        self.sigs.iter().map(AsRef::as_ref)
    }

    /// Returns the number of data records in this `Rrset`.
    pub fn len(&self) -> usize {
        self.rdatas().count()
    }

    /// Returns whether this `Rrset` holds no data records. (It may
    /// still hold signatures.)
    pub fn is_empty(&self) -> bool {
        self.rdatas.is_empty()
    }

    /// Materializes the data records of this `Rrset`.
    pub fn records(&self) -> Vec<Record> {
        self.rdatas()
            .map(|rdata| {
                Record::new(
                    self.owner.clone(),
                    self.rr_type,
                    self.class,
                    self.ttl,
                    rdata.to_owned(),
                )
            })
            .collect()
    }

    /// Returns the first data record of this `Rrset`, if any.
    pub fn first(&self) -> Option<Record> {
        self.rdatas().next().map(|rdata| {
            Record::new(
                self.owner.clone(),
                self.rr_type,
                self.class,
                self.ttl,
                rdata.to_owned(),
            )
        })
    }
}

impl fmt::Debug for Rrset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Rrset")
            .field("owner", &self.owner)
            .field("rr_type", &self.rr_type)
            .field("class", &self.class)
            .field("ttl", &self.ttl)
            .field("len", &self.len())
            .field("sigs", &self.sigs.len())
            .finish()
    }
}

/// An iterator over the [`Rdata`] of an [`Rrset`].
pub struct RdataIterator<'a> {
    cursor: &'a [u8],
}

impl<'a> Iterator for RdataIterator<'a> {
    type Item = &'a Rdata;

    fn next(&mut self) -> Option<Self::Item> {
        let len_octets: &[u8; 2] = self.cursor.get(0..2)?.try_into().ok()?;
        let len = u16::from_ne_bytes(*len_octets) as usize;
        if let Some(rdata) = self.cursor.get(2..len + 2) {
            self.cursor = &self.cursor[len + 2..];
            Some(Rdata::from_unchecked(rdata))
        } else {
            None
        }
    }
}

impl FusedIterator for RdataIterator<'_> {}

/// An error signaling that a record cannot be added to an [`Rrset`]
/// because its owner, class, or RRset type does not match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WrongRrsetError;

impl fmt::Display for WrongRrsetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("record does not belong to this RRset")
    }
}

impl std::error::Error for WrongRrsetError {}

////////////////////////////////////////////////////////////////////////
// RRSET LISTS                                                        //
////////////////////////////////////////////////////////////////////////

/// A data structure to contain all of the [`Rrset`]s of various
/// [`Type`]s at a node in the DNS tree hierarchy. Individual records
/// are added using the [`RrsetList::add`] method; the various
/// [`Rrset`]s are constructed and managed internally.
#[derive(Debug, Default)]
pub struct RrsetList {
    rrsets: Vec<Rrset>,
}

impl RrsetList {
    /// Returns a new, empty `RrsetList`.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a resource record to the `RrsetList`.
    ///
    /// This will fail if the [`Class`] of the new record does not match
    /// the rest of the records in the `RrsetList`, or if the [`Ttl`]
    /// of the new record does not match the rest of the records in its
    /// [`Rrset`]. (Zone data is required to have consistent TTLs per
    /// RRset; merging with the minimum TTL is for messages and caches,
    /// not authoritative data.)
    ///
    /// Note that this does not validate the [`Rdata`] with respect to
    /// the [`Type`]. In addition, if the target [`Rrset`] exists and
    /// already contains [`Rdata`] equal to the provided [`Rdata`] (see
    /// [`Rdata::equals`]), then following the behavior of other
    /// implementations, the new [`Rdata`] is silently ignored.
    pub fn add(
        &mut self,
        owner: &Name,
        rr_type: Type,
        class: Class,
        ttl: Ttl,
        rdata: &Rdata,
    ) -> Result<(), RrsetListAddError> {
        if !self.rrsets.is_empty() && self.rrsets[0].class != class {
            return Err(RrsetListAddError::ClassMismatch);
        }
        match self.rrsets.binary_search_by_key(&rr_type, |r| r.rr_type) {
            Ok(index) => {
                let rrset = &mut self.rrsets[index];
                if rrset.ttl != ttl {
                    Err(RrsetListAddError::TtlMismatch)
                } else {
                    rrset.push_rdata(rdata);
                    Ok(())
                }
            }
            Err(index) => {
                let mut rrset = Rrset::new(owner.clone(), rr_type, class, ttl);
                rrset.push_rdata(rdata);
                self.rrsets.insert(index, rrset);
                Ok(())
            }
        }
    }

    /// Looks up the [`Rrset`] of type `rr_type` in the `RrsetList`.
    pub fn lookup(&self, rr_type: Type) -> Option<&Rrset> {
        self.rrsets
            .binary_search_by_key(&rr_type, |r| r.rr_type)
            .map(|index| &self.rrsets[index])
            .ok()
    }

    /// Returns an iterator over the [`Rrset`]s of the `RrsetList`.
    pub fn iter(&self) -> std::slice::Iter<Rrset> {
        self.rrsets.iter()
    }

    /// Returns the number of [`Rrset`]s in the `RrsetList`.
    pub fn len(&self) -> usize {
        self.rrsets.len()
    }

    /// Returns whether the `RrsetList` is empty.
    pub fn is_empty(&self) -> bool {
        self.rrsets.is_empty()
    }
}

/// An error signaling that a record cannot be added to an
/// [`RrsetList`].
#[derive(Debug, Eq, PartialEq)]
pub enum RrsetListAddError {
    /// A record cannot be added because its [`Class`] differs from the
    /// rest of the records in the [`RrsetList`].
    ClassMismatch,

    /// A record cannot be added because its [`Ttl`] differs from the
    /// rest of the records in its [`Rrset`].
    TtlMismatch,
}

impl fmt::Display for RrsetListAddError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::ClassMismatch => f.write_str("CLASS mismatch"),
            Self::TtlMismatch => f.write_str("TTL mismatch"),
        }
    }
}

impl std::error::Error for RrsetListAddError {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Name {
        "quagmire.test.".parse().unwrap()
    }

    #[test]
    fn rrset_works() {
        let loopback1: &Rdata = (&[127, 0, 0, 1]).try_into().unwrap();
        let loopback2: &Rdata = (&[127, 0, 0, 2]).try_into().unwrap();
        let mut rrset = Rrset::new(owner(), Type::A, Class::IN, Ttl::from(3600));
        rrset.push_rdata(loopback1);
        rrset.push_rdata(loopback2);
        assert_eq!(rrset.rr_type, Type::A);
        assert_eq!(rrset.class, Class::IN);
        assert_eq!(u32::from(rrset.ttl), 3600);
        assert_eq!(rrset.rdatas().collect::<Vec<_>>(), [loopback1, loopback2]);
    }

    #[test]
    fn rrset_ignores_duplicates() {
        let rdata1: &Rdata = (&[2, 0, b'a', 0]).try_into().unwrap();
        let rdata2: &Rdata = (&[2, 0, b'A', 0]).try_into().unwrap();

        let push_rdatas = |rrset: &mut Rrset| {
            rrset.push_rdata(rdata1);
            rrset.push_rdata(rdata2);
            rrset.push_rdata(rdata1);
        };

        // For e.g. A records, bitwise comparison should always be used.
        let mut a_rrset = Rrset::new(owner(), Type::A, Class::IN, Ttl::from(3600));
        push_rdatas(&mut a_rrset);
        assert_eq!(a_rrset.rdatas().collect::<Vec<_>>(), [rdata1, rdata2]);

        // But for RR types embedding domain names *preceding* RFC 3597,
        // case-insensitive name comparison needs to be used.
        let mut cname_rrset = Rrset::new(owner(), Type::CNAME, Class::IN, Ttl::from(3600));
        push_rdatas(&mut cname_rrset);
        assert_eq!(cname_rrset.rdatas().collect::<Vec<_>>(), [rdata1]);
    }

    #[test]
    fn rrset_takes_minimum_ttl() {
        let record_long = Record::new(
            owner(),
            Type::A,
            Class::IN,
            Ttl::from(7200),
            Rdata::new_a("192.0.2.1".parse().unwrap()),
        );
        let record_short = Record::new(
            owner(),
            Type::A,
            Class::IN,
            Ttl::from(300),
            Rdata::new_a("192.0.2.2".parse().unwrap()),
        );
        let mut rrset = Rrset::from_record(&record_long);
        rrset.add_record(&record_short).unwrap();
        assert_eq!(rrset.ttl, Ttl::from(300));
        assert_eq!(rrset.len(), 2);
    }

    #[test]
    fn rrset_rejects_foreign_records() {
        let record = Record::new(
            owner(),
            Type::A,
            Class::IN,
            Ttl::from(3600),
            Rdata::new_a("192.0.2.1".parse().unwrap()),
        );
        let mut rrset = Rrset::new(owner(), Type::AAAA, Class::IN, Ttl::from(3600));
        assert_eq!(rrset.add_record(&record), Err(WrongRrsetError));
    }

    #[test]
    fn rrset_groups_signatures_with_covered_data() {
        let signer: Name = "quagmire.test.".parse().unwrap();
        let data = Record::new(
            owner(),
            Type::A,
            Class::IN,
            Ttl::from(3600),
            Rdata::new_a("192.0.2.1".parse().unwrap()),
        );
        let sig = Record::new(
            owner(),
            Type::RRSIG,
            Class::IN,
            Ttl::from(3600),
            Rdata::new_rrsig(Type::A, 8, 2, 3600, 0, 0, 2642, &signer, b"sig").unwrap(),
        );
        let mut rrset = Rrset::from_record(&data);
        rrset.add_record(&sig).unwrap();
        assert_eq!(rrset.len(), 1);
        assert_eq!(rrset.sigs().count(), 1);
    }

    #[test]
    fn rrsetlist_works() {
        let loopback1: &Rdata = (&[127, 0, 0, 1]).try_into().unwrap();
        let loopback2: &Rdata = (&[127, 0, 0, 2]).try_into().unwrap();
        let domain: &Rdata = b"\x04test\x00".try_into().unwrap();
        let mut rrsets = RrsetList::new();
        rrsets
            .add(&owner(), Type::A, Class::IN, Ttl::from(3600), loopback1)
            .unwrap();
        rrsets
            .add(&owner(), Type::A, Class::IN, Ttl::from(3600), loopback2)
            .unwrap();
        rrsets
            .add(&owner(), Type::CNAME, Class::IN, Ttl::from(7200), domain)
            .unwrap();

        let a_rrset = rrsets.lookup(Type::A).unwrap();
        assert_eq!(a_rrset.rdatas().collect::<Vec<_>>(), [loopback1, loopback2]);
        let cname_rrset = rrsets.lookup(Type::CNAME).unwrap();
        assert_eq!(cname_rrset.rdatas().collect::<Vec<_>>(), [domain]);
        assert!(rrsets.lookup(Type::AAAA).is_none());
    }

    #[test]
    fn rrsetlist_rejects_class_mismatch() {
        let domain: &Rdata = b"\x04test\x00".try_into().unwrap();
        let mut rrsets = RrsetList::new();
        rrsets
            .add(&owner(), Type::NS, Class::IN, Ttl::from(3600), domain)
            .unwrap();
        assert_eq!(
            rrsets.add(&owner(), Type::CNAME, Class::CH, Ttl::from(3600), domain),
            Err(RrsetListAddError::ClassMismatch)
        );
    }

    #[test]
    fn rrsetlist_rejects_ttl_mismatch() {
        let domain: &Rdata = b"\x04test\x00".try_into().unwrap();
        let mut rrsets = RrsetList::new();
        rrsets
            .add(&owner(), Type::NS, Class::IN, Ttl::from(3600), domain)
            .unwrap();
        assert_eq!(
            rrsets.add(&owner(), Type::NS, Class::IN, Ttl::from(7200), domain),
            Err(RrsetListAddError::TtlMismatch)
        );
    }
}
