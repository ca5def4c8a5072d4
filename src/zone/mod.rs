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

//! Implementation of DNS zone data structures, for keeping DNS zones
//! loaded in memory.

use std::collections::HashMap;

use crate::class::Class;
use crate::name::{LabelBuf, Name};
use crate::rr::{Rdata, Record, RrsetList, Ttl, Type};

pub mod answer;
mod error;
mod lookup;
pub use error::Error;
pub use lookup::{Lookup, SetResponse};

/// A DNS zone loaded into memory.
///
/// The most important part of a `Zone` is its tree of `Node`s (a
/// private structure that represents a node in the DNS tree), which
/// own RRsets. [`Zone::lookup`] allows the zone's data to be queried
/// according to the algorithm specified by [RFC 1034 § 4.3.2]; the
/// `lookup` module provides the implementation and the
/// [`SetResponse`] outcome type it produces.
///
/// `Zone`s are constructed with [`Zone::new`], which provides an empty
/// structure, and subsequent calls to [`Zone::add`] or
/// [`Zone::add_record`], which add resource records. Once loaded, a
/// zone should be checked with [`Zone::validate`], which enforces the
/// SOA and NS requirements at the origin.
///
/// Records below a zone cut (other than the cut's own NS RRset) are
/// stored, since they may be needed as glue, but the lookup algorithm
/// never serves them as authoritative data.
///
/// [RFC 1034 § 4.3.2]: https://datatracker.ietf.org/doc/html/rfc1034#section-4.3.2
#[derive(Debug)]
pub struct Zone {
    class: Class,
    apex: Node,
}

/// A node in the DNS tree, which may own RRsets.
#[derive(Debug)]
struct Node {
    name: Name,
    rrsets: RrsetList,
    children: HashMap<LabelBuf, Node>,
}

impl Zone {
    /// Creates a new `Zone` with the specified origin and class. The
    /// zone is initially empty.
    pub fn new(origin: Name, class: Class) -> Self {
        Self {
            class,
            apex: Node {
                name: origin,
                rrsets: RrsetList::new(),
                children: HashMap::new(),
            },
        }
    }

    /// Returns the zone's origin name.
    pub fn name(&self) -> &Name {
        &self.apex.name
    }

    /// Returns the zone's class.
    pub fn class(&self) -> Class {
        self.class
    }

    /// Adds a record to the `Zone`.
    ///
    /// This is designed with the "zone file" paradigm in mind: records
    /// are added in a "flat" manner, one by one. The implementation
    /// then takes care of maintaining consistency (see the failure
    /// conditions below) and organizing records into RRsets, which are
    /// then attached to `Node`s mirroring the conceptual DNS tree.
    ///
    /// This will fail if the provided owner is not within the zone, if
    /// the record's class does not match the zone, or if the record's
    /// TTL does not match other records in its RRset.
    ///
    /// **Warning:** this is currently *not* guaranteed to be an atomic
    /// operation, as it is expected that the caller will abort the
    /// zone load if an error occurs. *Do not* continue to use the
    /// `Zone` if this fails: it may be in an inconsistent state.
    pub fn add(
        &mut self,
        owner: &Name,
        rr_type: Type,
        class: Class,
        ttl: Ttl,
        rdata: &Rdata,
    ) -> Result<(), Error> {
        // NOTE: RrsetList::add will perform the TTL check. While it
        // will also check the CLASS against existing records in the
        // list, we need to check that that is this zone's CLASS.
        if !owner.eq_or_subdomain_of(self.name()) {
            return Err(Error::NotInZone);
        }
        if class != self.class {
            return Err(Error::ClassMismatch);
        }
        let level = owner.len() - self.apex.name.len();
        let node = self.apex.get_or_create_descendant(owner, level);
        node.rrsets
            .add(owner, rr_type, class, ttl, rdata)
            .map_err(|e| e.into())
    }

    /// Adds a [`Record`] to the `Zone`. See [`Zone::add`].
    pub fn add_record(&mut self, record: &Record) -> Result<(), Error> {
        self.add(
            &record.owner,
            record.rr_type,
            record.class,
            record.ttl,
            &record.rdata,
        )
    }

    /// Checks the zone's structural invariants: exactly one SOA record
    /// at the origin, and at least one NS record at the origin.
    pub fn validate(&self) -> Result<(), Error> {
        match self.soa() {
            None => return Err(Error::NoSoa),
            Some(soa) if soa.len() > 1 => return Err(Error::MultipleSoas),
            Some(_) => (),
        }
        match self.ns() {
            None => Err(Error::NoNs),
            Some(_) => Ok(()),
        }
    }
}

impl Node {
    /// Gets or creates a descendant node corresponding to `name`. Any
    /// nodes between the target descendant node and `self` will also
    /// be created. `level` should be set so that `self` corresponds to
    /// the label `name[level]`.
    fn get_or_create_descendant(&mut self, name: &Name, level: usize) -> &mut Node {
        if level == 0 {
            self
        } else {
            self.children
                .entry(name[level - 1].to_owned())
                .or_insert_with(|| Node {
                    name: name.superdomain(level - 1).unwrap(),
                    rrsets: RrsetList::new(),
                    children: HashMap::new(),
                })
                .get_or_create_descendant(name, level - 1)
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
