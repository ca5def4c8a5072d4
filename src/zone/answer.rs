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

//! Assembly of DNS responses from lookup outcomes.
//!
//! [`add_answer`] turns the [`SetResponse`] algebra into the answer,
//! authority, and additional sections of a response [`Message`]. It
//! follows CNAME chains and synthesizes CNAMEs from DNAMEs, up to a
//! fixed iteration bound so that looped chains cannot run away, and
//! fills the additional section with the addresses that the answer's
//! records point at (NS targets, MX exchanges, SRV targets).

use crate::cache::Credibility;
use crate::message::{Message, Rcode, Section};
use crate::name::Name;
use crate::rr::{Record, Rrset, Ttl, Type};

use super::{Lookup, SetResponse};

/// The maximum number of CNAME/DNAME links followed in a single call
/// to [`add_answer`]. Chains longer than this (usually loops) are cut
/// off; the partial chain is returned to the client, which may
/// continue resolution itself.
const MAX_CHAIN_LENGTH: usize = 6;

/// Looks up `(name, rr_type)` in `source` and fills in `response`.
///
/// CNAMEs are followed, and DNAMEs synthesize CNAMEs, with all links
/// added to the answer section in chain order. Delegations place the
/// cut's NS RRset in the authority section. When `authoritative` is
/// set (the source is a zone rather than a cache), the AA bit is set
/// on answers and the RCODE is set to NXDOMAIN for proven-missing
/// names.
pub fn add_answer<S>(
    response: &mut Message,
    name: &Name,
    rr_type: Type,
    source: &S,
    authoritative: bool,
) where
    S: Lookup + ?Sized,
{
    let mut current = name.clone();
    for iteration in 0..MAX_CHAIN_LENGTH {
        let first = iteration == 0;
        match source.lookup(&current, rr_type, Credibility::NORMAL) {
            SetResponse::Successful(rrsets) => {
                if authoritative {
                    response.header.aa = true;
                }
                let mut additional_names = Vec::new();
                for rrset in &rrsets {
                    for record in rrset.records() {
                        if let Some(additional) = record.additional_name() {
                            additional_names.push(additional);
                        }
                        response.add_record(record, Section::Answer);
                    }
                }
                add_additionals(response, &additional_names, source);
                return;
            }
            SetResponse::Cname(record) => {
                let target = match record.rdata.single_name() {
                    Some(target) => target,
                    None => return,
                };
                response.add_record(record, Section::Answer);
                if authoritative {
                    response.header.aa = true;
                }
                current = target;
            }
            SetResponse::Dname(record) => {
                let target = match record.rdata.single_name() {
                    Some(target) => target,
                    None => return,
                };
                let redirected = match current.rebase(&record.owner, &target) {
                    Some(Ok(redirected)) => redirected,
                    // The substituted name does not fit in 255 octets
                    // (or the DNAME does not actually cover the query
                    // name); report YXDOMAIN per RFC 6672 § 2.2.
                    _ => {
                        response.header.rcode = Rcode::YxDomain;
                        return;
                    }
                };
                let class = record.class;
                response.add_record(record, Section::Answer);
                // The synthesized CNAME carries a zero TTL, since it
                // is computed per query and must not be cached beyond
                // the DNAME itself.
                let synthesized = Record::new(
                    current.clone(),
                    Type::CNAME,
                    class,
                    Ttl::ZERO,
                    crate::rr::Rdata::new_name(&redirected),
                );
                response.add_record(synthesized, Section::Answer);
                if authoritative {
                    response.header.aa = true;
                }
                current = redirected;
            }
            SetResponse::Delegation(ns_rrset) => {
                response.header.aa = false;
                let mut additional_names = Vec::new();
                for record in ns_rrset.records() {
                    if let Some(additional) = record.additional_name() {
                        additional_names.push(additional);
                    }
                    response.add_record(record, Section::Authority);
                }
                add_additionals(response, &additional_names, source);
                return;
            }
            SetResponse::NxDomain => {
                if first && authoritative {
                    response.header.rcode = Rcode::NxDomain;
                }
                if authoritative {
                    response.header.aa = true;
                }
                return;
            }
            SetResponse::NxRrset(_) => {
                if authoritative {
                    response.header.aa = true;
                }
                return;
            }
            SetResponse::Unknown => return,
        }
    }
}

/// Adds the SOA RRset of `zone` to the authority section, as negative
/// responses require for negative caching ([RFC 2308 § 3]).
///
/// [RFC 2308 § 3]: https://datatracker.ietf.org/doc/html/rfc2308#section-3
pub fn add_negative_caching_soa(response: &mut Message, zone: &super::Zone) {
    if let Some(soa) = zone.soa() {
        for record in soa.records() {
            response.add_record(record, Section::Authority);
        }
    }
}

/// Looks up address records for the names the answer points at and
/// places them in the additional section. Glue below a zone cut (and,
/// for caches, glue-grade entries) is acceptable here.
fn add_additionals<S>(response: &mut Message, names: &[Name], source: &S)
where
    S: Lookup + ?Sized,
{
    for name in names {
        for rr_type in [Type::A, Type::AAAA] {
            if let SetResponse::Successful(rrsets) = source.lookup_glue(name, rr_type) {
                for rrset in rrsets {
                    if response.find_rrset(&rrset.owner, rrset.rr_type, Section::Additional) {
                        continue;
                    }
                    for record in rrset.records() {
                        response.add_record(record, Section::Additional);
                    }
                }
            }
        }
    }
}

/// A convenience used by tests and simple servers: collects the
/// answer-section RRsets assembled for a query.
pub fn answer_rrsets<S>(name: &Name, rr_type: Type, source: &S) -> Vec<Rrset>
where
    S: Lookup + ?Sized,
{
    let mut response = Message::new();
    add_answer(&mut response, name, rr_type, source, false);
    response.section_rrsets(Section::Answer)
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
