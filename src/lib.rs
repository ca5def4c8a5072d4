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

//! Quagmire is a DNS protocol library. It provides
//!
//! * the DNS message codec, including RFC 1035 domain-name
//!   compression, in the [`message`] module;
//! * the resource-record type system, with per-type wire and
//!   presentation codecs, in the [`rr`] module;
//! * in-memory authoritative zones and a credibility-ranked cache,
//!   which share a common lookup algorithm, in the [`zone`] and
//!   [`cache`] modules;
//! * an incremental/full zone transfer (IXFR/AXFR) client in the
//!   [`xfer`] module;
//! * transaction signatures (TSIG), including the streaming
//!   verification used by zone transfers, in [`message::tsig`]; and
//! * the abstract resolver contract in the [`resolver`] module.
//!
//! The crate is synchronous. Individual objects are not safe for
//! concurrent mutation; the [`cache::Cache`] is the one structure
//! designed to be shared between threads.

pub mod cache;
pub mod class;
pub mod message;
pub mod name;
pub mod resolver;
pub mod rr;
pub mod xfer;
pub mod zone;
pub mod zone_file;

mod util;
