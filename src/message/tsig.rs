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

//! Implementation of Secret Key Authentication for DNS (TSIG), as
//! specified by [RFC 8945].
//!
//! This module implements verification and signing of messages using
//! the TSIG pseudo-RR.
//!
//! For verification, convert the TSIG [`Record`] of a received message
//! into a [`ReadTsigRr`] using [`ReadTsigRr::try_from`], then use its
//! `verify_*` methods. For signing, configure a [`PreparedTsigRr`]
//! structure with the appropriate TSIG parameters and use its `sign_*`
//! methods to generate the [`Rdata`] for the TSIG RR. In practice,
//! [`Message::to_wire`](super::Message::to_wire) drives this module
//! when a key has been set with
//! [`Message::set_tsig`](super::Message::set_tsig).
//!
//! Multi-message responses (notably zone transfers) are verified with
//! a [`StreamVerifier`], which batches intermediate unsigned messages
//! into the MAC of the next signed message and enforces that at least
//! every hundredth message (and the final message) is signed.
//!
//! Supported algorithms are represented by the [`Algorithm`]
//! enumeration.
//!
//! [RFC 8945]: https://datatracker.ietf.org/doc/html/rfc8945

use std::collections::HashMap;
use std::fmt;

use hmac::digest::{MacError, OutputSizeUser};
use hmac::{Hmac, Mac};
use lazy_static::lazy_static;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};

use crate::name::Name;
use crate::rr::rdata::TimeSigned;
use crate::rr::{Rdata, Record, Type};

use super::constants::*;
use super::{ExtendedRcode, Message, Qclass, TsigState};

////////////////////////////////////////////////////////////////////////
// TSIG ALGORITHMS                                                    //
////////////////////////////////////////////////////////////////////////

lazy_static! {
    static ref HMAC_SHA1_NAME: Name = "hmac-sha1.".parse().unwrap();
    static ref HMAC_SHA224_NAME: Name = "hmac-sha224.".parse().unwrap();
    static ref HMAC_SHA256_NAME: Name = "hmac-sha256.".parse().unwrap();
    static ref HMAC_SHA384_NAME: Name = "hmac-sha384.".parse().unwrap();
    static ref HMAC_SHA512_NAME: Name = "hmac-sha512.".parse().unwrap();
    static ref ALGORITHMS_BY_NAME: HashMap<&'static Name, Algorithm> = HashMap::from([
        (&*HMAC_SHA1_NAME, Algorithm::HmacSha1),
        (&*HMAC_SHA224_NAME, Algorithm::HmacSha224),
        (&*HMAC_SHA256_NAME, Algorithm::HmacSha256),
        (&*HMAC_SHA384_NAME, Algorithm::HmacSha384),
        (&*HMAC_SHA512_NAME, Algorithm::HmacSha512),
    ]);
}

/// A supported TSIG algorithm.
///
/// The HMAC-SHA family required and recommended by [RFC 8945 § 6] is
/// implemented; the deprecated HMAC-MD5 is not.
///
/// [RFC 8945 § 6]: https://datatracker.ietf.org/doc/html/rfc8945#section-6
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Algorithm {
    HmacSha1,
    HmacSha224,
    HmacSha256,
    HmacSha384,
    HmacSha512,
}

impl Algorithm {
    /// Returns the name assigned (by [RFC 8945 § 6]) to identify this
    /// algorithm.
    ///
    /// [RFC 8945 § 6]: https://datatracker.ietf.org/doc/html/rfc8945#section-6
    pub fn name(&self) -> &'static Name {
        match self {
            Self::HmacSha1 => &HMAC_SHA1_NAME,
            Self::HmacSha224 => &HMAC_SHA224_NAME,
            Self::HmacSha256 => &HMAC_SHA256_NAME,
            Self::HmacSha384 => &HMAC_SHA384_NAME,
            Self::HmacSha512 => &HMAC_SHA512_NAME,
        }
    }

    /// Returns the size of the MAC produced by this algorithm.
    pub fn output_size(&self) -> usize {
        match self {
            Self::HmacSha1 => Hmac::<Sha1>::output_size(),
            Self::HmacSha224 => Hmac::<Sha224>::output_size(),
            Self::HmacSha256 => Hmac::<Sha256>::output_size(),
            Self::HmacSha384 => Hmac::<Sha384>::output_size(),
            Self::HmacSha512 => Hmac::<Sha512>::output_size(),
        }
    }

    /// Finds an algorithm by its name (as assigned by [RFC 8945 § 6]).
    /// This returns `None` if the algorithm is not defined or not
    /// supported by this implementation.
    ///
    /// [RFC 8945 § 6]: https://datatracker.ietf.org/doc/html/rfc8945#section-6
    pub fn from_name(name: &Name) -> Option<Self> {
        ALGORITHMS_BY_NAME.get(name).copied()
    }

    /// Creates a MAC authenticator to compute a MAC with this algorithm
    /// and the given key.
    fn make_authenticator(&self, key: &[u8]) -> Box<dyn Authenticator> {
        match self {
            Self::HmacSha1 => Box::new(Hmac::<Sha1>::new_from_slice(key).unwrap()),
            Self::HmacSha224 => Box::new(Hmac::<Sha224>::new_from_slice(key).unwrap()),
            Self::HmacSha256 => Box::new(Hmac::<Sha256>::new_from_slice(key).unwrap()),
            Self::HmacSha384 => Box::new(Hmac::<Sha384>::new_from_slice(key).unwrap()),
            Self::HmacSha512 => Box::new(Hmac::<Sha512>::new_from_slice(key).unwrap()),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TSIG KEYS                                                          //
////////////////////////////////////////////////////////////////////////

/// A TSIG key: an algorithm, a key name, and the shared secret.
#[derive(Clone)]
pub struct TsigKey {
    name: Name,
    algorithm: Algorithm,
    secret: Vec<u8>,
}

impl TsigKey {
    /// Creates a new `TsigKey`. The key name is lowercased, since TSIG
    /// digests use the canonical form.
    pub fn new(name: &Name, algorithm: Algorithm, secret: &[u8]) -> Self {
        Self {
            name: name.to_lowercase(),
            algorithm,
            secret: secret.to_vec(),
        }
    }

    /// Returns the key's name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the key's algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the key's shared secret.
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Returns the maximum on-the-wire length of a signed TSIG record
    /// generated with this key (assuming the owner name is not
    /// compressed and the error field does not require "other data").
    pub fn record_length(&self) -> usize {
        // Owner plus fixed RR fields plus fixed RDATA fields come to
        // the owner length, the algorithm-name length, and 26 octets;
        // BADTIME "other data" adds up to 6 more.
        self.name.wire_repr().len() + self.algorithm.name().wire_repr().len() + 26 + 6
            + self.algorithm.output_size()
    }
}

impl fmt::Debug for TsigKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // The secret is deliberately not shown.
        f.debug_struct("TsigKey")
            .field("name", &self.name)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////
// TSIG SIGNING AND VERIFICATION HELPERS                              //
////////////////////////////////////////////////////////////////////////

/// An abstraction over different MAC implementations. Basically, this
/// wraps the `digest` crate's [`Mac`] trait to give us an object-safe
/// trait (so that we can use `Box<dyn Authenticator>`).
trait Authenticator {
    fn update(&mut self, data: &[u8]);
    fn finalize(self: Box<Self>) -> Box<[u8]>;
    fn verify_truncated_left(self: Box<Self>, tag: &[u8]) -> Result<(), MacError>;
}

impl<M> Authenticator for M
where
    M: Mac,
{
    fn update(&mut self, data: &[u8]) {
        <Self as Mac>::update(self, data);
    }

    fn finalize(self: Box<Self>) -> Box<[u8]> {
        <Self as Mac>::finalize(*self)
            .into_bytes()
            .to_vec()
            .into_boxed_slice()
    }

    fn verify_truncated_left(self: Box<Self>, tag: &[u8]) -> Result<(), MacError> {
        <Self as Mac>::verify_truncated_left(*self, tag)
    }
}

/// An abstraction over data structures that provide the TSIG variables
/// that, per [RFC 8945 § 4.3.3], must be added to the MAC. This allows
/// us to use the same helper functions for verifying and signing.
///
/// [RFC 8945 § 4.3.3]: https://datatracker.ietf.org/doc/html/rfc8945#section-4.3.3
trait Variables {
    fn key_name(&self) -> &Name;
    fn algorithm(&self) -> &Name;
    fn time_signed(&self) -> TimeSigned;
    fn fudge(&self) -> u16;
    fn original_id(&self) -> u16;
    fn error(&self) -> ExtendedRcode;
    fn other(&self) -> &[u8];
}

/// Adds the given message to a MAC, decrementing the ARCOUNT and
/// restoring the original message ID first (in accordance with
/// [RFC 8945 § 4.3.2]). The passed message must be the portion before
/// the TSIG RR, with the header counts still counting the TSIG RR.
///
/// [RFC 8945 § 4.3.2]: https://datatracker.ietf.org/doc/html/rfc8945#section-4.3.2
fn add_modified_message(authenticator: &mut dyn Authenticator, message: &[u8], original_id: u16) {
    authenticator.update(&original_id.to_be_bytes());
    authenticator.update(&message[ID_END..ARCOUNT_START]);
    let arcount_without_tsig =
        u16::from_be_bytes(message[ARCOUNT_START..ARCOUNT_END].try_into().unwrap()) - 1;
    authenticator.update(&arcount_without_tsig.to_be_bytes());
    authenticator.update(&message[ARCOUNT_END..]);
}

/// Adds the TSIG variables specified by [RFC 8945 § 4.3.3] to a MAC.
///
/// [RFC 8945 § 4.3.3]: https://datatracker.ietf.org/doc/html/rfc8945#section-4.3.3
fn add_tsig_variables<V>(authenticator: &mut dyn Authenticator, vars: &V)
where
    V: Variables,
{
    authenticator.update(vars.key_name().to_lowercase().wire_repr());
    authenticator.update(b"\x00\xff\x00\x00\x00\x00");
    authenticator.update(vars.algorithm().to_lowercase().wire_repr());
    add_tsig_timers(authenticator, vars);
    authenticator.update(&u16::from(vars.error()).to_be_bytes());
    let other = vars.other();
    authenticator.update(&(other.len() as u16).to_be_bytes());
    authenticator.update(other);
}

/// Adds the TSIG timers specified by [RFC 8945 § 4.3.3.1] to a MAC.
///
/// [RFC 8945 § 4.3.3.1]: https://datatracker.ietf.org/doc/html/rfc8945#section-4.3.3.1
fn add_tsig_timers<V>(authenticator: &mut dyn Authenticator, vars: &V)
where
    V: Variables,
{
    authenticator.update(vars.time_signed().as_slice());
    authenticator.update(&vars.fudge().to_be_bytes());
}

/// Adds a prior MAC to an authenticator, prefixed by its length, as
/// [RFC 8945 § 4.3.1] prescribes for request MACs and this
/// implementation (following the original BIND behavior) also applies
/// to the running MAC of multi-message streams.
///
/// [RFC 8945 § 4.3.1]: https://datatracker.ietf.org/doc/html/rfc8945#section-4.3.1
fn add_prior_mac(authenticator: &mut dyn Authenticator, mac: &[u8]) {
    authenticator.update(&(mac.len() as u16).to_be_bytes());
    authenticator.update(mac);
}

////////////////////////////////////////////////////////////////////////
// TSIG READING/VERIFICATION                                          //
////////////////////////////////////////////////////////////////////////

/// A TSIG RR that has been read from a message.
///
/// A `ReadTsigRr` is produced from the TSIG [`Record`] of a received
/// message with [`ReadTsigRr::try_from`]. It provides methods to
/// access TSIG fields from the underlying [`Rdata`] and additionally
/// implements TSIG verification through its `verify_*` methods.
#[derive(Clone)]
pub struct ReadTsigRr {
    key_name: Name,
    algorithm: Name,
    rdata: Box<Rdata>,
}

impl TryFrom<&Record> for ReadTsigRr {
    type Error = FromRecordError;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        if record.rr_type != Type::TSIG {
            return Err(FromRecordError::NotTsig);
        } else if record.class != Qclass::ANY.into() || u32::from(record.ttl) != 0 {
            return Err(FromRecordError::FormErr);
        }
        record
            .rdata
            .validate_as_tsig()
            .or(Err(FromRecordError::FormErr))?;
        let algorithm = record.rdata.tsig_algorithm().unwrap();
        Ok(Self {
            key_name: record.owner.to_lowercase(),
            algorithm: algorithm.to_lowercase(),
            rdata: record.rdata.clone(),
        })
    }
}

impl ReadTsigRr {
    /// Returns the (lowercased) key name specified by the TSIG RR.
    pub fn key_name(&self) -> &Name {
        &self.key_name
    }

    /// Returns the (lowercased) algorithm name specified by the TSIG
    /// RR.
    pub fn algorithm(&self) -> &Name {
        &self.algorithm
    }

    /// Returns the time at which the TSIG RR was signed.
    pub fn time_signed(&self) -> TimeSigned {
        self.rdata.tsig_time_signed().unwrap()
    }

    /// Returns the fudge field (in seconds) of the TSIG RR.
    pub fn fudge(&self) -> u16 {
        self.rdata.tsig_fudge().unwrap()
    }

    /// Returns the MAC of the TSIG RR.
    pub fn mac(&self) -> &[u8] {
        self.rdata.tsig_mac().unwrap()
    }

    /// Returns the original message ID of the TSIG RR.
    pub fn original_id(&self) -> u16 {
        self.rdata.tsig_original_id().unwrap()
    }

    /// Returns the error field of the TSIG RR.
    pub fn error(&self) -> ExtendedRcode {
        self.rdata.tsig_error().unwrap()
    }

    /// Returns the "other data" field of the TSIG RR.
    pub fn other(&self) -> &[u8] {
        self.rdata.tsig_other().unwrap()
    }

    /// Verifies the given request message.
    ///
    /// The passed buffer should be the message up to—but not
    /// including—the TSIG RR, with the header counts still counting
    /// the TSIG RR. It must be a valid DNS message.
    pub fn verify_request(
        &self,
        message: &[u8],
        key: &TsigKey,
        now: TimeSigned,
    ) -> Result<(), VerificationError> {
        let add_data_to_mac = |authenticator: &mut dyn Authenticator| {
            add_modified_message(authenticator, message, self.original_id());
            add_tsig_variables(authenticator, self);
        };
        self.verification_core(add_data_to_mac, key, now)
    }

    /// Verifies the given response message. `request_mac` must be the
    /// MAC of the request this message responds to.
    ///
    /// The passed buffer should be the message up to—but not
    /// including—the TSIG RR, with the header counts still counting
    /// the TSIG RR. It must be a valid DNS message.
    pub fn verify_response(
        &self,
        message: &[u8],
        request_mac: &[u8],
        key: &TsigKey,
        now: TimeSigned,
    ) -> Result<(), VerificationError> {
        assert!(request_mac.len() <= u16::MAX as usize);
        let add_data_to_mac = |authenticator: &mut dyn Authenticator| {
            add_prior_mac(authenticator, request_mac);
            add_modified_message(authenticator, message, self.original_id());
            add_tsig_variables(authenticator, self);
        };
        self.verification_core(add_data_to_mac, key, now)
    }

    /// The internal core implementation of TSIG message verification.
    fn verification_core<F>(
        &self,
        add_data_to_mac: F,
        key: &TsigKey,
        now: TimeSigned,
    ) -> Result<(), VerificationError>
    where
        F: FnOnce(&mut dyn Authenticator),
    {
        // RFC 8945 § 5.2.1: the key name and algorithm must identify a
        // key we share.
        if self.key_name() != key.name() || self.algorithm() != key.algorithm().name() {
            return Err(VerificationError::BadKey);
        }

        // Ensure that any MAC truncation applied meets RFC 8945
        // § 5.2.2.1's minimum requirements.
        check_mac_size(key.algorithm(), self.mac().len())?;

        // RFC 8945 § 5.2.2: verify the MAC.
        let mut authenticator = key.algorithm().make_authenticator(key.secret());
        add_data_to_mac(authenticator.as_mut());
        authenticator
            .verify_truncated_left(self.mac())
            .or(Err(VerificationError::BadSig))?;

        // RFC 8945 § 5.2.3: ensure that the time signed is close enough
        // to our clock.
        check_time(self.time_signed(), self.fudge(), now)?;

        Ok(())
    }
}

/// Ensures that the MAC size is acceptable, per [RFC 8945 § 5.2.2.1].
///
/// [RFC 8945 § 5.2.2.1]: https://datatracker.ietf.org/doc/html/rfc8945#section-5.2.2.1
fn check_mac_size(algorithm: Algorithm, mac_size: usize) -> Result<(), VerificationError> {
    let half_output_size = (algorithm.output_size() + 1) / 2;
    if mac_size > algorithm.output_size() || mac_size < 10.max(half_output_size) {
        Err(VerificationError::FormErr)
    } else {
        Ok(())
    }
}

/// Checks that `time_signed` does not deviate more than `fudge` seconds
/// from the "current" time (specified by `now`).
fn check_time(
    time_signed: TimeSigned,
    fudge: u16,
    now: TimeSigned,
) -> Result<(), VerificationError> {
    let time_signed_unix = time_signed.to_unix_time();
    let now_unix = now.to_unix_time();
    let time_window_start = time_signed_unix.saturating_sub(fudge as u64);
    let time_window_end = time_signed_unix.saturating_add(fudge as u64);

    if now_unix >= time_window_start && now_unix <= time_window_end {
        Ok(())
    } else {
        Err(VerificationError::BadTime)
    }
}

impl Variables for ReadTsigRr {
    fn key_name(&self) -> &Name {
        self.key_name()
    }

    fn algorithm(&self) -> &Name {
        self.algorithm()
    }

    fn time_signed(&self) -> TimeSigned {
        self.time_signed()
    }

    fn fudge(&self) -> u16 {
        self.fudge()
    }

    fn original_id(&self) -> u16 {
        self.original_id()
    }

    fn error(&self) -> ExtendedRcode {
        self.error()
    }

    fn other(&self) -> &[u8] {
        self.other()
    }
}

impl fmt::Debug for ReadTsigRr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ReadTsigRr")
            .field("key_name", &self.key_name())
            .field("algorithm", &self.algorithm())
            .field("time_signed", &self.time_signed())
            .field("fudge", &self.fudge())
            .field("mac", &self.mac())
            .field("original_id", &self.original_id())
            .field("error", &self.error())
            .field("other", &self.other())
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////
// TSIG WRITING/SIGNING                                               //
////////////////////////////////////////////////////////////////////////

/// A TSIG RR that has been prepared for serialization.
///
/// This structure specifies TSIG fields other than the signing
/// algorithm and MAC. The fields can be prepared manually, or filled in
/// (for a response) from the [`ReadTsigRr`] of a request with
/// [`PreparedTsigRr::new_from_read`]. (Note that
/// [`PreparedTsigRr::server_time`] is ignored unless the error is
/// [`ExtendedRcode::BADTIME`].)
///
/// When a message is complete, a `PreparedTsigRr` can be used to sign
/// it through its `sign_*` methods. Given the message octets, a key,
/// and (where applicable) a prior MAC, these compute the MAC and then
/// serialize TSIG [`Rdata`] from the structure's fields and the MAC.
/// For unsigned TSIG records, [`PreparedTsigRr::unsigned`] produces
/// [`Rdata`] with an empty MAC; this is required for certain error
/// responses.
#[derive(Debug, Clone)]
pub struct PreparedTsigRr {
    pub key_name: Name,
    pub time_signed: TimeSigned,
    pub fudge: u16,
    pub original_id: u16,
    pub error: ExtendedRcode,
    pub server_time: TimeSigned,
}

impl PreparedTsigRr {
    /// Creates a `PreparedTsigRr` for a response by combining fields
    /// from a [`ReadTsigRr`] from the request and the provided
    /// arguments.
    ///
    /// If the error is [`ExtendedRcode::BADTIME`], then per
    /// [RFC 8945 § 5.2.3], the time-signed field is taken from the
    /// request and the `time_signed` argument is placed in the
    /// `server_time` field. Otherwise, the `time_signed` argument is
    /// placed into both fields (and the `server_time` field is not
    /// used when the TSIG RDATA is serialized).
    ///
    /// [RFC 8945 § 5.2.3]: https://datatracker.ietf.org/doc/html/rfc8945#section-5.2.3
    pub fn new_from_read(
        read: &ReadTsigRr,
        time_signed: TimeSigned,
        fudge: u16,
        error: ExtendedRcode,
    ) -> Self {
        let (time_signed, server_time) = if error == ExtendedRcode::BADTIME {
            (read.time_signed(), time_signed)
        } else {
            (time_signed, time_signed)
        };
        Self {
            key_name: read.key_name.clone(),
            time_signed,
            fudge,
            original_id: read.original_id(),
            error,
            server_time,
        }
    }

    /// Creates a `PreparedTsigRr` for a fresh request signed with
    /// `key`.
    pub fn new_for_request(key: &TsigKey, time_signed: TimeSigned, fudge: u16, id: u16) -> Self {
        Self {
            key_name: key.name().clone(),
            time_signed,
            fudge,
            original_id: id,
            error: ExtendedRcode::NOERROR,
            server_time: time_signed,
        }
    }

    /// Signs the given request message, returning TSIG [`Rdata`] with
    /// the computed MAC.
    ///
    /// The passed buffer should be the message up to—but not
    /// including—the TSIG RR, with the message ID and ARCOUNT at
    /// their final values (i.e., for the latter, including the TSIG
    /// RR); this method adjusts these fields as appropriate when
    /// computing the MAC.
    pub fn sign_request(&self, message: &[u8], key: &TsigKey) -> (Box<Rdata>, Box<[u8]>) {
        let mut authenticator = key.algorithm().make_authenticator(key.secret());
        add_modified_message(authenticator.as_mut(), message, self.original_id);
        add_tsig_variables(authenticator.as_mut(), &(key.algorithm().name(), self));
        let mac = authenticator.finalize();
        (self.serialize_rdata(key.algorithm().name(), &mac), mac)
    }

    /// Signs the given response message, returning TSIG [`Rdata`] with
    /// the computed MAC. `request_mac` must be the MAC of the request
    /// being answered.
    ///
    /// The message buffer requirements of
    /// [`PreparedTsigRr::sign_request`] apply.
    pub fn sign_response(
        &self,
        message: &[u8],
        request_mac: &[u8],
        key: &TsigKey,
    ) -> (Box<Rdata>, Box<[u8]>) {
        assert!(request_mac.len() <= u16::MAX as usize);
        let mut authenticator = key.algorithm().make_authenticator(key.secret());
        add_prior_mac(authenticator.as_mut(), request_mac);
        add_modified_message(authenticator.as_mut(), message, self.original_id);
        add_tsig_variables(authenticator.as_mut(), &(key.algorithm().name(), self));
        let mac = authenticator.finalize();
        (self.serialize_rdata(key.algorithm().name(), &mac), mac)
    }

    /// Signs a subsequent message of a multi-message response,
    /// returning TSIG [`Rdata`] with the computed MAC. Per
    /// [RFC 8945 § 5.3.1], only the timers are covered in addition to
    /// the prior MAC and the message itself.
    ///
    /// The message buffer requirements of
    /// [`PreparedTsigRr::sign_request`] apply.
    ///
    /// [RFC 8945 § 5.3.1]: https://datatracker.ietf.org/doc/html/rfc8945#section-5.3.1
    pub fn sign_subsequent(
        &self,
        message: &[u8],
        prior_mac: &[u8],
        key: &TsigKey,
    ) -> (Box<Rdata>, Box<[u8]>) {
        let mut authenticator = key.algorithm().make_authenticator(key.secret());
        add_prior_mac(authenticator.as_mut(), prior_mac);
        add_modified_message(authenticator.as_mut(), message, self.original_id);
        add_tsig_timers(authenticator.as_mut(), &(key.algorithm().name(), self));
        let mac = authenticator.finalize();
        (self.serialize_rdata(key.algorithm().name(), &mac), mac)
    }

    /// Serializes TSIG [`Rdata`] using the provided algorithm name and
    /// leaving the record unsigned (i.e., with a zero-length MAC).
    pub fn unsigned(&self, algorithm: &Name) -> Box<Rdata> {
        self.serialize_rdata(algorithm, &[])
    }

    /// An internal helper to serialize TSIG [`Rdata`].
    fn serialize_rdata(&self, algorithm: &Name, mac: &[u8]) -> Box<Rdata> {
        Rdata::new_tsig(
            algorithm,
            self.time_signed,
            self.fudge,
            mac,
            self.original_id,
            self.error,
            self.other(),
        )
        .expect("serialized TSIG RDATA was too long; this is a bug")
    }

    /// Returns the "other data" field to serialize.
    fn other(&self) -> &[u8] {
        if self.error == ExtendedRcode::BADTIME {
            self.server_time.as_slice()
        } else {
            &[]
        }
    }
}

impl Variables for (&Name, &PreparedTsigRr) {
    fn key_name(&self) -> &Name {
        &self.1.key_name
    }

    fn algorithm(&self) -> &Name {
        self.0
    }

    fn time_signed(&self) -> TimeSigned {
        self.1.time_signed
    }

    fn fudge(&self) -> u16 {
        self.1.fudge
    }

    fn original_id(&self) -> u16 {
        self.1.original_id
    }

    fn error(&self) -> ExtendedRcode {
        self.1.error
    }

    fn other(&self) -> &[u8] {
        self.1.other()
    }
}

////////////////////////////////////////////////////////////////////////
// STREAM VERIFICATION                                                //
////////////////////////////////////////////////////////////////////////

/// A verifier for multi-message TSIG-signed responses ([RFC 8945
/// § 5.3.1]), as produced by zone transfers.
///
/// The verifier accumulates state across calls to
/// [`StreamVerifier::verify`], one per received message, in wire
/// order. The first message of the stream must be signed; afterwards,
/// unsigned messages are tolerated as long as no hundred consecutive
/// messages go unsigned. Unsigned messages are batched into the MAC of
/// the next signed message. The caller must separately ensure that the
/// *final* message of the stream was signed, which
/// [`StreamVerifier::last_message_verified`] reports.
///
/// [RFC 8945 § 5.3.1]: https://datatracker.ietf.org/doc/html/rfc8945#section-5.3.1
pub struct StreamVerifier {
    key: TsigKey,
    authenticator: Box<dyn Authenticator>,
    nresults: usize,
    last_signed: usize,
    request_mac: Vec<u8>,
    last_verified: bool,
}

/// The maximum number of consecutive unsigned messages tolerated in a
/// signed stream, per [RFC 8945 § 5.3.1].
///
/// [RFC 8945 § 5.3.1]: https://datatracker.ietf.org/doc/html/rfc8945#section-5.3.1
const MAX_UNSIGNED_IN_STREAM: usize = 99;

impl StreamVerifier {
    /// Creates a new `StreamVerifier` for responses signed with `key`.
    /// `request_mac` must be the MAC of the (signed) query that opened
    /// the stream.
    pub fn new(key: &TsigKey, request_mac: &[u8]) -> Self {
        Self {
            key: key.clone(),
            authenticator: key.algorithm().make_authenticator(key.secret()),
            nresults: 0,
            last_signed: 0,
            request_mac: request_mac.to_vec(),
            last_verified: false,
        }
    }

    /// Verifies the next message of the stream. `message` is the
    /// parsed form and `raw` the received octets. The message's TSIG
    /// state is updated accordingly, and the resulting state is also
    /// returned.
    pub fn verify(
        &mut self,
        message: &mut Message,
        raw: &[u8],
        now: TimeSigned,
    ) -> Result<TsigState, VerificationError> {
        self.nresults += 1;
        self.last_verified = false;

        let tsig_start = match message.tsig_start() {
            Some(tsig_start) => tsig_start,
            None => return self.handle_unsigned(message, raw),
        };
        let tsig_record = message.tsig().ok_or(VerificationError::FormErr)?;
        let read = ReadTsigRr::try_from(tsig_record).or(Err(VerificationError::FormErr))?;

        if self.nresults == 1 {
            // The first message carries a full response signature.
            read.verify_response(&raw[..tsig_start], &self.request_mac, &self.key, now)
                .map_err(|e| self.fail(message, e))?;
        } else {
            // Subsequent signed messages cover the accumulated
            // messages plus the timers only.
            if read.key_name() != self.key.name()
                || read.algorithm() != self.key.algorithm().name()
            {
                return Err(self.fail(message, VerificationError::BadKey));
            }
            check_mac_size(self.key.algorithm(), read.mac().len())
                .map_err(|e| self.fail(message, e))?;
            let mut authenticator = std::mem::replace(
                &mut self.authenticator,
                self.key.algorithm().make_authenticator(self.key.secret()),
            );
            add_modified_message(
                authenticator.as_mut(),
                &raw[..tsig_start],
                read.original_id(),
            );
            add_tsig_timers(authenticator.as_mut(), &read);
            authenticator
                .verify_truncated_left(read.mac())
                .or(Err(VerificationError::BadSig))
                .map_err(|e| self.fail(message, e))?;
            check_time(read.time_signed(), read.fudge(), now)
                .map_err(|e| self.fail(message, e))?;
        }

        // Seed the running MAC for the next batch with this message's
        // MAC.
        self.authenticator = self.key.algorithm().make_authenticator(self.key.secret());
        add_prior_mac(self.authenticator.as_mut(), read.mac());
        self.last_signed = self.nresults;
        self.last_verified = true;
        message.set_tsig_state(TsigState::Verified);
        Ok(TsigState::Verified)
    }

    /// Handles a message without a TSIG RR.
    fn handle_unsigned(
        &mut self,
        message: &mut Message,
        raw: &[u8],
    ) -> Result<TsigState, VerificationError> {
        if self.nresults == 1 {
            // The first message of the stream must be signed.
            return Err(self.fail(message, VerificationError::FormErr));
        }
        if self.nresults - self.last_signed > MAX_UNSIGNED_IN_STREAM {
            return Err(self.fail(message, VerificationError::FormErr));
        }
        self.authenticator.update(raw);
        message.set_tsig_state(TsigState::Intermediate);
        Ok(TsigState::Intermediate)
    }

    /// Records a verification failure on the message.
    fn fail(&mut self, message: &mut Message, error: VerificationError) -> VerificationError {
        message.set_tsig_state(TsigState::Failed);
        error
    }

    /// Returns whether the most recently verified message was signed
    /// and verified successfully. Zone transfers use this to enforce
    /// that the final message of the stream was signed.
    pub fn last_message_verified(&self) -> bool {
        self.last_verified
    }
}

impl fmt::Debug for StreamVerifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("StreamVerifier")
            .field("key", &self.key)
            .field("nresults", &self.nresults)
            .field("last_signed", &self.last_signed)
            .field("last_verified", &self.last_verified)
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// Errors that arise when a [`Record`] cannot be converted into a
/// [`ReadTsigRr`].
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum FromRecordError {
    /// There is a format error in the record.
    FormErr,

    /// The [`Record`] is not a TSIG record.
    NotTsig,
}

impl fmt::Display for FromRecordError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::FormErr => f.write_str("FORMERR"),
            Self::NotTsig => f.write_str("RR type is not TSIG"),
        }
    }
}

impl std::error::Error for FromRecordError {}

/// Errors that arise during TSIG verification.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum VerificationError {
    /// The key name or algorithm does not match a key we share.
    BadKey,

    /// MAC verification failed. A response to this message must not be
    /// signed.
    BadSig,

    /// Time check failed. A response to this message must be signed.
    BadTime,

    /// There was a format error (a missing or malformed TSIG record,
    /// or a MAC not meeting the minimum requirements of [RFC 8945
    /// § 5.2.2.1]).
    ///
    /// [RFC 8945 § 5.2.2.1]: https://datatracker.ietf.org/doc/html/rfc8945#section-5.2.2.1
    FormErr,
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::BadKey => f.write_str("BADKEY"),
            Self::BadSig => f.write_str("BADSIG"),
            Self::BadTime => f.write_str("BADTIME"),
            Self::FormErr => f.write_str("FORMERR"),
        }
    }
}

impl std::error::Error for VerificationError {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use lazy_static::lazy_static;

    use super::super::{Message, Qclass, Qtype, Question, Section};
    use super::*;
    use crate::class::Class;
    use crate::rr::{Record, Ttl, Type};

    const MESSAGE_ID: u16 = 0xa2e0;
    const FUDGE: u16 = 300;
    const SECRET: &[u8] = b"topsecret";

    lazy_static! {
        static ref KEY: TsigKey = TsigKey::new(
            &"a.tsig.key.".parse().unwrap(),
            Algorithm::HmacSha256,
            SECRET,
        );
        static ref TIME_SIGNED: TimeSigned = TimeSigned::try_from_unix_time(1663798730).unwrap();
        static ref TOO_EARLY: TimeSigned =
            TimeSigned::try_from_unix_time(1663798730 - FUDGE as u64 - 1).unwrap();
        static ref TOO_LATE: TimeSigned =
            TimeSigned::try_from_unix_time(1663798730 + FUDGE as u64 + 1).unwrap();
        static ref QUESTION: Question = Question {
            qname: "quagmire.test.".parse().unwrap(),
            qtype: Qtype::from(Type::TXT),
            qclass: Qclass::from(Class::IN),
        };
    }

    fn build_request() -> (Vec<u8>, Vec<u8>) {
        let mut query = Message::new();
        query.header.set_id(MESSAGE_ID);
        query.add_question(QUESTION.clone());
        query.set_tsig(KEY.clone(), *TIME_SIGNED, FUDGE);
        let (octets, mac) = query.to_wire_with_mac(512).unwrap();
        (octets, mac.unwrap().to_vec())
    }

    fn build_response(request_mac: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let mut response = Message::new();
        response.header.set_id(MESSAGE_ID);
        response.header.qr = true;
        response.header.aa = true;
        response.add_question(QUESTION.clone());
        let rdata: &Rdata = b"\x09It works!".try_into().unwrap();
        response.add_record(
            Record::new(
                QUESTION.qname.clone(),
                Type::TXT,
                Class::IN,
                Ttl::from(86400),
                rdata.to_owned(),
            ),
            Section::Answer,
        );
        response.set_tsig_response(KEY.clone(), *TIME_SIGNED, FUDGE, request_mac.to_vec());
        let (octets, mac) = response.to_wire_with_mac(512).unwrap();
        (octets, mac.unwrap().to_vec())
    }

    fn read_tsig(octets: &[u8]) -> (Message, ReadTsigRr, usize) {
        let message = Message::from_wire(octets).unwrap();
        let tsig_start = message.tsig_start().unwrap();
        let read = ReadTsigRr::try_from(message.tsig().unwrap()).unwrap();
        (message, read, tsig_start)
    }

    #[test]
    fn request_signing_and_verification_round_trip() {
        let (octets, mac) = build_request();
        let (_, read, tsig_start) = read_tsig(&octets);
        assert_eq!(read.mac(), &mac[..]);
        assert_eq!(read.original_id(), MESSAGE_ID);
        read.verify_request(&octets[..tsig_start], &KEY, *TIME_SIGNED)
            .unwrap();
    }

    #[test]
    fn request_verification_rejects_corrupted_messages() {
        let (mut octets, _) = build_request();
        octets[2] ^= 0xff;
        let (_, read, tsig_start) = read_tsig(&octets);
        assert_eq!(
            read.verify_request(&octets[..tsig_start], &KEY, *TIME_SIGNED),
            Err(VerificationError::BadSig),
        );
    }

    #[test]
    fn request_verification_rejects_wrong_key() {
        let (octets, _) = build_request();
        let (_, read, tsig_start) = read_tsig(&octets);
        let other_key = TsigKey::new(
            &"b.tsig.key.".parse().unwrap(),
            Algorithm::HmacSha256,
            SECRET,
        );
        assert_eq!(
            read.verify_request(&octets[..tsig_start], &other_key, *TIME_SIGNED),
            Err(VerificationError::BadKey),
        );
    }

    #[test]
    fn request_verification_enforces_the_time_window() {
        let (octets, _) = build_request();
        let (_, read, tsig_start) = read_tsig(&octets);
        for now in [*TOO_EARLY, *TOO_LATE] {
            assert_eq!(
                read.verify_request(&octets[..tsig_start], &KEY, now),
                Err(VerificationError::BadTime),
            );
        }
    }

    #[test]
    fn response_signing_and_verification_round_trip() {
        let (_, request_mac) = build_request();
        let (octets, _) = build_response(&request_mac);
        let (_, read, tsig_start) = read_tsig(&octets);
        read.verify_response(&octets[..tsig_start], &request_mac, &KEY, *TIME_SIGNED)
            .unwrap();
    }

    #[test]
    fn response_verification_rejects_corrupted_messages() {
        let (_, request_mac) = build_request();
        let (mut octets, _) = build_response(&request_mac);
        octets[2] ^= 0xff;
        let (_, read, tsig_start) = read_tsig(&octets);
        assert_eq!(
            read.verify_response(&octets[..tsig_start], &request_mac, &KEY, *TIME_SIGNED),
            Err(VerificationError::BadSig),
        );
    }

    /// Builds an unsigned mid-stream message.
    fn build_unsigned(id: u16) -> Vec<u8> {
        let mut message = Message::new();
        message.header.set_id(id);
        message.header.qr = true;
        let rdata: &Rdata = b"\x04more".try_into().unwrap();
        message.add_record(
            Record::new(
                QUESTION.qname.clone(),
                Type::TXT,
                Class::IN,
                Ttl::from(86400),
                rdata.to_owned(),
            ),
            Section::Answer,
        );
        message.to_wire(512).unwrap()
    }

    /// Builds a subsequent signed message covering the given prior MAC
    /// and any unsigned messages since the last signed one. The MAC is
    /// computed by hand, the way a server batching unsigned messages
    /// would.
    fn build_signed_subsequent(id: u16, prior_mac: &[u8], unsigned: &[&[u8]]) -> Vec<u8> {
        let body = build_unsigned(id);
        let mut authenticator = KEY.algorithm().make_authenticator(KEY.secret());
        add_prior_mac(authenticator.as_mut(), prior_mac);
        for message in unsigned {
            authenticator.update(message);
        }
        // With the TSIG record appended, the ARCOUNT goes up by one
        // and the MAC input has it decremented again, so the digested
        // "modified message" is exactly the unsigned body.
        authenticator.update(&body);
        authenticator.update(TIME_SIGNED.as_slice());
        authenticator.update(&FUDGE.to_be_bytes());
        let mac = authenticator.finalize();

        let rdata = Rdata::new_tsig(
            KEY.algorithm().name(),
            *TIME_SIGNED,
            FUDGE,
            &mac,
            id,
            ExtendedRcode::NOERROR,
            &[],
        )
        .unwrap();
        let mut message = Message::from_wire(&body).unwrap();
        message.add_record(
            Record::new(
                KEY.name().clone(),
                Type::TSIG,
                Qclass::ANY.into(),
                Ttl::ZERO,
                rdata,
            ),
            Section::Additional,
        );
        message.to_wire(512).unwrap()
    }

    fn feed(
        verifier: &mut StreamVerifier,
        octets: &[u8],
    ) -> Result<TsigState, VerificationError> {
        let mut message = Message::from_wire(octets).unwrap();
        verifier.verify(&mut message, octets, *TIME_SIGNED)
    }

    #[test]
    fn stream_verification_works_when_every_message_is_signed() {
        let (_, request_mac) = build_request();
        let (first, first_mac) = build_response(&request_mac);
        let second = build_signed_subsequent(MESSAGE_ID, &first_mac, &[]);

        let mut verifier = StreamVerifier::new(&KEY, &request_mac);
        assert_eq!(feed(&mut verifier, &first), Ok(TsigState::Verified));
        assert_eq!(feed(&mut verifier, &second), Ok(TsigState::Verified));
        assert!(verifier.last_message_verified());
    }

    #[test]
    fn stream_verification_batches_unsigned_messages() {
        let (_, request_mac) = build_request();
        let (first, first_mac) = build_response(&request_mac);
        let middle = build_unsigned(MESSAGE_ID);
        let last = build_signed_subsequent(MESSAGE_ID, &first_mac, &[&middle]);

        let mut verifier = StreamVerifier::new(&KEY, &request_mac);
        assert_eq!(feed(&mut verifier, &first), Ok(TsigState::Verified));
        assert_eq!(feed(&mut verifier, &middle), Ok(TsigState::Intermediate));
        assert!(!verifier.last_message_verified());
        assert_eq!(feed(&mut verifier, &last), Ok(TsigState::Verified));
        assert!(verifier.last_message_verified());
    }

    #[test]
    fn stream_verification_rejects_unsigned_first_messages() {
        let (_, request_mac) = build_request();
        let unsigned = build_unsigned(MESSAGE_ID);
        let mut verifier = StreamVerifier::new(&KEY, &request_mac);
        assert_eq!(
            feed(&mut verifier, &unsigned),
            Err(VerificationError::FormErr),
        );
    }

    #[test]
    fn stream_verification_rejects_tampered_intermediate_messages() {
        let (_, request_mac) = build_request();
        let (first, first_mac) = build_response(&request_mac);
        let middle = build_unsigned(MESSAGE_ID);
        let last = build_signed_subsequent(MESSAGE_ID, &first_mac, &[&middle]);

        let mut verifier = StreamVerifier::new(&KEY, &request_mac);
        assert_eq!(feed(&mut verifier, &first), Ok(TsigState::Verified));

        // Corrupt the unsigned middle message; the final signed
        // message's MAC no longer matches what the verifier
        // accumulated.
        let mut tampered = middle.clone();
        tampered[2] ^= 0x40;
        assert_eq!(
            feed(&mut verifier, &tampered),
            Ok(TsigState::Intermediate)
        );
        assert_eq!(feed(&mut verifier, &last), Err(VerificationError::BadSig));
    }
}
