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

//! An incoming DNS zone transfer client.
//!
//! [`ZoneTransfer`] retrieves either the full contents of a zone
//! (AXFR, [RFC 5936]) or an incremental delta since a known serial
//! (IXFR, [RFC 1995]) over TCP. Construct one with
//! [`ZoneTransfer::new_axfr`] or [`ZoneTransfer::new_ixfr`] and call
//! [`ZoneTransfer::run`]; the result is an AXFR-style record list, an
//! IXFR-style delta list, or an indication that the zone is up to
//! date. [`ZoneTransfer::run_with`] instead streams records into a
//! caller-supplied [`ZoneTransferHandler`].
//!
//! An IXFR request falls back to AXFR (when enabled) if the server
//! answers NOTIMP or with an empty answer section. Responses may span
//! multiple messages; when a TSIG key is configured, the stream is
//! verified with a [`StreamVerifier`] and the final message must be
//! signed.
//!
//! [RFC 1995]: https://datatracker.ietf.org/doc/html/rfc1995
//! [RFC 5936]: https://datatracker.ietf.org/doc/html/rfc5936

use std::cmp::Ordering;
use std::fmt;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant, SystemTime};

use log::debug;

use crate::class::Class;
use crate::message::tsig::{StreamVerifier, TsigKey, VerificationError};
use crate::message::{
    reader, ExtendedRcode, Message, Qclass, Qtype, Question, Rcode, Section, MAX_MESSAGE_SIZE,
};
use crate::name::Name;
use crate::rr::rdata::TimeSigned;
use crate::rr::{Rdata, Record, Ttl, Type};

////////////////////////////////////////////////////////////////////////
// SERIAL ARITHMETIC                                                  //
////////////////////////////////////////////////////////////////////////

/// Compares two SOA serial numbers using the sequence-space arithmetic
/// of [RFC 1982]. Note that serial arithmetic is a partial order: for
/// values exactly 2³¹ apart, neither is greater; this implementation
/// (like BIND) reports such pairs as [`Ordering::Greater`] for the
/// first argument.
///
/// [RFC 1982]: https://datatracker.ietf.org/doc/html/rfc1982
pub fn serial_compare(a: u32, b: u32) -> Ordering {
    if a == b {
        Ordering::Equal
    } else if (a < b && b - a < 0x8000_0000) || (a > b && a - b > 0x8000_0000) {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

////////////////////////////////////////////////////////////////////////
// DELTAS, RESULTS, AND HANDLERS                                      //
////////////////////////////////////////////////////////////////////////

/// All changes between two versions of a zone in an IXFR response.
///
/// The `deletes` and `adds` lists each begin with the SOA record that
/// brackets them in the transfer stream (the old version's SOA and the
/// new version's SOA, respectively).
#[derive(Clone, Debug, Default)]
pub struct Delta {
    /// The starting serial number of this delta.
    pub start: u32,

    /// The ending serial number of this delta.
    pub end: u32,

    /// The records deleted between the start and end versions.
    pub deletes: Vec<Record>,

    /// The records added between the start and end versions.
    pub adds: Vec<Record>,
}

/// The result of a completed zone transfer.
#[derive(Clone, Debug)]
pub enum XfrResult {
    /// A full zone: the flat record list, bracketed by two copies of
    /// the zone's SOA. This is also the result of an IXFR that the
    /// server answered non-incrementally or that fell back to AXFR.
    Axfr(Vec<Record>),

    /// An incremental response: an ordered list of deltas with
    /// monotonically increasing serials.
    Ixfr(Vec<Delta>),

    /// The zone is already up to date (IXFR only).
    UpToDate,
}

/// A streaming receiver for zone transfer data.
///
/// [`ZoneTransfer::run_with`] invokes the handler's methods in wire
/// order as the transfer progresses.
pub trait ZoneTransferHandler {
    /// Called when an AXFR-style transfer begins.
    fn start_axfr(&mut self) -> Result<(), Error>;

    /// Called when an IXFR transfer begins.
    fn start_ixfr(&mut self) -> Result<(), Error>;

    /// Called when a series of IXFR deletions begins. `soa` is the SOA
    /// of the version the deletions apply to.
    fn start_ixfr_deletes(&mut self, soa: &Record) -> Result<(), Error>;

    /// Called when a series of IXFR additions begins. `soa` is the SOA
    /// of the version the additions produce.
    fn start_ixfr_adds(&mut self, soa: &Record) -> Result<(), Error>;

    /// Called for each content record.
    fn handle_record(&mut self, record: &Record) -> Result<(), Error>;
}

/// The default handler, which accumulates the transfer into lists.
#[derive(Debug, Default)]
pub struct BasicHandler {
    axfr: Option<Vec<Record>>,
    ixfr: Option<Vec<Delta>>,
}

impl ZoneTransferHandler for BasicHandler {
    fn start_axfr(&mut self) -> Result<(), Error> {
        self.axfr = Some(Vec::new());
        Ok(())
    }

    fn start_ixfr(&mut self) -> Result<(), Error> {
        self.ixfr = Some(Vec::new());
        Ok(())
    }

    fn start_ixfr_deletes(&mut self, soa: &Record) -> Result<(), Error> {
        let deltas = self.ixfr.as_mut().unwrap();
        let mut delta = Delta {
            start: soa.rdata.soa_serial().unwrap_or(0),
            ..Default::default()
        };
        delta.deletes.push(soa.clone());
        deltas.push(delta);
        Ok(())
    }

    fn start_ixfr_adds(&mut self, soa: &Record) -> Result<(), Error> {
        let delta = self.ixfr.as_mut().unwrap().last_mut().unwrap();
        delta.end = soa.rdata.soa_serial().unwrap_or(0);
        delta.adds.push(soa.clone());
        Ok(())
    }

    fn handle_record(&mut self, record: &Record) -> Result<(), Error> {
        if let Some(deltas) = self.ixfr.as_mut() {
            let delta = deltas.last_mut().unwrap();
            if delta.adds.is_empty() {
                delta.deletes.push(record.clone());
            } else {
                delta.adds.push(record.clone());
            }
        } else if let Some(records) = self.axfr.as_mut() {
            records.push(record.clone());
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////
// THE TRANSFER STATE MACHINE                                         //
////////////////////////////////////////////////////////////////////////

/// The states of the transfer state machine. See [RFC 1995 § 4] for
/// the shape of an IXFR stream that drives the `Ixfr*` states.
///
/// [RFC 1995 § 4]: https://datatracker.ietf.org/doc/html/rfc1995#section-4
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    InitialSoa,
    FirstData,
    IxfrDelSoa,
    IxfrDel,
    IxfrAddSoa,
    IxfrAdd,
    Axfr,
    End,
}

/// The outcome of one query/response cycle.
enum Attempt {
    /// The transfer completed.
    Done,

    /// The server does not do IXFR; retry the transfer as AXFR.
    FallBackToAxfr,
}

/// An incoming DNS zone transfer.
///
/// See the [module documentation](self) for usage.
pub struct ZoneTransfer {
    zone: Name,
    qtype: Qtype,
    dclass: Class,
    ixfr_serial: u32,
    want_fallback: bool,
    address: SocketAddr,
    key: Option<TsigKey>,
    timeout: Duration,

    // Per-run state.
    state: State,
    rtype: Option<Qtype>,
    end_serial: u32,
    current_serial: u32,
    initial_soa: Option<Record>,
}

/// The default wall-clock budget for a transfer: 15 minutes.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(900);

impl ZoneTransfer {
    /// Creates a `ZoneTransfer` for a full zone transfer (AXFR) of
    /// `zone` from `address`, authenticated with `key` if one is
    /// given.
    pub fn new_axfr(zone: Name, address: SocketAddr, key: Option<TsigKey>) -> Self {
        Self::new(zone, Qtype::AXFR, 0, false, address, key)
    }

    /// Creates a `ZoneTransfer` for an incremental transfer (IXFR) of
    /// `zone` from `address`, given the serial of the version already
    /// held. If `fallback` is set, the transfer falls back to AXFR
    /// when the server does not support IXFR.
    pub fn new_ixfr(
        zone: Name,
        serial: u32,
        fallback: bool,
        address: SocketAddr,
        key: Option<TsigKey>,
    ) -> Self {
        Self::new(zone, Qtype::IXFR, serial, fallback, address, key)
    }

    fn new(
        zone: Name,
        qtype: Qtype,
        ixfr_serial: u32,
        want_fallback: bool,
        address: SocketAddr,
        key: Option<TsigKey>,
    ) -> Self {
        Self {
            zone,
            qtype,
            dclass: Class::IN,
            ixfr_serial,
            want_fallback,
            address,
            key,
            timeout: DEFAULT_TIMEOUT,
            state: State::InitialSoa,
            rtype: None,
            end_serial: 0,
            current_serial: 0,
            initial_soa: None,
        }
    }

    /// Returns the name of the zone being transferred.
    pub fn zone(&self) -> &Name {
        &self.zone
    }

    /// Sets an alternate DNS class for this zone transfer.
    pub fn set_class(&mut self, dclass: Class) {
        self.dclass = dclass;
    }

    /// Sets the wall-clock budget for this zone transfer. The default
    /// is 900 seconds (15 minutes).
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Returns whether the transfer produced an AXFR-style response.
    /// This is the case when an AXFR was performed, when an IXFR was
    /// answered with a full zone, and when an IXFR fell back to AXFR.
    pub fn is_axfr(&self) -> bool {
        self.rtype == Some(Qtype::AXFR)
    }

    /// Returns whether the transfer produced an IXFR-style (delta)
    /// response.
    pub fn is_ixfr(&self) -> bool {
        self.rtype == Some(Qtype::IXFR)
    }

    /// Performs the zone transfer, accumulating the result.
    pub fn run(&mut self) -> Result<XfrResult, Error> {
        let mut handler = BasicHandler::default();
        self.run_with(&mut handler)?;
        if let Some(records) = handler.axfr {
            Ok(XfrResult::Axfr(records))
        } else if let Some(deltas) = handler.ixfr {
            Ok(XfrResult::Ixfr(deltas))
        } else {
            Ok(XfrResult::UpToDate)
        }
    }

    /// Performs the zone transfer, streaming data into `handler`.
    pub fn run_with(&mut self, handler: &mut dyn ZoneTransferHandler) -> Result<(), Error> {
        let deadline = Instant::now() + self.timeout;
        self.state = State::InitialSoa;
        self.rtype = None;
        loop {
            // The TCP client lives exactly as long as one attempt; its
            // socket is closed on every exit path when it is dropped.
            match self.attempt(handler, deadline)? {
                Attempt::Done => return Ok(()),
                Attempt::FallBackToAxfr => {
                    if !self.want_fallback {
                        return Err(Error::Protocol("server doesn't support IXFR".to_owned()));
                    }
                    debug!("{}: falling back to AXFR", self.zone);
                    self.qtype = Qtype::AXFR;
                    self.state = State::InitialSoa;
                }
            }
        }
    }

    /// Runs a single query/response cycle on a fresh connection.
    fn attempt(
        &mut self,
        handler: &mut dyn ZoneTransferHandler,
        deadline: Instant,
    ) -> Result<Attempt, Error> {
        let mut client = TcpExchange::connect(self.address, deadline)?;
        let (query, request_mac) = self.build_query()?;
        client.send(&query)?;
        let mut verifier = self
            .key
            .as_ref()
            .map(|key| StreamVerifier::new(key, &request_mac.unwrap_or_default()));

        while self.state != State::End {
            let raw = client.recv()?;
            let mut response = Message::from_wire(&raw)?;

            if response.header.rcode == Rcode::NoError {
                if let Some(verifier) = verifier.as_mut() {
                    verifier.verify(&mut response, &raw, unix_now()?)?;
                }
            }

            if self.state == State::InitialSoa {
                let rcode = response.rcode();
                if rcode != ExtendedRcode::NOERROR {
                    if self.qtype == Qtype::IXFR && rcode == ExtendedRcode::NOTIMP {
                        return Ok(Attempt::FallBackToAxfr);
                    }
                    return Err(Error::Protocol(format!("server returned rcode {}", rcode)));
                }
                if let Some(question) = response.question() {
                    if question.qtype != self.qtype {
                        return Err(Error::Protocol("invalid question section".to_owned()));
                    }
                }
                if response.records(Section::Answer).is_empty() && self.qtype == Qtype::IXFR {
                    return Ok(Attempt::FallBackToAxfr);
                }
            }

            // Clone keeps the borrow checker happy; answer sections
            // are modest compared to the network transfer itself.
            for answer in response.records(Section::Answer).to_vec() {
                self.parse_rr(&answer, handler)?;
            }

            if self.state == State::End {
                if let Some(verifier) = verifier.as_ref() {
                    if !verifier.last_message_verified() {
                        return Err(Error::Protocol("last message must be signed".to_owned()));
                    }
                }
            }
        }
        Ok(Attempt::Done)
    }

    /// Builds the transfer query: the zone transfer question, plus a
    /// skeleton SOA carrying the known serial in the authority section
    /// for IXFR ([RFC 1995 § 2]), plus a TSIG record when configured.
    ///
    /// [RFC 1995 § 2]: https://datatracker.ietf.org/doc/html/rfc1995#section-2
    fn build_query(&self) -> Result<(Vec<u8>, Option<Vec<u8>>), Error> {
        let mut query = Message::new();
        query.add_question(Question::new(
            self.zone.clone(),
            self.qtype,
            Qclass::from(self.dclass),
        ));
        if self.qtype == Qtype::IXFR {
            let soa = Record::new(
                self.zone.clone(),
                Type::SOA,
                self.dclass,
                Ttl::ZERO,
                Rdata::new_soa(Name::root(), Name::root(), self.ixfr_serial, 0, 0, 0, 0),
            );
            query.add_record(soa, Section::Authority);
        }
        if let Some(key) = &self.key {
            query.set_tsig(key.clone(), unix_now()?, 300);
        }
        let (octets, mac) = query
            .to_wire_with_mac(MAX_MESSAGE_SIZE)
            .map_err(|e| Error::Protocol(format!("cannot build query: {}", e)))?;
        Ok((octets, mac.map(|mac| mac.to_vec())))
    }

    /// Feeds one answer-section record through the state machine.
    fn parse_rr(
        &mut self,
        record: &Record,
        handler: &mut dyn ZoneTransferHandler,
    ) -> Result<(), Error> {
        let rr_type = record.rr_type;
        match self.state {
            State::InitialSoa => {
                if rr_type != Type::SOA {
                    return Err(Error::Protocol("missing initial SOA".to_owned()));
                }
                self.initial_soa = Some(record.clone());
                // Remember the serial number in the initial SOA; we
                // need it to recognize the end of an IXFR.
                self.end_serial = soa_serial(record)?;
                if self.qtype == Qtype::IXFR
                    && serial_compare(self.end_serial, self.ixfr_serial) != Ordering::Greater
                {
                    debug!("{}: up to date", self.zone);
                    self.state = State::End;
                } else {
                    self.state = State::FirstData;
                }
            }

            State::FirstData => {
                // If the transfer begins with one SOA, it's an AXFR.
                // If it begins with two SOAs, it's an IXFR.
                if self.qtype == Qtype::IXFR
                    && rr_type == Type::SOA
                    && soa_serial(record)? == self.ixfr_serial
                {
                    self.rtype = Some(Qtype::IXFR);
                    handler.start_ixfr()?;
                    debug!("{}: got incremental response", self.zone);
                    self.state = State::IxfrDelSoa;
                } else {
                    // The response is a full zone, regardless of what
                    // was asked for.
                    self.rtype = Some(Qtype::AXFR);
                    handler.start_axfr()?;
                    handler.handle_record(self.initial_soa.as_ref().unwrap())?;
                    debug!("{}: got nonincremental response", self.zone);
                    self.state = State::Axfr;
                }
                return self.parse_rr(record, handler); // Restart...
            }

            State::IxfrDelSoa => {
                handler.start_ixfr_deletes(record)?;
                self.state = State::IxfrDel;
            }

            State::IxfrDel => {
                if rr_type == Type::SOA {
                    self.current_serial = soa_serial(record)?;
                    self.state = State::IxfrAddSoa;
                    return self.parse_rr(record, handler); // Restart...
                }
                handler.handle_record(record)?;
            }

            State::IxfrAddSoa => {
                handler.start_ixfr_adds(record)?;
                self.state = State::IxfrAdd;
            }

            State::IxfrAdd => {
                if rr_type == Type::SOA {
                    let serial = soa_serial(record)?;
                    if serial == self.end_serial {
                        self.state = State::End;
                        return Ok(());
                    } else if serial != self.current_serial {
                        return Err(Error::Protocol(format!(
                            "IXFR out of sync: expected serial {}, got {}",
                            self.current_serial, serial
                        )));
                    } else {
                        self.state = State::IxfrDelSoa;
                        return self.parse_rr(record, handler); // Restart...
                    }
                }
                handler.handle_record(record)?;
            }

            State::Axfr => {
                // Old BINDs sent cross-class A records for non-IN
                // classes.
                if rr_type == Type::A && record.class != self.dclass {
                    return Ok(());
                }
                handler.handle_record(record)?;
                if rr_type == Type::SOA {
                    self.state = State::End;
                }
            }

            State::End => {
                return Err(Error::Protocol("extra data".to_owned()));
            }
        }
        Ok(())
    }
}

/// Extracts the serial from an SOA record.
fn soa_serial(record: &Record) -> Result<u32, Error> {
    record
        .rdata
        .soa_serial()
        .ok_or_else(|| Error::Protocol("malformed SOA".to_owned()))
}

/// Returns the current time as a TSIG [`TimeSigned`].
fn unix_now() -> Result<TimeSigned, Error> {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_err(|_| Error::Protocol("system clock is before the epoch".to_owned()))?;
    TimeSigned::try_from_unix_time(now.as_secs())
        .map_err(|_| Error::Protocol("system clock out of TSIG range".to_owned()))
}

////////////////////////////////////////////////////////////////////////
// THE FRAMED TCP CLIENT                                              //
////////////////////////////////////////////////////////////////////////

/// A TCP exchange carrying two-octet-length-prefixed DNS messages,
/// with every operation bounded by a wall-clock deadline. The socket
/// is closed when the `TcpExchange` is dropped.
struct TcpExchange {
    stream: TcpStream,
    deadline: Instant,
}

impl TcpExchange {
    /// Connects to `address`, spending no more than the time remaining
    /// until `deadline`.
    fn connect(address: SocketAddr, deadline: Instant) -> Result<Self, Error> {
        let timeout = remaining(deadline)?;
        let stream = TcpStream::connect_timeout(&address, timeout).map_err(Error::from)?;
        Ok(Self { stream, deadline })
    }

    /// Sends one framed message.
    fn send(&mut self, message: &[u8]) -> Result<(), Error> {
        debug_assert!(message.len() <= u16::MAX as usize);
        self.stream.set_write_timeout(Some(remaining(self.deadline)?))?;
        self.stream
            .write_all(&(message.len() as u16).to_be_bytes())?;
        self.stream.write_all(message)?;
        Ok(())
    }

    /// Receives one framed message, honoring the deadline across
    /// however many reads it takes.
    fn recv(&mut self) -> Result<Vec<u8>, Error> {
        let mut length = [0; 2];
        self.read_fully(&mut length)?;
        let mut message = vec![0; u16::from_be_bytes(length) as usize];
        self.read_fully(&mut message)?;
        Ok(message)
    }

    fn read_fully(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let mut filled = 0;
        while filled < buf.len() {
            self.stream.set_read_timeout(Some(remaining(self.deadline)?))?;
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(Error::Protocol(
                        "connection closed mid-transfer".to_owned(),
                    ))
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::from(e)),
            }
        }
        Ok(())
    }
}

/// Computes the time until the deadline, failing with
/// [`Error::Timeout`] if it has passed.
fn remaining(deadline: Instant) -> Result<Duration, Error> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|left| !left.is_zero())
        .ok_or(Error::Timeout)
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error terminating a zone transfer.
#[derive(Debug)]
pub enum Error {
    /// An I/O error on the TCP connection.
    Io(io::Error),

    /// The transfer's wall-clock budget was exhausted.
    Timeout,

    /// A received message could not be parsed.
    WireParse(reader::Error),

    /// TSIG verification of a received message failed.
    Tsig(VerificationError),

    /// A protocol or synchronization failure, with a human-readable
    /// cause.
    Protocol(String),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::Timeout,
            _ => Self::Io(e),
        }
    }
}

impl From<reader::Error> for Error {
    fn from(e: reader::Error) -> Self {
        Self::WireParse(e)
    }
}

impl From<VerificationError> for Error {
    fn from(e: VerificationError) -> Self {
        Self::Tsig(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Timeout => f.write_str("zone transfer timed out"),
            Self::WireParse(e) => write!(f, "malformed message: {}", e),
            Self::Tsig(e) => write!(f, "TSIG failure: {}", e),
            Self::Protocol(cause) => f.write_str(cause),
        }
    }
}

impl std::error::Error for Error {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::thread;

    use super::*;
    use crate::message::{Header, Rcode};

    fn name(from: &str) -> Name {
        from.parse().unwrap()
    }

    fn soa(serial: u32) -> Record {
        Record::new(
            name("xfr.test."),
            Type::SOA,
            Class::IN,
            Ttl::from(3600),
            Rdata::new_soa(
                &name("ns1.xfr.test."),
                &name("admin.xfr.test."),
                serial,
                3600,
                900,
                86400,
                300,
            ),
        )
    }

    fn a_record(owner: &str, address: &str) -> Record {
        Record::new(
            name(owner),
            Type::A,
            Class::IN,
            Ttl::from(3600),
            Rdata::new_a(address.parse().unwrap()),
        )
    }

    /// Reads one framed message from the stream.
    fn read_framed(stream: &mut TcpStream) -> Vec<u8> {
        let mut length = [0; 2];
        stream.read_exact(&mut length).unwrap();
        let mut message = vec![0; u16::from_be_bytes(length) as usize];
        stream.read_exact(&mut message).unwrap();
        message
    }

    /// Writes one framed message to the stream.
    fn write_framed(stream: &mut TcpStream, message: &[u8]) {
        stream
            .write_all(&(message.len() as u16).to_be_bytes())
            .unwrap();
        stream.write_all(message).unwrap();
    }

    /// A scripted server connection: `answers` holds the answer
    /// sections of the messages to send, in order; `rcode` applies to
    /// all of them.
    fn serve_connection(stream: &mut TcpStream, rcode: Rcode, answers: &[Vec<Record>]) {
        let query = Message::from_wire(&read_framed(stream)).unwrap();
        for answer in answers {
            let mut response = Message::new();
            response.header = Header::with_id(query.header.id);
            response.header.qr = true;
            response.header.aa = true;
            response.header.rcode = rcode;
            if let Some(question) = query.question() {
                response.add_question(question.clone());
            }
            for record in answer {
                response.add_record(record.clone(), Section::Answer);
            }
            write_framed(stream, &response.to_wire(MAX_MESSAGE_SIZE).unwrap());
        }
    }

    /// Starts a server that serves the given scripted connections and
    /// returns its address.
    fn spawn_server(connections: Vec<(Rcode, Vec<Vec<Record>>)>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        thread::spawn(move || {
            for (rcode, answers) in connections {
                let (mut stream, _) = listener.accept().unwrap();
                serve_connection(&mut stream, rcode, &answers);
            }
        });
        address
    }

    #[test]
    fn axfr_collects_the_flat_record_list() {
        let records = vec![
            soa(1),
            a_record("www.xfr.test.", "192.0.2.1"),
            a_record("mail.xfr.test.", "192.0.2.2"),
            soa(1),
        ];
        let address = spawn_server(vec![(Rcode::NoError, vec![records.clone()])]);
        let mut transfer = ZoneTransfer::new_axfr(name("xfr.test."), address, None);
        match transfer.run().unwrap() {
            XfrResult::Axfr(received) => assert_eq!(received, records),
            other => panic!("expected an AXFR result, got {:?}", other),
        }
        assert!(transfer.is_axfr());
    }

    #[test]
    fn axfr_spanning_multiple_messages_works() {
        let first = vec![soa(1), a_record("www.xfr.test.", "192.0.2.1")];
        let second = vec![a_record("mail.xfr.test.", "192.0.2.2"), soa(1)];
        let address = spawn_server(vec![(Rcode::NoError, vec![first.clone(), second.clone()])]);
        let mut transfer = ZoneTransfer::new_axfr(name("xfr.test."), address, None);
        match transfer.run().unwrap() {
            XfrResult::Axfr(received) => {
                let expected: Vec<Record> =
                    first.into_iter().chain(second.into_iter()).collect();
                assert_eq!(received, expected);
            }
            other => panic!("expected an AXFR result, got {:?}", other),
        }
    }

    #[test]
    fn ixfr_up_to_date_is_reported() {
        // A single SOA whose serial does not exceed ours means the
        // zone is current.
        let address = spawn_server(vec![(Rcode::NoError, vec![vec![soa(200)]])]);
        let mut transfer = ZoneTransfer::new_ixfr(name("xfr.test."), 200, false, address, None);
        assert!(matches!(transfer.run().unwrap(), XfrResult::UpToDate));
        assert!(!transfer.is_axfr());
        assert!(!transfer.is_ixfr());
    }

    #[test]
    fn ixfr_collects_deltas() {
        // Two deltas: 1 -> 2 and 2 -> 3.
        let stream = vec![
            soa(3),
            soa(1),
            a_record("old.xfr.test.", "192.0.2.1"),
            soa(2),
            a_record("new.xfr.test.", "192.0.2.2"),
            soa(2),
            a_record("older.xfr.test.", "192.0.2.3"),
            soa(3),
            a_record("newer.xfr.test.", "192.0.2.4"),
            soa(3),
        ];
        let address = spawn_server(vec![(Rcode::NoError, vec![stream])]);
        let mut transfer = ZoneTransfer::new_ixfr(name("xfr.test."), 1, false, address, None);
        match transfer.run().unwrap() {
            XfrResult::Ixfr(deltas) => {
                assert_eq!(deltas.len(), 2);
                assert_eq!((deltas[0].start, deltas[0].end), (1, 2));
                assert_eq!(deltas[0].deletes.len(), 2); // SOA(1) + one record
                assert_eq!(deltas[0].adds.len(), 2); // SOA(2) + one record
                assert_eq!(deltas[0].deletes[1], a_record("old.xfr.test.", "192.0.2.1"));
                assert_eq!(deltas[0].adds[1], a_record("new.xfr.test.", "192.0.2.2"));
                assert_eq!((deltas[1].start, deltas[1].end), (2, 3));
            }
            other => panic!("expected an IXFR result, got {:?}", other),
        }
        assert!(transfer.is_ixfr());
    }

    #[test]
    fn ixfr_answered_with_a_full_zone_reports_axfr() {
        // The server answers the IXFR with an AXFR-style stream; the
        // result must be typed as AXFR.
        let records = vec![soa(5), a_record("www.xfr.test.", "192.0.2.1"), soa(5)];
        let address = spawn_server(vec![(Rcode::NoError, vec![records])]);
        let mut transfer = ZoneTransfer::new_ixfr(name("xfr.test."), 1, false, address, None);
        assert!(matches!(transfer.run().unwrap(), XfrResult::Axfr(_)));
        assert!(transfer.is_axfr());
        assert!(!transfer.is_ixfr());
    }

    #[test]
    fn notimp_triggers_fallback_when_enabled() {
        let records = vec![soa(5), a_record("www.xfr.test.", "192.0.2.1"), soa(5)];
        let address = spawn_server(vec![
            (Rcode::NotImp, vec![vec![]]),
            (Rcode::NoError, vec![records]),
        ]);
        let mut transfer = ZoneTransfer::new_ixfr(name("xfr.test."), 100, true, address, None);
        match transfer.run().unwrap() {
            XfrResult::Axfr(received) => assert_eq!(received.len(), 3),
            other => panic!("expected an AXFR result, got {:?}", other),
        }
        assert!(transfer.is_axfr());
    }

    #[test]
    fn notimp_without_fallback_fails() {
        let address = spawn_server(vec![(Rcode::NotImp, vec![vec![]])]);
        let mut transfer = ZoneTransfer::new_ixfr(name("xfr.test."), 100, false, address, None);
        match transfer.run() {
            Err(Error::Protocol(cause)) => {
                assert_eq!(cause, "server doesn't support IXFR");
            }
            other => panic!("expected a protocol error, got {:?}", other),
        }
    }

    #[test]
    fn empty_ixfr_answers_also_trigger_fallback() {
        let records = vec![soa(5), a_record("www.xfr.test.", "192.0.2.1"), soa(5)];
        let address = spawn_server(vec![
            (Rcode::NoError, vec![vec![]]),
            (Rcode::NoError, vec![records]),
        ]);
        let mut transfer = ZoneTransfer::new_ixfr(name("xfr.test."), 100, true, address, None);
        assert!(matches!(transfer.run().unwrap(), XfrResult::Axfr(_)));
    }

    #[test]
    fn missing_initial_soa_is_an_error() {
        let records = vec![a_record("www.xfr.test.", "192.0.2.1")];
        let address = spawn_server(vec![(Rcode::NoError, vec![records])]);
        let mut transfer = ZoneTransfer::new_axfr(name("xfr.test."), address, None);
        match transfer.run() {
            Err(Error::Protocol(cause)) => assert_eq!(cause, "missing initial SOA"),
            other => panic!("expected a protocol error, got {:?}", other),
        }
    }

    #[test]
    fn ixfr_out_of_sync_is_an_error() {
        let stream = vec![
            soa(3),
            soa(1),
            soa(2),
            soa(7), // The adds must end with serial 2 or 3.
        ];
        let address = spawn_server(vec![(Rcode::NoError, vec![stream])]);
        let mut transfer = ZoneTransfer::new_ixfr(name("xfr.test."), 1, false, address, None);
        match transfer.run() {
            Err(Error::Protocol(cause)) => assert!(cause.starts_with("IXFR out of sync")),
            other => panic!("expected a protocol error, got {:?}", other),
        }
    }

    #[test]
    fn tsig_signed_transfers_verify() {
        use crate::message::tsig::Algorithm;

        let key = TsigKey::new(
            &name("xfr.key."),
            Algorithm::HmacSha256,
            b"xfer-secret",
        );
        let records = vec![soa(1), a_record("www.xfr.test.", "192.0.2.1"), soa(1)];

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        let server_key = key.clone();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let raw_query = read_framed(&mut stream);
            let query = Message::from_wire(&raw_query).unwrap();

            // Verify the query and extract its MAC for the response.
            let read = crate::message::tsig::ReadTsigRr::try_from(query.tsig().unwrap()).unwrap();
            read.verify_request(
                &raw_query[..query.tsig_start().unwrap()],
                &server_key,
                read.time_signed(),
            )
            .unwrap();
            let request_mac = read.mac().to_vec();

            let mut response = Message::new();
            response.header = Header::with_id(query.header.id);
            response.header.qr = true;
            response.header.aa = true;
            response.add_question(query.question().unwrap().clone());
            for record in &records {
                response.add_record(record.clone(), Section::Answer);
            }
            response.set_tsig_response(
                server_key.clone(),
                read.time_signed(),
                300,
                request_mac,
            );
            write_framed(&mut stream, &response.to_wire(MAX_MESSAGE_SIZE).unwrap());
        });

        let mut transfer =
            ZoneTransfer::new_axfr(name("xfr.test."), address, Some(key));
        match transfer.run().unwrap() {
            XfrResult::Axfr(received) => assert_eq!(received.len(), 3),
            other => panic!("expected an AXFR result, got {:?}", other),
        }
    }

    #[test]
    fn unsigned_final_messages_fail_signed_transfers() {
        use crate::message::tsig::Algorithm;

        let key = TsigKey::new(&name("xfr.key."), Algorithm::HmacSha256, b"xfer-secret");
        let records = vec![soa(1), soa(1)];
        let address = spawn_server(vec![(Rcode::NoError, vec![records])]);
        let mut transfer = ZoneTransfer::new_axfr(name("xfr.test."), address, Some(key));
        // The scripted server never signs, so the very first (and
        // final) message fails stream verification.
        assert!(matches!(
            transfer.run(),
            Err(Error::Tsig(VerificationError::FormErr))
        ));
    }

    #[test]
    fn serial_compare_implements_rfc_1982() {
        assert_eq!(serial_compare(1, 1), Ordering::Equal);
        assert_eq!(serial_compare(1, 2), Ordering::Less);
        assert_eq!(serial_compare(2, 1), Ordering::Greater);
        // Wraparound: 4294967295 < 0 < 100 in serial space.
        assert_eq!(serial_compare(u32::MAX, 0), Ordering::Less);
        assert_eq!(serial_compare(0, u32::MAX), Ordering::Greater);
        assert_eq!(serial_compare(0x8000_0000, 1), Ordering::Less);
    }
}
