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

//! Implementation of reading and writing of DNS messages.

use std::fmt;

mod constants;
mod header;
mod opcode;
mod question;
mod rcode;
pub mod reader;
pub mod tsig;
pub mod writer;
pub use constants::MAX_MESSAGE_SIZE;
pub use header::Header;
pub use opcode::{IntoOpcodeError, Opcode};
pub use question::{Qclass, Qtype, Question};
pub use rcode::{ExtendedRcode, IntoRcodeError, Rcode};
pub use reader::Reader;
pub use writer::{CompressionMode, Writer};

use crate::class::Class;
use crate::name::Name;
use crate::rr::rdata::{EdnsOption, Rdata, TimeSigned};
use crate::rr::{Record, Rrset, Ttl, Type};
use tsig::TsigKey;

////////////////////////////////////////////////////////////////////////
// SECTIONS                                                           //
////////////////////////////////////////////////////////////////////////

/// The four sections of a DNS message ([RFC 1035 § 4.1]).
///
/// [RFC 1035 § 4.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Section {
    Question,
    Answer,
    Authority,
    Additional,
}

impl Section {
    /// Returns the section's index in the message header counts.
    pub fn index(self) -> usize {
        match self {
            Self::Question => 0,
            Self::Answer => 1,
            Self::Authority => 2,
            Self::Additional => 3,
        }
    }

    /// The three record sections, in wire order.
    const RECORD_SECTIONS: [Section; 3] = [Self::Answer, Self::Authority, Self::Additional];
}

////////////////////////////////////////////////////////////////////////
// TSIG STATE                                                         //
////////////////////////////////////////////////////////////////////////

/// The TSIG status of a received message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TsigState {
    /// The message was not signed.
    Unsigned,

    /// The message was signed; no verification has been attempted.
    Signed,

    /// The message was signed and verification succeeded.
    Verified,

    /// The message was an unsigned message within a signed
    /// multi-message response.
    Intermediate,

    /// The message was signed and verification failed, or it was not
    /// signed when it should have been.
    Failed,
}

////////////////////////////////////////////////////////////////////////
// MESSAGES                                                           //
////////////////////////////////////////////////////////////////////////

/// A DNS message: a [`Header`] plus the question, answer, authority,
/// and additional sections.
///
/// `Message` is the parsed, owned form of a DNS message. It is decoded
/// from the wire with [`Message::from_wire`] and rendered with
/// [`Message::to_wire`], which compresses domain names, truncates at
/// RRset boundaries when the size limit is exceeded, and appends a
/// TSIG record when a key has been configured with
/// [`Message::set_tsig`] and friends.
///
/// The section counts in the header are synchronized with the actual
/// section contents whenever the message is rendered.
#[derive(Clone, Debug)]
pub struct Message {
    pub header: Header,
    questions: Vec<Question>,
    answers: Vec<Record>,
    authorities: Vec<Record>,
    additionals: Vec<Record>,
    tsig: Option<TsigConfig>,
    tsig_start: Option<usize>,
    sig0_start: Option<usize>,
    tsig_state: TsigState,
    size: usize,
}

/// TSIG signing configuration for an outgoing message.
#[derive(Clone, Debug)]
struct TsigConfig {
    key: TsigKey,
    time_signed: TimeSigned,
    fudge: u16,
    mode: TsigMode,
}

/// How an outgoing message relates to the rest of its exchange for
/// TSIG purposes.
#[derive(Clone, Debug)]
enum TsigMode {
    Request,
    Response { request_mac: Vec<u8> },
    Subsequent { prior_mac: Vec<u8> },
}

impl Message {
    /// Creates a new, empty `Message` with a random message ID.
    pub fn new() -> Self {
        Self::with_header(Header::new())
    }

    /// Creates a new `Message` containing the given question, with a
    /// random message ID and the RD bit set. This is the usual shape
    /// of a resolver query.
    pub fn new_query(question: Question) -> Self {
        let mut message = Self::new();
        message.header.rd = true;
        message.add_question(question);
        message
    }

    fn with_header(header: Header) -> Self {
        Self {
            header,
            questions: Vec::new(),
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
            tsig: None,
            tsig_start: None,
            sig0_start: None,
            tsig_state: TsigState::Unsigned,
            size: 0,
        }
    }

    ////////////////////////////////////////////////////////////////////
    // SECTION ACCESS                                                 //
    ////////////////////////////////////////////////////////////////////

    /// Adds a question to the question section, adjusting the header
    /// count.
    pub fn add_question(&mut self, question: Question) {
        self.header.inc_count(Section::Question.index());
        self.questions.push(question);
    }

    /// Returns the first question, if any.
    pub fn question(&self) -> Option<&Question> {
        self.questions.first()
    }

    /// Returns all questions.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Adds a record to a record section, adjusting the header count.
    /// This panics if `section` is [`Section::Question`].
    pub fn add_record(&mut self, record: Record, section: Section) {
        self.header.inc_count(section.index());
        self.section_mut(section).push(record);
    }

    /// Returns the records of a record section. This panics if
    /// `section` is [`Section::Question`].
    pub fn records(&self, section: Section) -> &[Record] {
        match section {
            Section::Question => panic!("the question section does not hold records"),
            Section::Answer => &self.answers,
            Section::Authority => &self.authorities,
            Section::Additional => &self.additionals,
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut Vec<Record> {
        match section {
            Section::Question => panic!("the question section does not hold records"),
            Section::Answer => &mut self.answers,
            Section::Authority => &mut self.authorities,
            Section::Additional => &mut self.additionals,
        }
    }

    /// Removes all records from a record section, adjusting the header
    /// count.
    pub fn remove_records(&mut self, section: Section) {
        self.section_mut(section).clear();
        self.header.set_count(section.index(), 0);
    }

    /// Returns whether an RRset with the given owner and type is
    /// present in the given record section.
    pub fn find_rrset(&self, owner: &Name, rr_type: Type, section: Section) -> bool {
        self.records(section)
            .iter()
            .any(|record| record.rr_type == rr_type && &record.owner == owner)
    }

    /// Groups the records of a record section into RRsets, in order of
    /// first appearance.
    pub fn section_rrsets(&self, section: Section) -> Vec<Rrset> {
        let mut rrsets: Vec<Rrset> = Vec::new();
        for record in self.records(section) {
            if let Some(rrset) = rrsets.iter_mut().find(|rrset| {
                rrset.rr_type == record.rrset_type()
                    && rrset.class == record.class
                    && rrset.owner == record.owner
            }) {
                let _ = rrset.add_record(record);
            } else {
                rrsets.push(Rrset::from_record(record));
            }
        }
        rrsets
    }

    ////////////////////////////////////////////////////////////////////
    // PSEUDO-RECORD ACCESS                                           //
    ////////////////////////////////////////////////////////////////////

    /// Returns the TSIG record, which must be the last record of the
    /// additional section, if one is present.
    pub fn tsig(&self) -> Option<&Record> {
        self.additionals
            .last()
            .filter(|record| record.rr_type == Type::TSIG)
    }

    /// Returns the OPT pseudo-record from the additional section, if
    /// one is present.
    pub fn opt(&self) -> Option<&Record> {
        self.additionals
            .iter()
            .find(|record| record.rr_type == Type::OPT)
    }

    /// Makes this an EDNS message by adding an OPT pseudo-record with
    /// the given requestor's payload size, EDNS version, extended
    /// flags, and options.
    pub fn set_edns(&mut self, udp_payload_size: u16, version: u8, flags: u16, options: &[EdnsOption]) {
        let ttl = ((version as u32) << 16) | (flags as u32);
        let opt = Record::new(
            Name::root().clone(),
            Type::OPT,
            Class::from(udp_payload_size),
            Ttl::from_unchecked(ttl),
            Rdata::new_opt(options).expect("OPT RDATA too long"),
        );
        self.add_record(opt, Section::Additional);
    }

    /// Returns the message's extended RCODE: the header RCODE plus the
    /// extension bits from the OPT pseudo-record, if present.
    pub fn rcode(&self) -> ExtendedRcode {
        let lower = u8::from(self.header.rcode) as u16;
        match self.opt() {
            Some(opt) => {
                let upper = (u32::from(opt.ttl) >> 24) as u16;
                ExtendedRcode::from((upper << 4) | lower)
            }
            None => ExtendedRcode::from(lower),
        }
    }

    ////////////////////////////////////////////////////////////////////
    // TSIG CONFIGURATION AND STATE                                   //
    ////////////////////////////////////////////////////////////////////

    /// Configures this message to be signed as a request when it is
    /// rendered.
    pub fn set_tsig(&mut self, key: TsigKey, time_signed: TimeSigned, fudge: u16) {
        self.tsig = Some(TsigConfig {
            key,
            time_signed,
            fudge,
            mode: TsigMode::Request,
        });
    }

    /// Configures this message to be signed as a response when it is
    /// rendered. `request_mac` must be the MAC of the request being
    /// answered.
    pub fn set_tsig_response(
        &mut self,
        key: TsigKey,
        time_signed: TimeSigned,
        fudge: u16,
        request_mac: Vec<u8>,
    ) {
        self.tsig = Some(TsigConfig {
            key,
            time_signed,
            fudge,
            mode: TsigMode::Response { request_mac },
        });
    }

    /// Configures this message to be signed as a subsequent message of
    /// a multi-message response when it is rendered. `prior_mac` must
    /// be the MAC of the previous signed message of the stream.
    pub fn set_tsig_subsequent(
        &mut self,
        key: TsigKey,
        time_signed: TimeSigned,
        fudge: u16,
        prior_mac: Vec<u8>,
    ) {
        self.tsig = Some(TsigConfig {
            key,
            time_signed,
            fudge,
            mode: TsigMode::Subsequent { prior_mac },
        });
    }

    /// Returns the offset of the first TSIG record seen when this
    /// message was decoded from the wire.
    pub fn tsig_start(&self) -> Option<usize> {
        self.tsig_start
    }

    /// Returns the offset of the first SIG(0) record (a SIG record
    /// with type covered 0) seen when this message was decoded from
    /// the wire.
    pub fn sig0_start(&self) -> Option<usize> {
        self.sig0_start
    }

    /// Returns whether this message carried a TSIG record.
    pub fn is_signed(&self) -> bool {
        matches!(
            self.tsig_state,
            TsigState::Signed | TsigState::Verified | TsigState::Failed
        )
    }

    /// Returns whether this message carried a TSIG record that was
    /// verified successfully.
    pub fn is_verified(&self) -> bool {
        self.tsig_state == TsigState::Verified
    }

    /// Returns the TSIG status of this message.
    pub fn tsig_state(&self) -> TsigState {
        self.tsig_state
    }

    pub(crate) fn set_tsig_state(&mut self, state: TsigState) {
        self.tsig_state = state;
    }

    /// Returns the size of the message on the wire. Only valid after
    /// the message has been converted to or from wire format.
    pub fn size(&self) -> usize {
        self.size
    }

    ////////////////////////////////////////////////////////////////////
    // WIRE DECODING                                                  //
    ////////////////////////////////////////////////////////////////////

    /// Decodes a `Message` from its wire form.
    ///
    /// If the TC (truncation) bit is set in the header, a parse
    /// failure partway through the message yields the successfully
    /// parsed prefix instead of an error; without TC, any parse
    /// failure is fatal.
    pub fn from_wire(octets: &[u8]) -> Result<Self, reader::Error> {
        let mut reader = Reader::try_from(octets)?;
        let header = reader.header();
        let truncated = header.tc;
        let mut message = Self::with_header(header);

        let result = message.read_sections(&mut reader);
        match result {
            Ok(()) => (),
            Err(e) => {
                if !truncated {
                    return Err(e);
                }
            }
        }
        if message.tsig().is_some() {
            message.tsig_state = TsigState::Signed;
        }
        message.size = reader.cursor();
        Ok(message)
    }

    /// Reads the four sections per the header counts.
    fn read_sections(&mut self, reader: &mut Reader) -> Result<(), reader::Error> {
        for _ in 0..self.header.count(Section::Question.index()) {
            let question = reader.read_question()?;
            self.questions.push(question);
        }
        for section in Section::RECORD_SECTIONS {
            for _ in 0..self.header.count(section.index()) {
                let position = reader.cursor();
                let record = reader.read_rr()?;
                if record.rr_type == Type::TSIG {
                    self.tsig_start.get_or_insert(position);
                }
                if record.rr_type == Type::SIG
                    && record.rdata.sig_type_covered() == Some(Type::from(0))
                {
                    self.sig0_start.get_or_insert(position);
                }
                self.section_mut(section).push(record);
            }
        }
        Ok(())
    }

    ////////////////////////////////////////////////////////////////////
    // WIRE ENCODING                                                  //
    ////////////////////////////////////////////////////////////////////

    /// Renders the `Message` into its wire form, with `max_len` as the
    /// size limit.
    ///
    /// If the message does not fit, records are dropped from the end,
    /// never splitting an RRset, and the TC bit is set (unless only
    /// additional-section records were dropped). If a TSIG key has
    /// been configured, the message is signed and the TSIG record
    /// appended within the limit.
    pub fn to_wire(&mut self, max_len: usize) -> Result<Vec<u8>, writer::Error> {
        self.to_wire_with_mac(max_len).map(|(octets, _)| octets)
    }

    /// Like [`Message::to_wire`], but also returns the TSIG MAC if the
    /// message was signed. Zone-transfer and resolver code needs the
    /// MAC to verify the response.
    pub fn to_wire_with_mac(
        &mut self,
        max_len: usize,
    ) -> Result<(Vec<u8>, Option<Box<[u8]>>), writer::Error> {
        let mut writer = Writer::new(max_len)?;
        if let Some(tsig) = &self.tsig {
            writer.reserve(tsig.key.record_length())?;
        }

        let mut header = self.header.clone();
        header.set_count(Section::Question.index(), self.questions.len() as u16);
        for section in Section::RECORD_SECTIONS {
            let len = self.records(section).len();
            if len > u16::MAX as usize {
                return Err(writer::Error::CountOverflow);
            }
            header.set_count(section.index(), len as u16);
        }

        writer.write_header(&header)?;
        for question in &self.questions {
            writer.add_question(question)?;
        }

        'sections: for (i, section) in Section::RECORD_SECTIONS.into_iter().enumerate() {
            let records = self.records(section);
            let mut boundary = writer.mark();
            let mut rendered = 0;
            let mut last_record: Option<&Record> = None;
            for (j, record) in records.iter().enumerate() {
                if let Some(last) = last_record {
                    if !last.same_rrset(record) {
                        boundary = writer.mark();
                        rendered = j;
                    }
                }
                last_record = Some(record);
                if writer.add_rr(record).is_err() {
                    // Undo the partial RRset and stop. The TC bit is
                    // not set when only additional data was dropped.
                    writer.rewind(boundary);
                    if section != Section::Additional {
                        header.tc = true;
                    }
                    header.set_count(section.index(), rendered as u16);
                    for later in &Section::RECORD_SECTIONS[i + 1..] {
                        header.set_count(later.index(), 0);
                    }
                    writer.write_header(&header)?;
                    break 'sections;
                }
            }
        }

        let mac = if let Some(tsig) = &self.tsig {
            header.inc_count(Section::Additional.index());
            writer.write_header(&header)?;
            let prepared = tsig::PreparedTsigRr::new_for_request(
                &tsig.key,
                tsig.time_signed,
                tsig.fudge,
                header.id,
            );
            let (rdata, mac) = match &tsig.mode {
                TsigMode::Request => prepared.sign_request(writer.as_slice(), &tsig.key),
                TsigMode::Response { request_mac } => {
                    prepared.sign_response(writer.as_slice(), request_mac, &tsig.key)
                }
                TsigMode::Subsequent { prior_mac } => {
                    prepared.sign_subsequent(writer.as_slice(), prior_mac, &tsig.key)
                }
            };
            writer.unreserve(tsig.key.record_length());
            let tsig_record = Record::new(
                tsig.key.name().clone(),
                Type::TSIG,
                Class::from(u16::from(Qclass::ANY)),
                Ttl::ZERO,
                rdata,
            );
            writer.add_rr(&tsig_record)?;
            Some(mac)
        } else {
            None
        };

        let octets = writer.finish();
        self.size = octets.len();
        Ok((octets, mac))
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            ";; opcode: {}, rcode: {}, id: {}",
            self.header.opcode, self.rcode(), self.header.id
        )?;
        writeln!(f, ";; QUESTION SECTION:")?;
        for question in &self.questions {
            writeln!(f, ";{}", question)?;
        }
        for (section, label) in [
            (Section::Answer, "ANSWER"),
            (Section::Authority, "AUTHORITY"),
            (Section::Additional, "ADDITIONAL"),
        ] {
            writeln!(f, ";; {} SECTION:", label)?;
            for record in self.records(section) {
                writeln!(f, "{}", record)?;
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
