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

//! The abstract resolver contract.
//!
//! A [`Resolver`] sends DNS queries and returns responses. This crate
//! defines only the contract; concrete network resolvers (UDP-first
//! with TCP retry, and so on) are built on top of it. Implementations
//! are expected to honor the configuration surface: retry truncated
//! responses over TCP unless truncation is ignored, reject responses
//! whose ID or question does not match the query, and apply/verify
//! TSIG when a key is set.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::message::tsig::{TsigKey, VerificationError};
use crate::message::{reader, Message};
use crate::rr::rdata::EdnsOption;

////////////////////////////////////////////////////////////////////////
// THE RESOLVER TRAIT                                                 //
////////////////////////////////////////////////////////////////////////

/// A sender of DNS queries.
///
/// The setters configure subsequent sends; they do not affect queries
/// already in flight.
pub trait Resolver: Send + Sync {
    /// Sends a message and waits for the response.
    fn send(&self, query: &Message) -> Result<Message, Error>;

    /// Sets the port to communicate with on the server.
    fn set_port(&mut self, port: u16);

    /// Sets whether queries are sent over TCP by default.
    fn set_tcp(&mut self, flag: bool);

    /// Sets whether truncated responses are accepted as-is. When not
    /// ignored, a truncated response over UDP causes a retry over TCP.
    fn set_ignore_truncation(&mut self, flag: bool);

    /// Configures EDNS on outgoing messages. A `level` of `None`
    /// disables EDNS; `Some(0)` enables EDNS(0). A zero `payload_size`
    /// selects the implementation's default.
    fn set_edns(&mut self, level: Option<u8>, payload_size: u16, flags: u16, options: Vec<EdnsOption>);

    /// Specifies the TSIG key that queries are signed with (and
    /// responses verified against).
    fn set_tsig_key(&mut self, key: TsigKey);

    /// Sets the amount of time to wait for a response before giving
    /// up.
    fn set_timeout(&mut self, timeout: Duration);

    /// Sends a message without blocking, delivering the outcome to
    /// `listener` when it is available. The returned handle identifies
    /// the in-flight query; the same identifier is passed to the
    /// listener. Note that the listener may be invoked before this
    /// method returns.
    fn send_async(&self, query: Message, listener: Arc<dyn ResolverListener>) -> AsyncHandle
    where
        Self: Clone + Sized + 'static,
    {
        static NEXT_ID: AtomicUsize = AtomicUsize::new(0);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let resolver = self.clone();
        thread::spawn(move || match resolver.send(&query) {
            Ok(response) => listener.receive_message(id, response),
            Err(error) => listener.handle_exception(id, error),
        });
        AsyncHandle { id }
    }
}

/// The callback interface for [`Resolver::send_async`].
pub trait ResolverListener: Send + Sync {
    /// Called when a response arrives. `id` matches the
    /// [`AsyncHandle`] of the query.
    fn receive_message(&self, id: usize, response: Message);

    /// Called when the query fails. `id` matches the [`AsyncHandle`]
    /// of the query.
    fn handle_exception(&self, id: usize, error: Error);
}

/// An identifier for an asynchronous query started with
/// [`Resolver::send_async`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AsyncHandle {
    id: usize,
}

impl AsyncHandle {
    /// Returns the identifier passed to the listener.
    pub fn id(&self) -> usize {
        self.id
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error produced while sending a query or receiving its response.
#[derive(Debug)]
pub enum Error {
    /// An I/O failure on the underlying socket.
    Io(io::Error),

    /// No response arrived within the configured timeout.
    Timeout,

    /// The response could not be parsed.
    WireParse(reader::Error),

    /// The response's message ID does not match the query's.
    IdMismatch,

    /// The response's question does not match the query's.
    QuestionMismatch,

    /// TSIG verification of the response failed.
    Tsig(VerificationError),
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
            Self::Timeout => f.write_str("query timed out"),
            Self::WireParse(e) => write!(f, "malformed response: {}", e),
            Self::IdMismatch => f.write_str("response ID does not match query"),
            Self::QuestionMismatch => f.write_str("response question does not match query"),
            Self::Tsig(e) => write!(f, "TSIG failure: {}", e),
        }
    }
}

impl std::error::Error for Error {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::class::Class;
    use crate::message::{Qclass, Qtype, Question, Rcode, Section};
    use crate::name::Name;
    use crate::rr::{Rdata, Ttl, Type};
    use crate::zone::{answer, Zone};

    /// A resolver that answers from an in-memory zone; enough to
    /// exercise the contract.
    #[derive(Clone)]
    struct ZoneBackedResolver {
        zone: Arc<Zone>,
    }

    impl Resolver for ZoneBackedResolver {
        fn send(&self, query: &Message) -> Result<Message, Error> {
            let question = query.question().ok_or(Error::QuestionMismatch)?;
            let mut response = Message::new();
            response.header.set_id(query.header.id);
            response.header.qr = true;
            response.add_question(question.clone());
            answer::add_answer(
                &mut response,
                &question.qname,
                question.qtype.into(),
                self.zone.as_ref(),
                true,
            );
            Ok(response)
        }

        fn set_port(&mut self, _port: u16) {}
        fn set_tcp(&mut self, _flag: bool) {}
        fn set_ignore_truncation(&mut self, _flag: bool) {}
        fn set_edns(
            &mut self,
            _level: Option<u8>,
            _payload_size: u16,
            _flags: u16,
            _options: Vec<EdnsOption>,
        ) {
        }
        fn set_tsig_key(&mut self, _key: TsigKey) {}
        fn set_timeout(&mut self, _timeout: Duration) {}
    }

    struct ChannelListener {
        sender: mpsc::Sender<(usize, Result<Message, Error>)>,
    }

    impl ResolverListener for ChannelListener {
        fn receive_message(&self, id: usize, response: Message) {
            let _ = self.sender.send((id, Ok(response)));
        }

        fn handle_exception(&self, id: usize, error: Error) {
            let _ = self.sender.send((id, Err(error)));
        }
    }

    fn test_zone() -> Arc<Zone> {
        let origin: Name = "example.test.".parse().unwrap();
        let mut zone = Zone::new(origin.clone(), Class::IN);
        zone.add(
            &"www.example.test.".parse().unwrap(),
            Type::A,
            Class::IN,
            Ttl::from(3600),
            &Rdata::new_a("192.0.2.1".parse().unwrap()),
        )
        .unwrap();
        Arc::new(zone)
    }

    #[test]
    fn send_returns_a_matching_response() {
        let resolver = ZoneBackedResolver { zone: test_zone() };
        let query = Message::new_query(Question {
            qname: "www.example.test.".parse().unwrap(),
            qtype: Qtype::from(Type::A),
            qclass: Qclass::from(Class::IN),
        });
        let response = resolver.send(&query).unwrap();
        assert_eq!(response.header.id, query.header.id);
        assert_eq!(response.header.rcode, Rcode::NoError);
        assert_eq!(response.records(Section::Answer).len(), 1);
    }

    #[test]
    fn send_async_delivers_to_the_listener() {
        let resolver = ZoneBackedResolver { zone: test_zone() };
        let (sender, receiver) = mpsc::channel();
        let listener = Arc::new(ChannelListener { sender });
        let query = Message::new_query(Question {
            qname: "www.example.test.".parse().unwrap(),
            qtype: Qtype::from(Type::A),
            qclass: Qclass::from(Class::IN),
        });
        let handle = resolver.send_async(query, listener);
        let (id, outcome) = receiver.recv().unwrap();
        assert_eq!(id, handle.id());
        let response = outcome.unwrap();
        assert_eq!(response.records(Section::Answer).len(), 1);
    }
}
