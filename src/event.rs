//! Structured capture events carried inside frames.
//!
//! A frame decodes into a [`CaptureEvent`]: sender identity and version plus
//! an optional [`Message`] describing one observed DNS exchange. All fields
//! other than the message type are optional because producers populate only
//! what they observed.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Role of the observed message within a DNS exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    AuthQuery,
    AuthResponse,
    ResolverQuery,
    ResolverResponse,
    ClientQuery,
    ClientResponse,
    ForwarderQuery,
    ForwarderResponse,
    StubQuery,
    StubResponse,
    ToolQuery,
    ToolResponse,
    UpdateQuery,
    UpdateResponse,
}

impl MessageType {
    /// Two-letter abbreviation used by the quiet text format.
    pub fn abbreviation(self) -> &'static str {
        match self {
            MessageType::AuthQuery => "AQ",
            MessageType::AuthResponse => "AR",
            MessageType::ResolverQuery => "RQ",
            MessageType::ResolverResponse => "RR",
            MessageType::ClientQuery => "CQ",
            MessageType::ClientResponse => "CR",
            MessageType::ForwarderQuery => "FQ",
            MessageType::ForwarderResponse => "FR",
            MessageType::StubQuery => "SQ",
            MessageType::StubResponse => "SR",
            MessageType::ToolQuery => "TQ",
            MessageType::ToolResponse => "TR",
            MessageType::UpdateQuery => "UQ",
            MessageType::UpdateResponse => "UR",
        }
    }

    /// Whether the message travels from the initiator to the responder.
    pub fn is_query(self) -> bool {
        matches!(
            self,
            MessageType::AuthQuery
                | MessageType::ResolverQuery
                | MessageType::ClientQuery
                | MessageType::ForwarderQuery
                | MessageType::StubQuery
                | MessageType::ToolQuery
                | MessageType::UpdateQuery
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SocketFamily {
    Inet,
    Inet6,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SocketProtocol {
    Udp,
    Tcp,
    Dot,
    Doh,
}

impl SocketProtocol {
    pub fn as_str(self) -> &'static str {
        match self {
            SocketProtocol::Udp => "UDP",
            SocketProtocol::Tcp => "TCP",
            SocketProtocol::Dot => "DOT",
            SocketProtocol::Doh => "DOH",
        }
    }
}

/// One observed DNS message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: Option<MessageType>,
    #[serde(default)]
    pub socket_family: Option<SocketFamily>,
    #[serde(default)]
    pub socket_protocol: Option<SocketProtocol>,
    #[serde(default)]
    pub query_address: Option<IpAddr>,
    #[serde(default)]
    pub response_address: Option<IpAddr>,
    #[serde(default)]
    pub query_port: Option<u16>,
    #[serde(default)]
    pub response_port: Option<u16>,
    #[serde(default)]
    pub query_time_sec: Option<u64>,
    #[serde(default)]
    pub query_time_nsec: Option<u32>,
    #[serde(default)]
    pub response_time_sec: Option<u64>,
    #[serde(default)]
    pub response_time_nsec: Option<u32>,
    #[serde(default)]
    pub query_message: Option<Vec<u8>>,
    #[serde(default)]
    pub response_message: Option<Vec<u8>>,
}

impl Message {
    /// Timestamp and payload of the side of the exchange this message records.
    pub fn observed(&self) -> (Option<u64>, Option<u32>, Option<&[u8]>) {
        match self.kind {
            Some(kind) if !kind.is_query() => (
                self.response_time_sec,
                self.response_time_nsec,
                self.response_message.as_deref(),
            ),
            _ => (
                self.query_time_sec,
                self.query_time_nsec,
                self.query_message.as_deref(),
            ),
        }
    }
}

/// A decoded frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureEvent {
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub extra: Option<Vec<u8>>,
    #[serde(default)]
    pub message: Option<Message>,
}
