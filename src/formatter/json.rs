//! JSON rendering of capture events.
//!
//! Raw DNS payloads and the `extra` field are emitted as base64 strings so
//! the output stays valid UTF-8.

use std::net::IpAddr;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Serialize;

use super::EventFormatter;
use crate::event::{CaptureEvent, Message, MessageType, SocketFamily, SocketProtocol};

/// Formats each event as a single-line JSON object.
#[derive(Copy, Clone, Debug, Default)]
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonEvent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    identity: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<JsonMessage<'a>>,
}

#[derive(Serialize)]
struct JsonMessage<'a> {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<MessageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    socket_family: Option<SocketFamily>,
    #[serde(skip_serializing_if = "Option::is_none")]
    socket_protocol: Option<SocketProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_address: Option<&'a IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_address: Option<&'a IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_message: Option<String>,
}

fn rfc3339(sec: Option<u64>, nsec: Option<u32>) -> Option<String> {
    let secs = i64::try_from(sec?).ok()?;
    chrono::DateTime::from_timestamp(secs, nsec.unwrap_or(0))
        .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true))
}

impl<'a> From<&'a Message> for JsonMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            kind: message.kind,
            socket_family: message.socket_family,
            socket_protocol: message.socket_protocol,
            query_address: message.query_address.as_ref(),
            response_address: message.response_address.as_ref(),
            query_port: message.query_port,
            response_port: message.response_port,
            query_time: rfc3339(message.query_time_sec, message.query_time_nsec),
            response_time: rfc3339(message.response_time_sec, message.response_time_nsec),
            query_message: message.query_message.as_ref().map(|m| STANDARD.encode(m)),
            response_message: message.response_message.as_ref().map(|m| STANDARD.encode(m)),
        }
    }
}

impl EventFormatter for JsonFormatter {
    fn format(&self, event: &CaptureEvent) -> Option<Vec<u8>> {
        let view = JsonEvent {
            identity: event.identity.as_deref(),
            version: event.version.as_deref(),
            extra: event.extra.as_ref().map(|e| STANDARD.encode(e)),
            message: event.message.as_ref().map(JsonMessage::from),
        };
        match serde_json::to_vec(&view) {
            Ok(buf) => Some(buf),
            Err(err) => {
                log::warn!("JsonFormatter: serialisation failed: {err}");
                None
            }
        }
    }
}
