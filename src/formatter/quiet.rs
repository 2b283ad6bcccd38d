//! Compact single-line text format.

use std::fmt::Write;

use super::{EventFormatter, clock_time};
use crate::event::CaptureEvent;

/// Formats an event as `time type address protocol size`.
///
/// Events without a message cannot be rendered and report failure.
#[derive(Copy, Clone, Debug, Default)]
pub struct QuietFormatter;

impl EventFormatter for QuietFormatter {
    fn format(&self, event: &CaptureEvent) -> Option<Vec<u8>> {
        let message = event.message.as_ref()?;
        let kind = message.kind?;
        let (sec, nsec, payload) = message.observed();

        let mut line = String::with_capacity(64);
        line.push_str(clock_time(sec, nsec).as_deref().unwrap_or("-"));
        line.push(' ');
        line.push_str(kind.abbreviation());
        line.push(' ');
        match message.query_address.or(message.response_address) {
            Some(addr) => write!(line, "{addr}").ok()?,
            None => line.push('-'),
        }
        line.push(' ');
        line.push_str(message.socket_protocol.map_or("-", |p| p.as_str()));
        line.push(' ');
        write!(line, "{}b", payload.map_or(0, <[u8]>::len)).ok()?;
        Some(line.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Message, MessageType, SocketProtocol};
    use rstest::rstest;

    fn client_query() -> CaptureEvent {
        CaptureEvent {
            message: Some(Message {
                kind: Some(MessageType::ClientQuery),
                socket_protocol: Some(SocketProtocol::Udp),
                query_address: Some("192.0.2.1".parse().unwrap()),
                query_time_sec: Some(0),
                query_time_nsec: Some(1_000),
                query_message: Some(vec![0; 45]),
                ..Message::default()
            }),
            ..CaptureEvent::default()
        }
    }

    #[test]
    fn formats_client_query() {
        let out = QuietFormatter.format(&client_query()).expect("formatted");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "00:00:00.000001 CQ 192.0.2.1 UDP 45b"
        );
    }

    #[test]
    fn missing_fields_render_as_dashes() {
        let event = CaptureEvent {
            message: Some(Message {
                kind: Some(MessageType::AuthResponse),
                ..Message::default()
            }),
            ..CaptureEvent::default()
        };
        let out = QuietFormatter.format(&event).expect("formatted");
        assert_eq!(String::from_utf8(out).unwrap(), "- AR - - 0b");
    }

    #[rstest]
    #[case(CaptureEvent::default())]
    #[case(CaptureEvent { message: Some(Message::default()), ..CaptureEvent::default() })]
    fn events_without_message_type_fail(#[case] event: CaptureEvent) {
        assert!(QuietFormatter.format(&event).is_none());
    }
}
