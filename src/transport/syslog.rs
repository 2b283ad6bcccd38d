//! Local syslog transport over a Unix socket.
//!
//! Records are framed in the traditional local format,
//! `<PRI>Mmm dd hh:mm:ss TAG[PID]: MSG`, with a trailing newline appended
//! when the message lacks one. Every candidate path is tried as a datagram
//! socket first, then every path again as a stream socket.

use std::{
    io::{self, Write},
    os::unix::net::{UnixDatagram, UnixStream},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use log::warn;

use super::{LogTransport, TransportOpener};
use crate::config::SyslogConfig;

/// Connected syslog handle.
pub struct SyslogTransport {
    socket: Connection,
    config: SyslogConfig,
    pid: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SocketKind {
    Datagram,
    Stream,
}

enum Connection {
    Datagram(UnixDatagram),
    Stream(UnixStream),
}

impl Connection {
    fn kind(&self) -> SocketKind {
        match self {
            Connection::Datagram(_) => SocketKind::Datagram,
            Connection::Stream(_) => SocketKind::Stream,
        }
    }

    fn send(&mut self, datagram: &[u8]) -> io::Result<()> {
        match self {
            Connection::Datagram(socket) => socket.send(datagram).map(drop),
            Connection::Stream(stream) => stream.write_all(datagram),
        }
    }
}

fn connect_socket(kind: SocketKind, path: &Path) -> io::Result<Connection> {
    match kind {
        SocketKind::Datagram => {
            let socket = UnixDatagram::unbound()?;
            socket.connect(path)?;
            Ok(Connection::Datagram(socket))
        }
        SocketKind::Stream => UnixStream::connect(path).map(Connection::Stream),
    }
}

fn dial(paths: &[PathBuf]) -> io::Result<Connection> {
    let mut last_err = None;
    for kind in [SocketKind::Datagram, SocketKind::Stream] {
        for path in paths {
            match connect_socket(kind, path) {
                Ok(socket) => return Ok(socket),
                Err(err) => {
                    last_err = Some(io::Error::new(
                        err.kind(),
                        format!("{}: {err}", path.display()),
                    ));
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "no syslog socket configured")
    }))
}

impl SyslogTransport {
    /// Connect to the first reachable socket listed in `config`.
    pub fn connect(config: &SyslogConfig) -> io::Result<Self> {
        let socket = dial(&config.sockets)?;
        Ok(Self {
            socket,
            config: config.clone(),
            pid: std::process::id(),
        })
    }

    pub(crate) fn render(&self, record: &[u8], now: DateTime<Local>) -> Vec<u8> {
        let header = format!(
            "<{}>{} {}[{}]: ",
            self.config.priority(),
            now.format("%b %e %H:%M:%S"),
            self.config.tag,
            self.pid
        );
        let mut datagram = Vec::with_capacity(header.len() + record.len() + 1);
        datagram.extend_from_slice(header.as_bytes());
        datagram.extend_from_slice(record);
        if !record.ends_with(b"\n") {
            datagram.push(b'\n');
        }
        datagram
    }
}

impl LogTransport for SyslogTransport {
    fn write_record(&mut self, record: &[u8]) -> io::Result<()> {
        let datagram = self.render(record, Local::now());
        if let Err(err) = self.socket.send(&datagram) {
            warn!("SyslogTransport: send failed, reconnecting: {err}");
            self.socket = dial(&self.config.sockets)?;
            self.socket.send(&datagram)?;
        }
        Ok(())
    }
}

/// Opens [`SyslogTransport`] handles for a fixed destination.
#[derive(Clone, Debug, Default)]
pub struct SyslogOpener {
    config: SyslogConfig,
}

impl SyslogOpener {
    pub fn new(config: SyslogConfig) -> Self {
        Self { config }
    }
}

impl TransportOpener for SyslogOpener {
    fn open(&self) -> io::Result<Box<dyn LogTransport>> {
        Ok(Box::new(SyslogTransport::connect(&self.config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use std::io::Read;
    use std::os::unix::net::UnixListener;
    use std::time::Duration;
    use tempfile::tempdir;

    fn config_for(paths: Vec<PathBuf>) -> SyslogConfig {
        SyslogConfig {
            sockets: paths,
            ..SyslogConfig::default()
        }
    }

    fn recv_string(server: &UnixDatagram) -> String {
        server
            .set_read_timeout(Some(Duration::from_secs(1)))
            .expect("read timeout");
        let mut buf = [0u8; 2048];
        let n = server.recv(&mut buf).expect("datagram");
        String::from_utf8(buf[..n].to_vec()).expect("utf-8")
    }

    #[test]
    fn render_uses_local_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log");
        let _server = UnixDatagram::bind(&path).unwrap();
        let transport = SyslogTransport::connect(&config_for(vec![path])).unwrap();
        let now = Local.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();

        let rendered = String::from_utf8(transport.render(b"hello", now)).unwrap();
        assert_eq!(
            rendered,
            format!("<13>Mar  5 07:08:09 dnstap[{}]: hello\n", std::process::id())
        );
        let kept = transport.render(b"line\n", now);
        assert!(kept.ends_with(b"]: line\n"));
    }

    #[test]
    fn connect_falls_back_to_later_sockets() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let path = dir.path().join("log");
        let server = UnixDatagram::bind(&path).unwrap();

        let mut transport = SyslogOpener::new(config_for(vec![missing, path]))
            .open()
            .expect("second socket reachable");
        transport.write_record(b"query seen").unwrap();

        let received = recv_string(&server);
        assert!(received.starts_with("<13>"));
        assert!(received.contains(" dnstap["));
        assert!(received.ends_with("]: query seen\n"));
    }

    #[test]
    fn connect_reports_last_failure() {
        let dir = tempdir().unwrap();
        let err = SyslogTransport::connect(&config_for(vec![dir.path().join("absent")]))
            .err()
            .expect("no socket to connect to");
        assert!(err.to_string().contains("absent"));
        assert!(SyslogTransport::connect(&config_for(Vec::new())).is_err());
    }

    #[test]
    fn connect_prefers_datagram_sockets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log");
        let _server = UnixDatagram::bind(&path).unwrap();
        let transport = SyslogTransport::connect(&config_for(vec![path])).unwrap();
        assert_eq!(transport.socket.kind(), SocketKind::Datagram);
    }

    #[test]
    fn connect_falls_back_to_stream_sockets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log");
        let listener = UnixListener::bind(&path).unwrap();

        let mut transport = SyslogTransport::connect(&config_for(vec![path])).unwrap();
        assert_eq!(transport.socket.kind(), SocketKind::Stream);
        transport.write_record(b"over a stream").unwrap();
        drop(transport);

        let (mut conn, _) = listener.accept().unwrap();
        let mut received = String::new();
        conn.read_to_string(&mut received).unwrap();
        assert!(received.starts_with("<13>"));
        assert!(received.ends_with("]: over a stream\n"));
    }

    #[test]
    fn write_reconnects_after_daemon_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log");
        let server = UnixDatagram::bind(&path).unwrap();
        let mut transport = SyslogTransport::connect(&config_for(vec![path.clone()])).unwrap();

        drop(server);
        fs::remove_file(&path).unwrap();
        let restarted = UnixDatagram::bind(&path).unwrap();

        transport.write_record(b"after restart").expect("retry succeeds");
        assert!(recv_string(&restarted).ends_with("]: after restart\n"));
    }
}
