use std::io::{self, Write};

use super::LogTransport;

/// Transport writing newline-terminated records to any `io::Write`.
///
/// Each record is flushed immediately so output interleaves predictably
/// with other writers of the same stream.
pub struct WriterTransport<W> {
    writer: W,
}

impl<W> WriterTransport<W>
where
    W: Write + Send,
{
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> LogTransport for WriterTransport<W>
where
    W: Write + Send,
{
    fn write_record(&mut self, record: &[u8]) -> io::Result<()> {
        self.writer.write_all(record)?;
        if !record.ends_with(b"\n") {
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_newline_once() {
        let mut transport = WriterTransport::new(Vec::new());
        transport.write_record(b"one").unwrap();
        transport.write_record(b"two\n").unwrap();
        assert_eq!(transport.into_inner(), b"one\ntwo\n");
    }

    #[test]
    fn surfaces_write_errors() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut transport = WriterTransport::new(Broken);
        let err = transport.write_record(b"lost").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
