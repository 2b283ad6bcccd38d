//! Frame codec.
//!
//! A frame is one serialised [`CaptureEvent`]: a MessagePack map produced by
//! the upstream pipeline. On byte streams frames are prefixed with their
//! length as a big-endian `u32`.

use std::io::{self, Read, Write};

use rmp_serde::Serializer;
use serde::Serialize;

use crate::{error::OutputError, event::CaptureEvent};

/// One opaque serialised event. Ownership moves into the queue on push.
pub type Frame = Vec<u8>;

/// Largest payload accepted on a length-prefixed stream.
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Decode a frame into a structured event.
pub fn decode_frame(frame: &[u8]) -> Result<CaptureEvent, OutputError> {
    rmp_serde::from_slice(frame).map_err(OutputError::from)
}

/// Serialise an event into a frame.
pub fn encode_event(event: &CaptureEvent) -> io::Result<Frame> {
    let mut buf = Vec::with_capacity(128);
    event
        .serialize(&mut Serializer::new(&mut buf).with_struct_map())
        .map_err(io::Error::other)?;
    Ok(buf)
}

/// Write `frame` with its big-endian length prefix.
pub fn write_frame<W: Write>(writer: &mut W, frame: &[u8]) -> io::Result<()> {
    if frame.len() > MAX_FRAME_SIZE {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "frame too large"));
    }
    let len = u32::try_from(frame.len()).map_err(io::Error::other)?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(frame)
}

/// Read the next length-prefixed frame.
///
/// Returns `Ok(None)` when the stream ends cleanly between frames. A stream
/// that ends inside a frame is an `UnexpectedEof` error.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Option<Frame>> {
    let mut prefix = [0u8; 4];
    let mut filled = 0;
    while filled < prefix.len() {
        match reader.read(&mut prefix[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stream ended inside a frame length",
                ));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    let len = u32::from_be_bytes(prefix) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {len} bytes exceeds {MAX_FRAME_SIZE}"),
        ));
    }
    let mut frame = vec![0u8; len];
    reader.read_exact(&mut frame)?;
    Ok(Some(frame))
}
