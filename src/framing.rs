//! Newline-delimited framing shared by the server and the client.
//!
//! [`LineReader`] drives a length-capped [`LinesCodec`] by hand so that a bad
//! line (invalid UTF-8, or longer than [`MAX_LINE_LENGTH`]) is reported as a
//! [`Frame::Malformed`] and the stream keeps going from the next newline.

use bytes::BytesMut;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

/// Longest accepted line, excluding the newline.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    Line(String),
    Malformed(String),
}

pub struct LineReader<R> {
    reader: R,
    codec: LinesCodec,
    buf: BytesMut,
    eof: bool,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_max_length(reader, MAX_LINE_LENGTH)
    }

    pub fn with_max_length(reader: R, max_length: usize) -> Self {
        Self {
            reader,
            codec: LinesCodec::new_with_max_length(max_length),
            buf: BytesMut::new(),
            eof: false,
        }
    }

    /// Next frame, or `None` once the peer has closed and the buffer is
    /// drained. An unterminated last line is still returned.
    pub async fn next_frame(&mut self) -> io::Result<Option<Frame>> {
        loop {
            let decoded = if self.eof {
                self.codec.decode_eof(&mut self.buf)
            } else {
                self.codec.decode(&mut self.buf)
            };
            match decoded {
                Ok(Some(line)) => return Ok(Some(Frame::Line(line))),
                Ok(None) if self.eof => return Ok(None),
                Ok(None) => {}
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    let max = self.codec.max_length();
                    return Ok(Some(Frame::Malformed(format!("line exceeds {max} bytes"))));
                }
                Err(LinesCodecError::Io(err)) if err.kind() == io::ErrorKind::InvalidData => {
                    return Ok(Some(Frame::Malformed("line is not valid UTF-8".to_owned())));
                }
                Err(LinesCodecError::Io(err)) => return Err(err),
            }

            if self.reader.read_buf(&mut self.buf).await? == 0 {
                self.eof = true;
            }
        }
    }
}
