//! Logic for handling and representing Postgres backend messages.

use std::io::Read;

use bytes::{BufMut, Bytes, BytesMut};
use futures::{AsyncRead, AsyncReadExt};

use crate::{Result, messages::envelope};

// Postgres won't allocate memory greater 1GiB, so no well-behaved
// server sends a frame anywhere near this size. Anything larger is
// rejected before the body is allocated.
// <https://github.com/postgres/postgres/blob/879c492480d0e9ad8155c4269f95c5e8add41901/src/include/utils/memutils.h#L40>
pub const MAX_FRAME_SIZE_BYTES: usize = 1 << 30; // 1GiB

/// Postgres backend messages are framed by a 1 byte message code,
/// followed by a u32 integer delineating the length of the rest of
/// the message.
///
/// While authenticating, a client only expects an authentication request
/// or an error. Any other byte still round-trips through
/// [`MessageCode::from`].
///
/// For more information, see the official Postgres docs:
/// <https://www.postgresql.org/docs/current/protocol-message-formats.html>
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageCode(u8);

impl MessageCode {
    pub const AUTHENTICATION: Self = Self(b'R');
    pub const ERROR_RESPONSE: Self = Self(b'E');

    /// Appends a message tagged with this code, with `payload_fn` writing
    /// the payload.
    #[inline]
    pub fn frame(
        self,
        buf: &mut BytesMut,
        payload_fn: impl FnOnce(&mut BytesMut),
    ) -> Result<()> {
        envelope::frame(buf, self, payload_fn)
    }
}

impl From<u8> for MessageCode {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<MessageCode> for u8 {
    fn from(value: MessageCode) -> Self {
        value.0
    }
}

impl std::fmt::Display for MessageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match *self {
            MessageCode::AUTHENTICATION => "Authentication",
            MessageCode::ERROR_RESPONSE => "ErrorResponse",
            _ => "Unknown",
        };
        write!(f, "{name}({})", self.0 as char)
    }
}

impl std::fmt::Debug for MessageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MessageCode")
            .field(&(self.0 as char))
            .finish()
    }
}

/// Returns the value of the field tagged `tag` (e.g. `b'M'` for the message,
/// `b'C'` for the SQLSTATE code) in an ErrorResponse body.
pub fn error_field(body: &[u8], tag: u8) -> Option<String> {
    body.split(|b| *b == 0)
        .take_while(|field| !field.is_empty())
        .find_map(|field| field.strip_prefix(&[tag]))
        .map(|value| String::from_utf8_lossy(value).into_owned())
}

/// A single backend message with its envelope stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgFrame {
    pub code: MessageCode,
    pub body: Bytes,
}

impl PgFrame {
    pub fn new(code: impl Into<MessageCode>, body: impl Into<Bytes>) -> Self {
        Self {
            code: code.into(),
            body: body.into(),
        }
    }

    /// Appends the framed message, envelope included, to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        self.code.frame(buf, |b| b.put_slice(&self.body))
    }
}

impl std::fmt::Display for PgFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?}", self.code, self.body)
    }
}

pub fn read_frame_blocking(mut stream: impl Read) -> std::io::Result<PgFrame> {
    let mut buf = [0; 1];
    stream.read_exact(&mut buf)?;
    let code: MessageCode = u8::from_be_bytes(buf).into();

    let mut buf = [0; 4];
    stream.read_exact(&mut buf)?;
    let mut body = init_body(u32::from_be_bytes(buf))?;
    stream.read_exact(&mut body)?;

    Ok(PgFrame::new(code, body))
}

pub async fn read_frame(mut stream: impl AsyncRead + Unpin) -> std::io::Result<PgFrame> {
    let mut buf = [0; 1];
    stream.read_exact(&mut buf).await?;
    let code: MessageCode = u8::from_be_bytes(buf).into();

    let mut buf = [0; 4];
    stream.read_exact(&mut buf).await?;
    let mut body = init_body(u32::from_be_bytes(buf))?;
    stream.read_exact(&mut body).await?;

    Ok(PgFrame::new(code, body))
}

fn init_body(len: u32) -> std::io::Result<BytesMut> {
    let Some(len) = (len as usize).checked_sub(size_of::<u32>()) else {
        let err_msg = format!("frame length {len} is shorter than the length field");
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            err_msg,
        ));
    };
    if len > MAX_FRAME_SIZE_BYTES {
        let err_msg = format!("frame size exceeds {MAX_FRAME_SIZE_BYTES}B");
        return Err(std::io::Error::new(
            std::io::ErrorKind::QuotaExceeded,
            err_msg,
        ));
    }
    Ok(BytesMut::zeroed(len))
}
