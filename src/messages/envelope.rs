//! The envelope shared by every tagged Postgres message: a 1 byte message
//! code followed by a big-endian u32 length. The length counts itself and
//! the payload, but not the message code.

use bytes::{BufMut, BytesMut};

use crate::{Error, Result, messages::backend::MessageCode};

/// Position of a reserved length slot inside an output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker(usize);

impl Marker {
    pub fn position(&self) -> usize {
        self.0
    }
}

/// Appends `code` and a zeroed length slot to `buf`.
///
/// The returned [`Marker`] must be handed to [`finish_message`] once the
/// payload has been written.
#[inline]
pub fn begin_message(buf: &mut BytesMut, code: MessageCode) -> Marker {
    buf.put_u8(code.into());
    let marker = Marker(buf.len());
    buf.put_u32(0);
    marker
}

/// Backfills the length slot reserved by [`begin_message`] with the number of
/// bytes written from the slot to the end of `buf`.
#[inline]
pub fn finish_message(buf: &mut BytesMut, marker: Marker) -> Result<()> {
    let base = marker.position();
    let Some(len) = buf
        .len()
        .checked_sub(base)
        .filter(|len| *len >= size_of::<u32>())
    else {
        return Err(Error::InvalidMarker {
            position: base,
            len: buf.len(),
        });
    };
    let len = length_prefix(len)?;
    buf[base..base + size_of::<u32>()].copy_from_slice(&len);
    Ok(())
}

/// Frames the bytes written by `payload_fn` as a message tagged with `code`.
#[inline]
pub fn frame(
    buf: &mut BytesMut,
    code: MessageCode,
    payload_fn: impl FnOnce(&mut BytesMut),
) -> Result<()> {
    let marker = begin_message(buf, code);
    payload_fn(buf);
    finish_message(buf, marker)
}

fn length_prefix(len: usize) -> Result<[u8; 4]> {
    u32::try_from(len)
        .map(u32::to_be_bytes)
        .map_err(|_| Error::MessageTooLarge(len))
}
