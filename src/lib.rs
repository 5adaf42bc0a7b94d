//! Encoding and decoding of Postgres backend authentication requests,
//! including the SM3 password challenge.
//!
//! Every message is framed by a 1 byte message code and a big-endian u32
//! length covering itself and the payload. [`AuthMessage`] decodes any
//! supported authentication request by its [`AuthType`]; the individual
//! message types implement [`BackendMessage`] for direct encoding and
//! decoding, and `serde` for a JSON debug representation.
//!
//! ```
//! use bytes::BytesMut;
//! use pg_auth_proto::{AuthenticationSm3Password, BackendMessage};
//!
//! let mut buf = BytesMut::new();
//! AuthenticationSm3Password::new([1, 2, 3, 4]).encode(&mut buf)?;
//! assert_eq!(&buf[..], b"R\0\0\0\x0c\0\0\0\x0c\x01\x02\x03\x04");
//!
//! let msg = AuthenticationSm3Password::decode(&buf[5..])?;
//! assert_eq!(msg.salt, [1, 2, 3, 4]);
//! # Ok::<(), pg_auth_proto::Error>(())
//! ```

mod error;
pub mod messages;

pub use error::{Error, Result};
pub use messages::{
    auth::{
        AuthMessage, AuthType, AuthenticationCleartextPassword, AuthenticationMd5Password,
        AuthenticationOk, AuthenticationResponse, AuthenticationSm3Password, BackendMessage,
        from_json, read_auth_message, read_auth_message_blocking, to_json,
    },
    backend::{self, MessageCode, PgFrame},
    envelope::{Marker, begin_message, finish_message},
};
