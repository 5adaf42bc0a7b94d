//! Authentication request messages sent by the backend with the
//! [`MessageCode::AUTHENTICATION`] code.
//!
//! Every authentication message starts with a u32 [`AuthType`] that selects
//! the payload layout. [`AuthMessage`] peeks that discriminant and decodes the
//! matching variant.

use std::io::Read;

use bytes::BytesMut;
use futures::AsyncRead;

use crate::{
    Error, Result,
    messages::backend::{self, MessageCode, PgFrame},
};

mod json;
mod md5;
mod plain;
mod sm3;

pub use json::{from_json, to_json};
pub use md5::AuthenticationMd5Password;
pub use plain::{AuthenticationCleartextPassword, AuthenticationOk};
pub use sm3::AuthenticationSm3Password;

/// Identifies which authentication exchange the backend is requesting.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthType(u32);

impl AuthType {
    pub const OK: Self = Self(0);
    pub const CLEARTEXT_PASSWORD: Self = Self(3);
    pub const MD5_PASSWORD: Self = Self(5);
    pub const SASL: Self = Self(10);
    pub const SASL_CONTINUE: Self = Self(11);
    pub const SM3_PASSWORD: Self = Self(12);
}

impl From<u32> for AuthType {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<AuthType> for u32 {
    fn from(value: AuthType) -> Self {
        value.0
    }
}

impl PartialEq<u32> for AuthType {
    fn eq(&self, other: &u32) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match *self {
            AuthType::OK => "AuthenticationOk",
            AuthType::CLEARTEXT_PASSWORD => "AuthenticationCleartextPassword",
            AuthType::MD5_PASSWORD => "AuthenticationMD5Password",
            AuthType::SASL => "AuthenticationSASL",
            AuthType::SASL_CONTINUE => "AuthenticationSASLContinue",
            AuthType::SM3_PASSWORD => "AuthenticationSM3Password",
            _ => "Unknown",
        };
        write!(f, "{name}({})", self.0)
    }
}

impl std::fmt::Debug for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthType({})", self.0)
    }
}

/// A message sent by the Postgres backend.
pub trait BackendMessage: Sized {
    const CODE: MessageCode;

    /// Decodes a message body. `src` excludes the message code and length.
    fn decode(src: &[u8]) -> Result<Self>;

    /// Appends the message, message code and length included, to `dst`.
    fn encode(&self, dst: &mut BytesMut) -> Result<()>;
}

/// A backend message sent during the authentication phase.
pub trait AuthenticationResponse: BackendMessage {
    const AUTH_TYPE: AuthType;
}

/// Checks that `src` is a `len` byte body for `expected` and returns the
/// bytes following the auth type.
fn decode_header(src: &[u8], len: usize, expected: AuthType) -> Result<&[u8]> {
    if src.len() != len {
        return Err(Error::BadMessageSize {
            expected: len,
            actual: src.len(),
        });
    }
    let (auth_type, rest) = split_auth_type(src)?;
    if auth_type != expected {
        return Err(Error::BadAuthType {
            expected,
            actual: auth_type,
        });
    }
    Ok(rest)
}

fn split_auth_type(src: &[u8]) -> Result<(AuthType, &[u8])> {
    let Some((auth_type, rest)) = src.split_first_chunk::<4>() else {
        return Err(Error::BadMessageSize {
            expected: size_of::<u32>(),
            actual: src.len(),
        });
    };
    Ok((u32::from_be_bytes(*auth_type).into(), rest))
}

/// The authentication requests this crate knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMessage {
    Ok(AuthenticationOk),
    CleartextPassword(AuthenticationCleartextPassword),
    Md5Password(AuthenticationMd5Password),
    Sm3Password(AuthenticationSm3Password),
}

impl AuthMessage {
    /// Decodes an authentication message body, dispatching on its auth type.
    pub fn decode(src: &[u8]) -> Result<Self> {
        let (auth_type, _) = split_auth_type(src)?;
        let msg = match auth_type {
            AuthType::OK => AuthMessage::Ok(AuthenticationOk::decode(src)?),
            AuthType::CLEARTEXT_PASSWORD => {
                AuthMessage::CleartextPassword(AuthenticationCleartextPassword::decode(src)?)
            }
            AuthType::MD5_PASSWORD => {
                AuthMessage::Md5Password(AuthenticationMd5Password::decode(src)?)
            }
            AuthType::SM3_PASSWORD => {
                AuthMessage::Sm3Password(AuthenticationSm3Password::decode(src)?)
            }
            auth_type => return Err(Error::UnsupportedAuthType(auth_type)),
        };
        Ok(msg)
    }

    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        match self {
            AuthMessage::Ok(msg) => msg.encode(dst),
            AuthMessage::CleartextPassword(msg) => msg.encode(dst),
            AuthMessage::Md5Password(msg) => msg.encode(dst),
            AuthMessage::Sm3Password(msg) => msg.encode(dst),
        }
    }

    pub fn auth_type(&self) -> AuthType {
        match self {
            AuthMessage::Ok(_) => AuthenticationOk::AUTH_TYPE,
            AuthMessage::CleartextPassword(_) => AuthenticationCleartextPassword::AUTH_TYPE,
            AuthMessage::Md5Password(_) => AuthenticationMd5Password::AUTH_TYPE,
            AuthMessage::Sm3Password(_) => AuthenticationSm3Password::AUTH_TYPE,
        }
    }
}

impl std::fmt::Display for AuthMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMessage::Ok(_) => write!(f, "AuthenticationOk"),
            AuthMessage::CleartextPassword(_) => write!(f, "AuthenticationCleartextPassword"),
            AuthMessage::Md5Password(_) => write!(f, "AuthenticationMD5Password"),
            AuthMessage::Sm3Password(_) => write!(f, "AuthenticationSM3Password"),
        }
    }
}

impl From<AuthenticationOk> for AuthMessage {
    fn from(value: AuthenticationOk) -> Self {
        AuthMessage::Ok(value)
    }
}

impl From<AuthenticationCleartextPassword> for AuthMessage {
    fn from(value: AuthenticationCleartextPassword) -> Self {
        AuthMessage::CleartextPassword(value)
    }
}

impl From<AuthenticationMd5Password> for AuthMessage {
    fn from(value: AuthenticationMd5Password) -> Self {
        AuthMessage::Md5Password(value)
    }
}

impl From<AuthenticationSm3Password> for AuthMessage {
    fn from(value: AuthenticationSm3Password) -> Self {
        AuthMessage::Sm3Password(value)
    }
}

impl TryFrom<PgFrame> for AuthMessage {
    type Error = Error;

    fn try_from(frame: PgFrame) -> Result<Self> {
        match frame.code {
            MessageCode::AUTHENTICATION => AuthMessage::decode(&frame.body),
            MessageCode::ERROR_RESPONSE => Err(Error::Server {
                code: backend::error_field(&frame.body, b'C')
                    .unwrap_or_else(|| "?????".to_string()),
                message: backend::error_field(&frame.body, b'M')
                    .unwrap_or_else(|| "<no message>".to_string()),
            }),
            code => Err(Error::UnexpectedMessageCode(code)),
        }
    }
}

/// Reads the next frame from `stream` and decodes it as an authentication
/// request.
pub fn read_auth_message_blocking(stream: impl Read) -> Result<AuthMessage> {
    let frame = backend::read_frame_blocking(stream)?;
    into_auth_message(frame)
}

/// Reads the next frame from `stream` and decodes it as an authentication
/// request.
pub async fn read_auth_message(stream: impl AsyncRead + Unpin) -> Result<AuthMessage> {
    let frame = backend::read_frame(stream).await?;
    into_auth_message(frame)
}

fn into_auth_message(frame: PgFrame) -> Result<AuthMessage> {
    tracing::trace!(code = %frame.code, len = frame.body.len(), "received backend frame");
    let msg = AuthMessage::try_from(frame)?;
    tracing::debug!(auth_type = %msg.auth_type(), "received authentication request");
    Ok(msg)
}
