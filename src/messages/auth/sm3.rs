use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{AuthType, AuthenticationResponse, BackendMessage, decode_header, json};
use crate::{Result, messages::backend::MessageCode};

/// Sent by the backend when the client must answer with a password hashed
/// with SM3 and the provided salt.
///
/// ```text
/// byte 0      'R'
/// bytes 1-4   u32 length (12)
/// bytes 5-8   u32 auth type (12)
/// bytes 9-12  salt
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthenticationSm3Password {
    pub salt: [u8; 4],
}

impl AuthenticationSm3Password {
    const BODY_LEN: usize = 8;
    const JSON_TYPE: &'static str = "AuthenticationSM3Password";

    pub fn new(salt: [u8; 4]) -> Self {
        Self { salt }
    }
}

impl BackendMessage for AuthenticationSm3Password {
    const CODE: MessageCode = MessageCode::AUTHENTICATION;

    fn decode(src: &[u8]) -> Result<Self> {
        let rest = decode_header(src, Self::BODY_LEN, Self::AUTH_TYPE)?;
        let mut salt = [0; 4];
        salt.copy_from_slice(rest);
        Ok(Self { salt })
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        Self::CODE.frame(dst, |b| {
            b.put_u32(Self::AUTH_TYPE.into());
            b.put_slice(&self.salt);
        })
    }
}

impl AuthenticationResponse for AuthenticationSm3Password {
    const AUTH_TYPE: AuthType = AuthType::SM3_PASSWORD;
}

impl Serialize for AuthenticationSm3Password {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        json::serialize_salted(Self::JSON_TYPE, self.salt, s)
    }
}

impl<'de> Deserialize<'de> for AuthenticationSm3Password {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        json::deserialize_salted(d).map(Self::new)
    }
}
