//! Authentication messages that carry nothing but their auth type.

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{AuthType, AuthenticationResponse, BackendMessage, decode_header, json};
use crate::{Result, messages::backend::MessageCode};

const BODY_LEN: usize = 4;

/// Sent by the backend once authentication has succeeded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthenticationOk;

/// Sent by the backend when the client must answer with a cleartext
/// password.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthenticationCleartextPassword;

impl BackendMessage for AuthenticationOk {
    const CODE: MessageCode = MessageCode::AUTHENTICATION;

    fn decode(src: &[u8]) -> Result<Self> {
        decode_header(src, BODY_LEN, Self::AUTH_TYPE)?;
        Ok(Self)
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        Self::CODE.frame(dst, |b| b.put_u32(Self::AUTH_TYPE.into()))
    }
}

impl AuthenticationResponse for AuthenticationOk {
    const AUTH_TYPE: AuthType = AuthType::OK;
}

impl Serialize for AuthenticationOk {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        json::serialize_type_only("AuthenticationOk", s)
    }
}

impl<'de> Deserialize<'de> for AuthenticationOk {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        json::deserialize_type_only(d).map(|()| Self)
    }
}

impl BackendMessage for AuthenticationCleartextPassword {
    const CODE: MessageCode = MessageCode::AUTHENTICATION;

    fn decode(src: &[u8]) -> Result<Self> {
        decode_header(src, BODY_LEN, Self::AUTH_TYPE)?;
        Ok(Self)
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        Self::CODE.frame(dst, |b| b.put_u32(Self::AUTH_TYPE.into()))
    }
}

impl AuthenticationResponse for AuthenticationCleartextPassword {
    const AUTH_TYPE: AuthType = AuthType::CLEARTEXT_PASSWORD;
}

impl Serialize for AuthenticationCleartextPassword {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        json::serialize_type_only("AuthenticationCleartextPassword", s)
    }
}

impl<'de> Deserialize<'de> for AuthenticationCleartextPassword {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        json::deserialize_type_only(d).map(|()| Self)
    }
}

#[cfg(test)]
mod tests {
    use bytes::{BufMut, BytesMut};

    use super::{AuthenticationCleartextPassword, AuthenticationOk};
    use crate::{Error, messages::auth::BackendMessage};

    #[test]
    fn test_ok_encode() {
        let mut buf = BytesMut::new();
        AuthenticationOk.encode(&mut buf).unwrap();

        let mut expected = BytesMut::new();
        expected.put_u8(b'R');
        expected.put_u32(8);
        expected.put_u32(0);

        assert_eq!(&buf, &expected);
        assert_eq!(AuthenticationOk::decode(&buf[5..]).unwrap(), AuthenticationOk);
    }

    #[test]
    fn test_cleartext_encode() {
        let mut buf = BytesMut::new();
        AuthenticationCleartextPassword.encode(&mut buf).unwrap();

        assert_eq!(buf.as_ref(), &[b'R', 0, 0, 0, 8, 0, 0, 0, 3]);
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let err = AuthenticationOk::decode(&[0, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            Error::BadMessageSize {
                expected: 4,
                actual: 5
            }
        ));
    }

    #[test]
    fn test_decode_wrong_auth_type() {
        let err = AuthenticationCleartextPassword::decode(&[0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, Error::BadAuthType { .. }));
    }

    #[test]
    fn test_json() {
        assert_eq!(
            serde_json::to_string(&AuthenticationOk).unwrap(),
            r#"{"Type":"AuthenticationOk"}"#
        );
        assert_eq!(
            serde_json::to_string(&AuthenticationCleartextPassword).unwrap(),
            r#"{"Type":"AuthenticationCleartextPassword"}"#
        );
        assert_eq!(
            serde_json::from_str::<AuthenticationOk>("null").unwrap(),
            AuthenticationOk
        );
        assert!(serde_json::from_str::<AuthenticationCleartextPassword>("42").is_err());
    }
}
