use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{AuthType, AuthenticationResponse, BackendMessage, decode_header, json};
use crate::{Result, messages::backend::MessageCode};

/// Sent by the backend when the client must answer with an MD5 hashed
/// password using the provided salt.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthenticationMd5Password {
    pub salt: [u8; 4],
}

impl AuthenticationMd5Password {
    const BODY_LEN: usize = 8;
    const JSON_TYPE: &'static str = "AuthenticationMD5Password";

    pub fn new(salt: [u8; 4]) -> Self {
        Self { salt }
    }
}

impl BackendMessage for AuthenticationMd5Password {
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

impl AuthenticationResponse for AuthenticationMd5Password {
    const AUTH_TYPE: AuthType = AuthType::MD5_PASSWORD;
}

impl Serialize for AuthenticationMd5Password {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        json::serialize_salted(Self::JSON_TYPE, self.salt, s)
    }
}

impl<'de> Deserialize<'de> for AuthenticationMd5Password {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        json::deserialize_salted(d).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use bytes::{BufMut, BytesMut};

    use super::AuthenticationMd5Password;
    use crate::{
        Error,
        messages::auth::{AuthType, BackendMessage},
    };

    #[test]
    fn test_encode() {
        let mut buf = BytesMut::new();
        AuthenticationMd5Password::new([0xDE, 0xAD, 0xBE, 0xEF])
            .encode(&mut buf)
            .unwrap();

        let mut expected = BytesMut::new();
        expected.put_u8(b'R');
        expected.put_u32(12);
        expected.put_u32(5);
        expected.put_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

        assert_eq!(&buf, &expected);
        assert_eq!(
            AuthenticationMd5Password::decode(&buf[5..]).unwrap().salt,
            [0xDE, 0xAD, 0xBE, 0xEF]
        );
    }

    #[test]
    fn test_decode_rejects_sm3() {
        let err = AuthenticationMd5Password::decode(&[0, 0, 0, 12, 1, 2, 3, 4]).unwrap_err();
        assert!(matches!(
            err,
            Error::BadAuthType { expected, actual }
                if expected == AuthType::MD5_PASSWORD && actual == AuthType::SM3_PASSWORD
        ));
    }

    #[test]
    fn test_json() {
        let msg = AuthenticationMd5Password::new([7, 7, 7, 7]);
        let json = serde_json::to_string(&msg).unwrap();

        assert_eq!(json, r#"{"Type":"AuthenticationMD5Password","Salt":[7,7,7,7]}"#);
        assert_eq!(
            serde_json::from_str::<AuthenticationMd5Password>(&json).unwrap(),
            msg
        );
        assert_eq!(
            serde_json::from_str::<AuthenticationMd5Password>("null").unwrap(),
            AuthenticationMd5Password::default()
        );
    }
}
