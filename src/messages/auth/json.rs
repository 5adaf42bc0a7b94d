//! Debug JSON representations of authentication messages.
//!
//! These mirror the field names used by other Postgres protocol tooling
//! (`{"Type": ..., "Salt": [...]}`) and are never sent over the wire.
//!
//! Input is read leniently. Keys match regardless of case, unknown keys are
//! skipped, and `Type` must be a string (or `null`) but is otherwise not
//! checked. A `Salt` array shorter than 4 bytes is zero-padded and a longer
//! one is truncated. `null`, for the message or for `Salt`, yields zeros.

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{DeserializeOwned, IgnoredAny, MapAccess, SeqAccess, Visitor},
};

use super::AuthenticationResponse;
use crate::Result;

/// Renders an authentication message as debug JSON.
pub fn to_json<T: AuthenticationResponse + Serialize>(msg: &T) -> Result<String> {
    Ok(serde_json::to_string(msg)?)
}

/// Parses an authentication message from its debug JSON.
pub fn from_json<T: AuthenticationResponse + DeserializeOwned>(src: &str) -> Result<T> {
    Ok(serde_json::from_str(src)?)
}

#[derive(Serialize)]
struct TypeOnly<'a> {
    #[serde(rename = "Type")]
    r#type: &'a str,
}

#[derive(Serialize)]
struct Salted<'a> {
    #[serde(rename = "Type")]
    r#type: &'a str,
    #[serde(rename = "Salt")]
    salt: [u8; 4],
}

pub(super) fn serialize_type_only<S: Serializer>(
    type_name: &str,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    TypeOnly { r#type: type_name }.serialize(s)
}

pub(super) fn serialize_salted<S: Serializer>(
    type_name: &str,
    salt: [u8; 4],
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    Salted {
        r#type: type_name,
        salt,
    }
    .serialize(s)
}

/// Accepts `null` or an object, ignoring everything but the shape of `Type`.
pub(super) fn deserialize_type_only<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<(), D::Error> {
    d.deserialize_option(MessageVisitor { salted: false })
        .map(|_| ())
}

/// Returns the salt of a salted message, or a zeroed salt for `null`.
pub(super) fn deserialize_salted<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<[u8; 4], D::Error> {
    d.deserialize_option(MessageVisitor { salted: true })
}

struct MessageVisitor {
    salted: bool,
}

impl<'de> Visitor<'de> for MessageVisitor {
    type Value = [u8; 4];

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "an authentication message object or null")
    }

    fn visit_none<E: serde::de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok([0; 4])
    }

    fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok([0; 4])
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Self::Value, D::Error> {
        d.deserialize_map(self)
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
    ) -> std::result::Result<Self::Value, A::Error> {
        let mut salt = [0; 4];
        while let Some(key) = map.next_key::<String>()? {
            if self.salted && key.eq_ignore_ascii_case("Salt") {
                salt = map.next_value::<Salt>()?.0;
            } else if key.eq_ignore_ascii_case("Type") {
                map.next_value::<Option<String>>()?;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(salt)
    }
}

/// A salt read from a JSON array of byte values.
struct Salt([u8; 4]);

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        d.deserialize_option(SaltVisitor).map(Salt)
    }
}

struct SaltVisitor;

impl<'de> Visitor<'de> for SaltVisitor {
    type Value = [u8; 4];

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "an array of byte values or null")
    }

    fn visit_none<E: serde::de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok([0; 4])
    }

    fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok([0; 4])
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Self::Value, D::Error> {
        d.deserialize_seq(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(
        self,
        mut seq: A,
    ) -> std::result::Result<Self::Value, A::Error> {
        let mut salt = [0; 4];
        for byte in salt.iter_mut() {
            match seq.next_element::<Option<u8>>()? {
                Some(Some(b)) => *byte = b,
                Some(None) => {}
                None => return Ok(salt),
            }
        }
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(salt)
    }
}

#[cfg(test)]
mod tests {
    use super::{from_json, to_json};
    use crate::{
        Error,
        messages::auth::{AuthenticationMd5Password, AuthenticationOk, AuthenticationSm3Password},
    };

    #[test]
    fn test_short_salt_is_padded() {
        let msg: AuthenticationSm3Password = from_json(r#"{"Salt":[1,2]}"#).unwrap();
        assert_eq!(msg.salt, [1, 2, 0, 0]);

        let msg: AuthenticationSm3Password = from_json(r#"{"Salt":[]}"#).unwrap();
        assert_eq!(msg.salt, [0; 4]);
    }

    #[test]
    fn test_long_salt_is_truncated() {
        let msg: AuthenticationSm3Password = from_json(r#"{"Salt":[1,2,3,4,5,[6]]}"#).unwrap();
        assert_eq!(msg.salt, [1, 2, 3, 4]);
    }

    #[test]
    fn test_null_salt_values() {
        let msg: AuthenticationSm3Password = from_json(r#"{"Salt":null}"#).unwrap();
        assert_eq!(msg.salt, [0; 4]);

        let msg: AuthenticationSm3Password = from_json(r#"{"Salt":[7,null,9]}"#).unwrap();
        assert_eq!(msg.salt, [7, 0, 9, 0]);
    }

    #[test]
    fn test_keys_ignore_case() {
        let msg: AuthenticationSm3Password = from_json(r#"{"salt":[1,2,3,4]}"#).unwrap();
        assert_eq!(msg.salt, [1, 2, 3, 4]);

        let msg: AuthenticationMd5Password =
            from_json(r#"{"TYPE":"AuthenticationMD5Password","sAlT":[5,6,7,8]}"#).unwrap();
        assert_eq!(msg.salt, [5, 6, 7, 8]);
    }

    #[test]
    fn test_last_salt_wins() {
        let msg: AuthenticationSm3Password =
            from_json(r#"{"Salt":[1,1,1,1],"salt":[2,2,2,2]}"#).unwrap();
        assert_eq!(msg.salt, [2; 4]);
    }

    #[test]
    fn test_unknown_keys_skipped() {
        let msg: AuthenticationSm3Password =
            from_json(r#"{"Extra":{"nested":[1]},"Salt":[1,2,3,4]}"#).unwrap();
        assert_eq!(msg.salt, [1, 2, 3, 4]);

        let msg: AuthenticationOk = from_json(r#"{"Type":"AuthenticationOk","Salt":"x"}"#).unwrap();
        assert_eq!(msg, AuthenticationOk);
    }

    #[test]
    fn test_invalid_shapes() {
        for src in [
            r#"{"Salt":"abcd"}"#,
            r#"{"Salt":[256]}"#,
            r#"{"Salt":[-1]}"#,
            r#"{"Type":7,"Salt":[1,2,3,4]}"#,
            r#"[1,2,3,4]"#,
            "{",
        ] {
            let err = from_json::<AuthenticationSm3Password>(src).unwrap_err();
            assert!(matches!(err, Error::Json(_)), "{src}: {err}");
        }
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&AuthenticationSm3Password::new([1, 2, 3, 4])).unwrap();
        assert_eq!(json, r#"{"Type":"AuthenticationSM3Password","Salt":[1,2,3,4]}"#);
        assert_eq!(
            from_json::<AuthenticationSm3Password>(&json).unwrap().salt,
            [1, 2, 3, 4]
        );
    }
}
