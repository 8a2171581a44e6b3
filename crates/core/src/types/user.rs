//! Authenticated user as returned by the storefront API.

use serde::{Deserialize, Deserializer, Serialize};

use crate::UserId;

/// A storefront user.
///
/// The session store replaces this value wholesale on every update; there is
/// no field-level merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier (`_id` on the wire).
    #[serde(rename = "_id", default)]
    pub id: UserId,
    /// Email address. May be empty for a provisional user.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Avatar image URL.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub avatar: String,
}

impl User {
    /// Whether this record still lacks a server identifier.
    #[must_use]
    pub fn is_provisional(&self) -> bool {
        self.id.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let user: User = serde_json::from_str(
            r#"{"_id":"u1","email":"jane@example.com","name":"Jane","avatar":null}"#,
        )
        .unwrap();

        assert_eq!(user.id.as_str(), "u1");
        assert_eq!(user.name, "Jane");
        assert_eq!(user.avatar, "");

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["_id"], "u1");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let user: User = serde_json::from_str(r#"{"email":"a@b.c"}"#).unwrap();
        assert!(user.is_provisional());
        assert_eq!(user.name, "");
    }
}
