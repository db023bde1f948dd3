//! Conversation identifiers.
//!
//! A conversation between two participants is keyed by a string derived from
//! both participant IDs. The derivation sorts the pair first, so it does not
//! matter who sent the first message:
//!
//! ```
//! use solace_core::ConversationId;
//!
//! let a = ConversationId::derive("user1", "user2");
//! let b = ConversationId::derive("user2", "user1");
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "user1user2");
//! ```
//!
//! The two IDs are joined without a separator. Stored conversation IDs and
//! clients already depend on that shape, so it is kept even though variable
//! length IDs can collide (`"1" + "23"` and `"12" + "3"` both give `"123"`).
//! Profile IDs are fixed-length UUIDs, which cannot collide this way.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::ProfileId;

/// Key of a two-party message thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Derive the key for the unordered pair `{a, b}`.
    ///
    /// The lexicographically smaller ID (byte-wise) comes first. No
    /// validation is applied to either ID.
    #[must_use]
    pub fn derive(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let mut id = String::with_capacity(first.len() + second.len());
        id.push_str(first);
        id.push_str(second);
        Self(id)
    }

    /// Derive the key for a conversation between two profiles.
    #[must_use]
    pub fn between(a: ProfileId, b: ProfileId) -> Self {
        Self::derive(&a.to_string(), &b.to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-supplied IDs are taken verbatim.
impl From<String> for ConversationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for ConversationId {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl AsRef<str> for ConversationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ConversationId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ConversationId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ConversationId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_orders_lexicographically() {
        assert_eq!(ConversationId::derive("user1", "user2").as_str(), "user1user2");
        assert_eq!(ConversationId::derive("user2", "user1").as_str(), "user1user2");
        assert_eq!(ConversationId::derive("b", "a").as_str(), "ab");
    }

    #[test]
    fn test_derive_is_commutative() {
        let pairs = [
            ("alice", "bob"),
            ("Zed", "amy"),
            ("", "x"),
            ("same-prefix", "same"),
            ("ünïcode", "ascii"),
        ];
        for (a, b) in pairs {
            assert_eq!(ConversationId::derive(a, b), ConversationId::derive(b, a));
        }
    }

    #[test]
    fn test_derive_is_idempotent() {
        let first = ConversationId::derive("user9", "user3");
        let second = ConversationId::derive("user9", "user3");
        assert_eq!(first, second);
    }

    #[test]
    fn test_uppercase_sorts_before_lowercase() {
        assert_eq!(ConversationId::derive("b", "B").as_str(), "Bb");
    }

    #[test]
    fn test_concatenation_can_collide() {
        assert_eq!(
            ConversationId::derive("1", "23"),
            ConversationId::derive("12", "3")
        );
    }

    #[test]
    fn test_between_profiles() {
        let a: ProfileId = "00000000-0000-4000-8000-000000000001".parse().unwrap();
        let b: ProfileId = "00000000-0000-4000-8000-000000000002".parse().unwrap();
        let id = ConversationId::between(b, a);
        assert_eq!(id, ConversationId::between(a, b));
        assert_eq!(
            id.as_str(),
            "00000000-0000-4000-8000-00000000000100000000-0000-4000-8000-000000000002"
        );
    }

    #[test]
    fn test_serde_transparent() {
        let id = ConversationId::derive("a", "b");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ab\"");
    }
}
