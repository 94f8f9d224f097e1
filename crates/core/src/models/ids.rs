//! Opaque identifiers supplied by the platform
//!
//! The platform owns the format of these identifiers. JTC never parses them,
//! it only compares and stores them.

use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Blank identifiers never come from a healthy platform
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a room (voice channel, category, ...)
    RoomId
);

opaque_id!(
    /// Identifier of a member, unique within a guild
    MemberId
);

opaque_id!(
    /// Identifier of a guild (community scope)
    GuildId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_ids() {
        assert!(RoomId::new("").is_blank());
        assert!(MemberId::new("   ").is_blank());
        assert!(!GuildId::new("42").is_blank());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = RoomId::new("1234");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1234\"");
        let back: RoomId = serde_json::from_str("\"1234\"").unwrap();
        assert_eq!(back, id);
    }
}
