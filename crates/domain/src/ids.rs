use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse the textual UUID form handed over by outer layers.
            pub fn parse(value: &str) -> Result<Self, crate::DomainError> {
                Uuid::parse_str(value.trim())
                    .map(Self)
                    .map_err(|_| crate::DomainError::InvalidId(value.to_string()))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

// Quest definition IDs
define_id!(QuestId);
define_id!(TaskId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_uuid_text() {
        let id = QuestId::new();
        let parsed = QuestId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = TaskId::parse("not-a-uuid").unwrap_err();
        assert!(matches!(err, crate::DomainError::InvalidId(ref raw) if raw == "not-a-uuid"));
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = TaskId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
