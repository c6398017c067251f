//! Opaque identifier newtypes.
//!
//! Every id in the system is a distinct type even though all are
//! UUID-grade strings underneath — this prevents accidentally passing a
//! `NodeId` where a `CanonicalSlotId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

opaque_id!(SessionId);
opaque_id!(NodeId);
opaque_id!(EdgeId);
opaque_id!(UtteranceId);
opaque_id!(CanonicalSlotId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_types_do_not_interconvert_silently() {
        let node = NodeId::generate();
        let edge = EdgeId::new(node.as_str().to_string());
        assert_eq!(node.as_str(), edge.as_str());
    }

    #[test]
    fn display_round_trips_through_string() {
        let id = SessionId::new("session-abc");
        assert_eq!(id.to_string(), "session-abc");
    }
}
