//! Integer-keyed identifiers.
//!
//! The persistence boundary is keyed by integer ids; these newtypes keep a
//! user id from being passed where a video id is expected.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

macro_rules! int_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize, JsonSchema,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Create from a raw integer.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the inner integer.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

int_id!(
    /// Identifier of an authenticated user. Authentication itself is owned
    /// by the fronting collaborator; by the time an id reaches this crate it
    /// is already verified.
    UserId
);

int_id!(
    /// Identifier of a climbing route record that a clip is attached to.
    RouteId
);

int_id!(
    /// Identifier of a persisted video record.
    VideoId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serialization_is_transparent() {
        let id = VideoId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");

        let back: VideoId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(UserId::new(7).to_string(), "7");
        assert_eq!(RouteId::from(3).as_i64(), 3);
    }
}
