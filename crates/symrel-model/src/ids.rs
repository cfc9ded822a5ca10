#![deny(unsafe_code)]

use std::fmt;

/// Identifier of a stored relation definition.
///
/// Ids are time-seeded at creation but guaranteed unique within one
/// [`SystemState`](crate::SystemState); see the allocation logic in the
/// instruction core.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct RelationId(i64);

impl RelationId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RelationId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
