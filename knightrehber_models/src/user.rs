use std::fmt;

use serde::{Deserialize, Serialize};

pub const GUEST_USER_ID: &str = "guest";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn guest() -> Self {
        Self(GUEST_USER_ID.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Guest and empty ids never own persisted data.
    pub fn is_anonymous(&self) -> bool {
        self.0.is_empty() || self.0 == GUEST_USER_ID
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: UserId,
    pub is_guest: bool,
}

impl SessionUser {
    pub fn registered(id: UserId) -> Self {
        Self {
            id,
            is_guest: false,
        }
    }

    pub fn guest() -> Self {
        Self {
            id: UserId::guest(),
            is_guest: true,
        }
    }

    pub fn can_use_alarms(&self) -> bool {
        !self.is_guest && !self.id.is_anonymous()
    }
}
