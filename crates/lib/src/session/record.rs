//! The persisted session record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Parent,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "parent" => Ok(Role::Parent),
            "student" => Ok(Role::Student),
            other => Err(format!(
                "unknown role '{other}' (expected admin, teacher, parent or student)"
            )),
        }
    }
}

/// The currently authenticated user and when their session lapses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    /// Epoch milliseconds after which the record is evicted on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_expiry: Option<i64>,
}

impl SessionRecord {
    /// A fresh record created and last logged in at `now`, with no expiry yet.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            role,
            created_at: now,
            last_login: now,
            session_expiry: None,
        }
    }

    /// True if the expiry is set and strictly before `now_millis`.
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        self.session_expiry.is_some_and(|expiry| expiry < now_millis)
    }

    /// Milliseconds left before expiry. `None` for records without an expiry.
    pub fn remaining_millis(&self, now_millis: i64) -> Option<i64> {
        self.session_expiry
            .map(|expiry| expiry.saturating_sub(now_millis).max(0))
    }

    /// Shallow-merge the populated fields of `update` over this record.
    pub(crate) fn apply(&mut self, update: SessionUpdate) {
        if let Some(id) = update.id {
            self.id = id;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(created_at) = update.created_at {
            self.created_at = created_at;
        }
    }
}

/// Partial update merged over the current session.
///
/// `last_login` and `session_expiry` are always restamped by the store and
/// therefore cannot be set here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    pub id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
    pub created_at: Option<DateTime<Utc>>,
}

impl SessionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}
