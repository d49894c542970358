//! Accounts that session tickets are issued to

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How much an account is trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    Anonymous,
    User,
    Administrator,
    System,
}

/// An authenticated principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub security_level: SecurityLevel,
}

impl Account {
    pub fn new(name: impl Into<String>, security_level: SecurityLevel) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            security_level,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.security_level > SecurityLevel::Anonymous
    }
}
