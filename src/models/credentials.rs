use serde::{Deserialize, Serialize};
use std::fmt;

/// NetSuite credential bundle, loaded once at startup and never mutated
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialBundle {
    pub account_id: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub username: String,
    pub password: String,
    /// Role ID (only used by NLAuth)
    pub role: String,
}

/// One flag per credential field. Used both as a "present" map and as a "missing" map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialFlags {
    pub account_id: bool,
    pub consumer_key: bool,
    pub consumer_secret: bool,
    pub username: bool,
    pub password: bool,
    pub role: bool,
}

impl CredentialFlags {
    fn inverted(self) -> Self {
        Self {
            account_id: !self.account_id,
            consumer_key: !self.consumer_key,
            consumer_secret: !self.consumer_secret,
            username: !self.username,
            password: !self.password,
            role: !self.role,
        }
    }
}

/// A value counts as set only if it has non-whitespace content
pub fn is_set(value: &str) -> bool {
    !value.trim().is_empty()
}

impl CredentialBundle {
    /// Which fields carry a value
    pub fn presence(&self) -> CredentialFlags {
        CredentialFlags {
            account_id: is_set(&self.account_id),
            consumer_key: is_set(&self.consumer_key),
            consumer_secret: is_set(&self.consumer_secret),
            username: is_set(&self.username),
            password: is_set(&self.password),
            role: is_set(&self.role),
        }
    }

    /// Which fields are empty
    pub fn missing(&self) -> CredentialFlags {
        self.presence().inverted()
    }

    /// Account id is mandatory, plus at least one piece of authentication material.
    /// Partial sets are left for the auth selector to accept or reject.
    pub fn is_configured(&self) -> bool {
        let p = self.presence();
        p.account_id && (p.consumer_key || p.consumer_secret || p.username || p.password)
    }
}

// Never print secret values
impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &str| if is_set(v) { "***" } else { "" };
        f.debug_struct("CredentialBundle")
            .field("account_id", &self.account_id)
            .field("consumer_key", &redact(&self.consumer_key))
            .field("consumer_secret", &redact(&self.consumer_secret))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("role", &self.role)
            .finish()
    }
}
