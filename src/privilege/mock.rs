// src/privilege/mock.rs

use std::collections::HashMap;
use std::io;

use super::IdentityLookup;

/// Table-backed identity lookup for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    users: HashMap<String, u32>,
    groups: HashMap<String, u32>,
    /// When set, every lookup fails with this error kind.
    failure: Option<io::ErrorKind>,
}

impl StaticIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, name: &str, uid: u32) -> Self {
        self.users.insert(name.to_string(), uid);
        self
    }

    pub fn with_group(mut self, name: &str, gid: u32) -> Self {
        self.groups.insert(name.to_string(), gid);
        self
    }

    /// Make every lookup fail, as if the identity database were unreadable.
    pub fn failing(mut self, kind: io::ErrorKind) -> Self {
        self.failure = Some(kind);
        self
    }

    fn check(&self) -> io::Result<()> {
        match self.failure {
            Some(kind) => Err(io::Error::new(kind, "identity database unavailable")),
            None => Ok(()),
        }
    }
}

impl IdentityLookup for StaticIdentity {
    fn user_id(&self, name: &str) -> io::Result<Option<u32>> {
        self.check()?;
        Ok(self.users.get(name).copied())
    }

    fn group_id(&self, name: &str) -> io::Result<Option<u32>> {
        self.check()?;
        Ok(self.groups.get(name).copied())
    }
}
