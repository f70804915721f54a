// src/privilege/mod.rs

//! Resolution of user/group names to numeric credentials.
//!
//! The lookup itself goes through [`IdentityLookup`] so the resolver can be
//! exercised without touching the host's user database; [`SystemIdentity`]
//! is the production implementation backed by `getpwnam`/`getgrnam` via `nix`.

use std::fmt::Debug;
use std::io;

use nix::unistd::{Group, User};

use crate::errors::{IdentityKind, LaunchError};

pub mod mock;

/// Name → numeric id lookup capability.
///
/// `Ok(None)` means the name is not known to the identity database.
pub trait IdentityLookup: Send + Sync + Debug {
    fn user_id(&self, name: &str) -> io::Result<Option<u32>>;
    fn group_id(&self, name: &str) -> io::Result<Option<u32>>;
}

/// Lookup against the host's passwd/group databases.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

impl IdentityLookup for SystemIdentity {
    fn user_id(&self, name: &str) -> io::Result<Option<u32>> {
        let user = User::from_name(name).map_err(io::Error::from)?;
        Ok(user.map(|u| u.uid.as_raw()))
    }

    fn group_id(&self, name: &str) -> io::Result<Option<u32>> {
        let group = Group::from_name(name).map_err(io::Error::from)?;
        Ok(group.map(|g| g.gid.as_raw()))
    }
}

/// Resolved credentials for a child process.
///
/// `None` means "inherit the supervisor's own id", which keeps an unset field
/// distinct from an explicit `root`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Credentials {
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

impl Credentials {
    /// True if neither id overrides the supervisor's own.
    pub fn is_inherited(&self) -> bool {
        self.uid.is_none() && self.gid.is_none()
    }

    /// Legacy `(uid, gid)` pair, with `0` standing in for an unset field.
    pub fn ids(&self) -> (u32, u32) {
        (self.uid.unwrap_or(0), self.gid.unwrap_or(0))
    }
}

/// Resolve a user and group name pair.
///
/// Either name may be empty, meaning "inherit". A name consisting only of
/// ASCII digits is taken as a numeric id.
pub fn resolve_credentials(
    lookup: &dyn IdentityLookup,
    user: &str,
    group: &str,
) -> Result<Credentials, LaunchError> {
    let gid = resolve_one(IdentityKind::Group, group, |name| lookup.group_id(name))?;
    let uid = resolve_one(IdentityKind::User, user, |name| lookup.user_id(name))?;
    Ok(Credentials { uid, gid })
}

fn resolve_one(
    kind: IdentityKind,
    name: &str,
    lookup: impl FnOnce(&str) -> io::Result<Option<u32>>,
) -> Result<Option<u32>, LaunchError> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }

    if name.bytes().all(|b| b.is_ascii_digit()) {
        return name
            .parse::<u32>()
            .map(Some)
            .map_err(|source| LaunchError::Parse {
                kind,
                name: name.to_string(),
                source,
            });
    }

    match lookup(name) {
        Ok(Some(id)) => Ok(Some(id)),
        Ok(None) => Err(LaunchError::Lookup {
            kind,
            name: name.to_string(),
            source: None,
        }),
        Err(source) => Err(LaunchError::Lookup {
            kind,
            name: name.to_string(),
            source: Some(source),
        }),
    }
}
