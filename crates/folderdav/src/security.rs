//! Pluggable authentication and authorization.
//!
//! A [`ResourceFactory`](crate::ResourceFactory) optionally holds one
//! [`SecurityManager`]. When none is configured every resource runs in open
//! mode: any credentials authenticate and every request is authorized.

use crate::request::{Auth, Method, Principal, Request};
use crate::resource::DavResource;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::fmt;
use subtle::ConstantTimeEq;
use tracing::debug;

/// Decides credential validity and per-request authorization.
pub trait SecurityManager: Send + Sync {
    /// Name of the protection realm presented to clients.
    fn realm(&self) -> &str;

    /// Verify credentials, returning the principal on success.
    fn authenticate(&self, user: &str, password: &str) -> Option<Principal>;

    /// Decide whether `request` may act on `resource`.
    fn authorise(
        &self,
        request: &Request,
        method: Method,
        auth: Option<&Auth>,
        resource: &dyn DavResource,
    ) -> bool;
}

/// Fixed user table with a single realm.
///
/// Any authenticated principal is authorized for every method.
pub struct SimpleSecurityManager {
    realm: String,
    users: HashMap<String, SecretString>,
}

impl SimpleSecurityManager {
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            users: HashMap::new(),
        }
    }

    /// Add or replace a user.
    #[must_use]
    pub fn with_user(mut self, name: impl Into<String>, password: impl Into<String>) -> Self {
        self.users
            .insert(name.into(), SecretString::from(password.into()));
        self
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

impl fmt::Debug for SimpleSecurityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleSecurityManager")
            .field("realm", &self.realm)
            .field("users", &self.users.len())
            .finish()
    }
}

impl SecurityManager for SimpleSecurityManager {
    fn realm(&self) -> &str {
        &self.realm
    }

    fn authenticate(&self, user: &str, password: &str) -> Option<Principal> {
        let Some(expected) = self.users.get(user) else {
            debug!(user = %user, "Unknown user");
            return None;
        };
        let matches: bool = expected
            .expose_secret()
            .as_bytes()
            .ct_eq(password.as_bytes())
            .into();
        if matches {
            Some(Principal::new(user))
        } else {
            debug!(user = %user, "Password mismatch");
            None
        }
    }

    fn authorise(
        &self,
        request: &Request,
        method: Method,
        auth: Option<&Auth>,
        resource: &dyn DavResource,
    ) -> bool {
        let allowed = auth.is_some_and(Auth::is_authenticated);
        debug!(
            method = %method,
            path = %request.path,
            resource = %resource.unique_id(),
            allowed,
            "Authorising request"
        );
        allowed
    }
}
