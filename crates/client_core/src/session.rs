use shared::{
    domain::PublicKeyHex,
    identity::{parse_public_key, IdentityError},
};

use crate::SessionStore;

/// Session fixed at startup from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user: Option<PublicKeyHex>,
}

impl StaticSession {
    pub fn new(user: Option<PublicKeyHex>) -> Self {
        Self { user }
    }

    /// Accepts an npub or hex key. Blank means signed out.
    pub fn from_identity(identity: Option<&str>) -> Result<Self, IdentityError> {
        let user = match identity.map(str::trim) {
            Some(value) if !value.is_empty() => Some(parse_public_key(value)?),
            _ => None,
        };
        Ok(Self { user })
    }
}

impl SessionStore for StaticSession {
    fn current_user(&self) -> Option<PublicKeyHex> {
        self.user.clone()
    }
}
