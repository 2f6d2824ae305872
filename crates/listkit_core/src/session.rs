use std::fmt;

use listkit_logging::redact;

/// Scope name under which the signed-in user's id joins every fetch key.
pub const USER_SCOPE: &str = "userId";

/// Credentials of a signed-in user, valid from login until logout.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    user_id: String,
    token: String,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_id", &self.user_id)
            .field("token", &redact(&self.token))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_token() {
        let session = SessionContext::new("u-7", "secret-token");
        let printed = format!("{session:?}");
        assert!(printed.contains("u-7"));
        assert!(!printed.contains("secret-token"));
    }
}
