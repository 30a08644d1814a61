//! Credential checks for sign-in

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Trait for sign-in credential checks
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Whether the password matches the user
    async fn authenticate(&self, username: &str, password: &str) -> Result<bool>;
}

/// Authenticator over a fixed username to password map
#[derive(Debug, Clone, Default)]
pub struct BasicAuthenticator {
    users: HashMap<String, String>,
}

impl BasicAuthenticator {
    pub fn new(users: HashMap<String, String>) -> Self {
        Self { users }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[async_trait]
impl Authenticator for BasicAuthenticator {
    async fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        debug!("Authenticating user: {}", username);

        match self.users.get(username) {
            Some(expected) if expected == password => {
                debug!("User {} authenticated successfully", username);
                Ok(true)
            }
            Some(_) => {
                warn!("User {} authentication failed: wrong password", username);
                Ok(false)
            }
            None => {
                warn!("User {} authentication failed: unknown user", username);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthSettings;

    #[tokio::test]
    async fn test_default_users() {
        let auth = BasicAuthenticator::new(AuthSettings::default().users);
        assert_eq!(auth.user_count(), 2);

        assert!(auth.authenticate("user1", "password1").await.unwrap());
        assert!(auth.authenticate("user2", "password2").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_bad_credentials() {
        let auth = BasicAuthenticator::new(AuthSettings::default().users);

        assert!(!auth.authenticate("user1", "password2").await.unwrap());
        assert!(!auth.authenticate("nobody", "password1").await.unwrap());
        assert!(!auth.authenticate("", "").await.unwrap());
    }
}
