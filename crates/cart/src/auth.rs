//! Mock account session.
//!
//! Sign-in is local only: any non-blank email with any password is
//! accepted, and the resulting profile is persisted under the `user` key so
//! the session survives a restart. There is no credential check.

use std::sync::{Arc, PoisonError, RwLock};

use pocketshop_core::UserId;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::storage::{KeyValueStore, StorageKeys};

const DEMO_USER_ID: i64 = 1;
const DEMO_USER_NAME: &str = "John Doe";
const PLACEHOLDER_AVATAR: &str = "https://via.placeholder.com/100";

/// Errors from sign-in and registration.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email cannot be empty")]
    EmptyEmail,

    #[error("name cannot be empty")]
    EmptyName,
}

/// A signed-in user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Stored as entered; the mock backend never checks its shape.
    pub email: String,
    /// Avatar image URL.
    pub avatar: String,
}

/// Holds the current user and mirrors it to storage.
pub struct AuthStore<S> {
    storage: Arc<S>,
    key: String,
    user: RwLock<Option<User>>,
}

impl<S: KeyValueStore> AuthStore<S> {
    #[must_use]
    pub fn new(storage: Arc<S>, keys: &StorageKeys) -> Self {
        Self {
            storage,
            key: keys.user.clone(),
            user: RwLock::new(None),
        }
    }

    /// Restore the saved user, if any. Failures leave the session signed out.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        let user = match self.storage.get(&self.key).await {
            Ok(Some(raw)) => serde_json::from_str::<User>(&raw)
                .inspect_err(|e| warn!(error = %e, "Discarding unreadable saved user"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read saved user");
                None
            }
        };
        info!(signed_in = user.is_some(), "Loaded session");
        self.replace(user);
    }

    /// Sign in as the demo user with the given email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmptyEmail` if the email is blank.
    #[instrument(skip(self, _password))]
    pub async fn login(&self, email: &str, _password: &SecretString) -> Result<User, AuthError> {
        let user = User {
            id: UserId::new(DEMO_USER_ID),
            name: DEMO_USER_NAME.to_owned(),
            email: entered_email(email)?,
            avatar: PLACEHOLDER_AVATAR.to_owned(),
        };
        self.sign_in(user.clone()).await;
        Ok(user)
    }

    /// Create a profile and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmptyName` for a blank name and
    /// `AuthError::EmptyEmail` for a blank email.
    #[instrument(skip(self, _password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        _password: &SecretString,
    ) -> Result<User, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::EmptyName);
        }
        let user = User {
            id: UserId::new(chrono::Utc::now().timestamp_millis()),
            name: name.to_owned(),
            email: entered_email(email)?,
            avatar: PLACEHOLDER_AVATAR.to_owned(),
        };
        self.sign_in(user.clone()).await;
        Ok(user)
    }

    /// Sign out and delete the saved user.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.replace(None);
        if let Err(e) = self.storage.remove(&self.key).await {
            warn!(error = %e, "Failed to delete saved user");
        }
        info!("Signed out");
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    async fn sign_in(&self, user: User) {
        match serde_json::to_string(&user) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(&self.key, &raw).await {
                    warn!(error = %e, "Failed to save user");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode user"),
        }
        info!(user_id = %user.id, "Signed in");
        self.replace(Some(user));
    }

    fn replace(&self, user: Option<User>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user;
    }
}

fn entered_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::EmptyEmail);
    }
    Ok(email.to_owned())
}
