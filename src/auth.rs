//! Local profile store: registration, login, onboarding and profile updates.
//!
//! Credentials are kept as Argon2 PHC strings. A stored credential that is
//! not a PHC string comes from the old plaintext layout and is reported as
//! incompatible data so the caller can offer the clear-data recovery flow.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::rngs::OsRng;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{Result, TeaCalError};
use crate::metrics::MetricsCollector;
use crate::models::{ProfileUpdate, UserProfile};
use crate::repository::{JsonListRepository, Repository};
use crate::storage::{self, keys, KeyValueStore};
use crate::validation::InputValidator;

/// Hash a password into an Argon2 PHC string
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            TeaCalError::PasswordHash(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Check a password against a stored PHC string.
///
/// Fails with `IncompatibleStoredData` when `hash` is not a PHC string.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        warn!(error = %e, "stored credential is not a password hash");
        TeaCalError::IncompatibleStoredData("stored credential has a legacy format".to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Users, the signed-in session and the registration bridge
pub struct ProfileStore {
    store: Arc<dyn KeyValueStore>,
    users: JsonListRepository<UserProfile>,
    // username -> user id
    by_username: HashMap<String, String>,
    metrics: MetricsCollector,
}

impl ProfileStore {
    /// Load the user collection.
    ///
    /// Fails with `IncompatibleStoredData` if the stored list has a legacy
    /// shape; use [`ProfileStore::clear_legacy_data`] to recover.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let users: JsonListRepository<UserProfile> =
            JsonListRepository::load(Arc::clone(&store), keys::USERS)?;
        let by_username = users
            .list()
            .iter()
            .map(|u| (u.username.clone(), u.id.clone()))
            .collect();
        Ok(Self {
            store,
            users,
            by_username,
            metrics: MetricsCollector::default(),
        })
    }

    fn find_by_username(&self, username: &str) -> Option<&UserProfile> {
        self.by_username
            .get(username)
            .and_then(|id| self.users.get(id))
    }

    /// Create an account. Stores the new id as the onboarding bridge.
    pub fn register(&mut self, username: &str, password: &str) -> Result<UserProfile> {
        let username = InputValidator::normalize_username(username);
        InputValidator::validate_username(&username)?;
        InputValidator::validate_password(password)?;

        if self.find_by_username(&username).is_some() {
            info!(username = %username, "Registration rejected: duplicate username");
            return Err(TeaCalError::DuplicateUsername(username));
        }

        let user = UserProfile {
            id: Uuid::new_v4().to_string(),
            username,
            credential: hash_password(password)?,
            weight: None,
            height: None,
            age: None,
            sweetness_preference: Default::default(),
            favorite_brands: Default::default(),
            created_at: Utc::now(),
        };
        self.users.put(user.clone())?;
        self.by_username.insert(user.username.clone(), user.id.clone());
        storage::set_json(self.store.as_ref(), keys::TEMP_USER_ID, &user.id)?;

        self.metrics.record_registration();
        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Registration form variant that also checks the confirmation field
    pub fn register_with_confirmation(
        &mut self,
        username: &str,
        password: &str,
        confirm: &str,
    ) -> Result<UserProfile> {
        InputValidator::validate_password_confirmation(password, confirm)?;
        self.register(username, password)
    }

    /// Check credentials and make the user current
    pub fn login(&mut self, username: &str, password: &str) -> Result<UserProfile> {
        let username = InputValidator::normalize_username(username);
        let Some(user) = self.find_by_username(&username).cloned() else {
            debug!(username = %username, "Login failed: unknown user");
            self.metrics.record_login("invalid_credentials");
            return Err(TeaCalError::InvalidCredentials);
        };

        let verified = match verify_password(password, &user.credential) {
            Ok(verified) => verified,
            Err(e) => {
                self.metrics.record_login("incompatible_data");
                return Err(e);
            },
        };
        if !verified {
            debug!(username = %username, "Login failed: wrong password");
            self.metrics.record_login("invalid_credentials");
            return Err(TeaCalError::InvalidCredentials);
        }

        storage::set_json(self.store.as_ref(), keys::CURRENT_USER, &user)?;
        self.metrics.record_login("success");
        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Merge profile fields into a stored user
    pub fn update_profile(&mut self, user_id: &str, update: &ProfileUpdate) -> Result<UserProfile> {
        InputValidator::validate_profile_update(update)?;

        let mut user = self
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| TeaCalError::NotFound(format!("user {user_id}")))?;
        update.apply_to(&mut user);
        let signed_in = self.current_user()?.is_some_and(|current| current.id == user.id);
        self.users.put(user.clone())?;

        if signed_in {
            storage::set_json(self.store.as_ref(), keys::CURRENT_USER, &user)?;
        }
        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Finish onboarding for the user who just registered
    pub fn complete_onboarding(&mut self, update: &ProfileUpdate) -> Result<UserProfile> {
        let temp_id = self
            .temp_user_id()?
            .ok_or_else(|| TeaCalError::NotFound("session expired, please log in again".to_string()))?;
        InputValidator::validate_onboarding(update)?;

        let user = self.update_profile(&temp_id, update)?;
        self.store.remove(keys::TEMP_USER_ID)?;
        storage::set_json(self.store.as_ref(), keys::CURRENT_USER, &user)?;
        info!(user_id = %user.id, "Onboarding completed");
        Ok(user)
    }

    /// The signed-in user, if any
    pub fn current_user(&self) -> Result<Option<UserProfile>> {
        match storage::get_json(self.store.as_ref(), keys::CURRENT_USER) {
            Err(TeaCalError::Serialization(e)) => Err(TeaCalError::IncompatibleStoredData(format!(
                "{}: {e}",
                keys::CURRENT_USER
            ))),
            other => other,
        }
    }

    /// The signed-in user, or `NotFound` when the session is missing
    pub fn require_current_user(&self) -> Result<UserProfile> {
        self.current_user()?
            .ok_or_else(|| TeaCalError::NotFound("no user logged in".to_string()))
    }

    /// Id stored between registration and onboarding
    pub fn temp_user_id(&self) -> Result<Option<String>> {
        storage::get_json(self.store.as_ref(), keys::TEMP_USER_ID)
    }

    /// Look up a user by id
    #[must_use]
    pub fn user(&self, user_id: &str) -> Option<&UserProfile> {
        self.users.get(user_id)
    }

    /// Every registered user
    #[must_use]
    pub fn users(&self) -> &[UserProfile] {
        self.users.list()
    }

    /// End the session
    pub fn logout(&mut self) -> Result<()> {
        self.store.remove(keys::CURRENT_USER)?;
        info!("User logged out");
        Ok(())
    }

    /// Remove all user data so a fresh account can be registered
    pub fn clear_legacy_data(store: &dyn KeyValueStore) -> Result<()> {
        store.remove(keys::USERS)?;
        store.remove(keys::CURRENT_USER)?;
        store.remove(keys::TEMP_USER_ID)?;
        warn!("Cleared stored user data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct-horse").expect("hashing should succeed");
        assert!(!verify_password("wrong-horse", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_plaintext_credential_is_legacy() {
        let err = verify_password("secret1", "secret1").unwrap_err();
        assert!(err.needs_clear_data());
    }
}
