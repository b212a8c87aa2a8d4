//! Account registration and authentication.
//!
//! Credentials are stored as `hex(salt)$hex(digest)` where the digest is
//! HMAC-SHA-256 of the password keyed by a fresh 16-byte salt. Hashes
//! without the `$` separator are legacy bare SHA-256 digests; they still
//! authenticate and are upgraded to the salted form on the next password
//! change.

use crate::error::{AuthError, AuthFailure};
use hmac::{Hmac, Mac};
use librodb_core::Repository;
use librodb_model::{EntityId, Role, User};
use librodb_store::Criteria;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};

type HmacSha256 = Hmac<Sha256>;

const SALT_LEN: usize = 16;

/// User account management and credential checks.
pub struct AuthService {
    users: Arc<Repository<User>>,
}

impl AuthService {
    /// Creates the service over the user repository.
    #[must_use]
    pub fn new(users: Arc<Repository<User>>) -> Self {
        Self { users }
    }

    /// Registers a new account with a salted password hash.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] if the address is already
    /// registered, or a validation error for bad account data.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let taken = self
            .users
            .find_by(&Criteria::new().eq("email", email))?
            .into_iter()
            .next()
            .is_some();
        if taken {
            return Err(AuthError::EmailTaken {
                email: email.to_string(),
            });
        }

        let mut user = User::new(name, Some(email.to_string()), role)?;
        user.password_hash = hash_password(password);
        self.users.save(&mut user)?;
        info!(user = %user.id, "account registered");
        Ok(user)
    }

    /// Checks credentials and returns the account.
    ///
    /// Every rejection displays as the same opaque message; the precise
    /// reason is only in the [`AuthFailure`] payload.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Failed`] for an unknown address, a wrong
    /// password, or an inactive account.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .users
            .find_by(&Criteria::new().eq("email", email))?
            .into_iter()
            .next()
            .ok_or(AuthError::Failed(AuthFailure::UserNotFound))?;

        if !verify_password(&user.password_hash, password) {
            warn!(user = %user.id, "failed authentication attempt");
            return Err(AuthError::Failed(AuthFailure::InvalidCredentials));
        }
        if !user.active {
            return Err(AuthError::Failed(AuthFailure::InactiveAccount));
        }
        Ok(user)
    }

    /// Replaces the password after verifying the old one.
    ///
    /// Accounts still on a legacy bare digest are upgraded to the salted
    /// format here.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Failed`] for an unknown account or a wrong
    /// old password.
    pub fn change_password(
        &self,
        user_id: &EntityId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let mut user = self
            .users
            .get(user_id)?
            .ok_or(AuthError::Failed(AuthFailure::UserNotFound))?;
        if !verify_password(&user.password_hash, old_password) {
            return Err(AuthError::Failed(AuthFailure::InvalidCredentials));
        }
        user.password_hash = hash_password(new_password);
        self.users.save(&mut user)?;
        info!(user = %user.id, "password changed");
        Ok(())
    }

    /// Marks an account inactive; it can no longer authenticate.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Failed`] for an unknown account.
    pub fn deactivate(&self, user_id: &EntityId) -> Result<(), AuthError> {
        let mut user = self
            .users
            .get(user_id)?
            .ok_or(AuthError::Failed(AuthFailure::UserNotFound))?;
        user.active = false;
        self.users.save(&mut user)?;
        info!(user = %user.id, "account deactivated");
        Ok(())
    }
}

/// Produces `hex(salt)$hex(digest)` with a fresh random salt.
fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let digest = hmac_digest(&salt, password);
    format!("{}${}", hex::encode(salt), hex::encode(digest))
}

fn hmac_digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(salt).expect("HMAC accepts any key length");
    mac.update(password.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Checks a password against a stored hash, salted or legacy.
fn verify_password(stored: &str, password: &str) -> bool {
    match stored.split_once('$') {
        Some((salt_hex, digest_hex)) => {
            let (Ok(salt), Ok(digest)) = (hex::decode(salt_hex), hex::decode(digest_hex)) else {
                return false;
            };
            let mut mac = match HmacSha256::new_from_slice(&salt) {
                Ok(mac) => mac,
                Err(_) => return false,
            };
            mac.update(password.as_bytes());
            mac.verify_slice(&digest).is_ok()
        }
        // Legacy accounts store a bare SHA-256 hex digest.
        None => {
            let digest = hex::encode(Sha256::digest(password.as_bytes()));
            constant_time_eq(digest.as_bytes(), stored.as_bytes())
        }
    }
}

/// Byte comparison without an early exit on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
