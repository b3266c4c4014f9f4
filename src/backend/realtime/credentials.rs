//! Credential verification seam
//!
//! The gateway never registers a connection without first resolving its
//! bearer credential to a user through a `CredentialVerifier`.

use crate::backend::realtime::error::RealtimeError;
use crate::shared::UserId;

/// Resolves a bearer credential to a user identity
pub trait CredentialVerifier: Send + Sync {
    /// # Errors
    ///
    /// `RealtimeError::InvalidCredential` when the credential is malformed,
    /// expired or signed with the wrong key.
    fn verify(&self, credential: &str) -> Result<UserId, RealtimeError>;
}
