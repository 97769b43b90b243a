use dsv_types::ProfileId;

/// Signing capability used to sign commits.
///
/// The pipeline only ever sees this trait; key storage and the signature
/// algorithm belong to the implementation.
pub trait Signer: Send + Sync {
    /// Sign `message` and return the opaque signature bytes.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignError>;

    /// Identity of the key holder, recorded as the commit author.
    fn profile_id(&self) -> ProfileId;
}

/// Ed25519 signing key (private).
pub struct Ed25519Signer(ed25519_dalek::SigningKey);

/// Ed25519 verifying key (public).
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

impl Ed25519Signer {
    /// Generate a new random signing key.
    pub fn generate() -> Self {
        let mut csprng = rand::thread_rng();
        Self(ed25519_dalek::SigningKey::generate(&mut csprng))
    }

    /// Create from raw 32-byte secret.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&bytes))
    }

    /// The corresponding public verifying key.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key())
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignError> {
        use ed25519_dalek::Signer as _;
        Ok(self.0.sign(message).to_bytes().to_vec())
    }

    fn profile_id(&self) -> ProfileId {
        self.verifying_key().to_profile_id()
    }
}

impl VerifyingKey {
    /// Verify a signature produced by [`Ed25519Signer`].
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), SignError> {
        use ed25519_dalek::Verifier;
        let bytes: [u8; 64] = signature
            .try_into()
            .map_err(|_| SignError::InvalidSignature)?;
        let signature = ed25519_dalek::Signature::from_bytes(&bytes);
        self.0
            .verify(message, &signature)
            .map_err(|_| SignError::InvalidSignature)
    }

    /// Derive the author identity for this public key.
    pub fn to_profile_id(&self) -> ProfileId {
        ProfileId::from_public_key(&self.0.to_bytes())
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signer(<redacted>)")
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey({})", hex::encode(self.0.to_bytes()))
    }
}

/// Errors from signing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("signing failed: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let signer = Ed25519Signer::generate();
        let sig = signer.sign(b"hello world").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(signer.verifying_key().verify(b"hello world", &sig).is_ok());
    }

    #[test]
    fn verify_fails_on_wrong_message() {
        let signer = Ed25519Signer::generate();
        let sig = signer.sign(b"correct message").unwrap();
        assert_eq!(
            signer.verifying_key().verify(b"wrong message", &sig),
            Err(SignError::InvalidSignature)
        );
    }

    #[test]
    fn verify_rejects_truncated_signature() {
        let signer = Ed25519Signer::generate();
        let sig = signer.sign(b"message").unwrap();
        assert!(signer.verifying_key().verify(b"message", &sig[..10]).is_err());
    }

    #[test]
    fn signatures_are_deterministic() {
        let signer = Ed25519Signer::from_bytes([9; 32]);
        assert_eq!(signer.sign(b"m").unwrap(), signer.sign(b"m").unwrap());
    }

    #[test]
    fn profile_id_follows_key() {
        let a = Ed25519Signer::from_bytes([1; 32]);
        let b = Ed25519Signer::from_bytes([1; 32]);
        let c = Ed25519Signer::from_bytes([2; 32]);
        assert_eq!(a.profile_id(), b.profile_id());
        assert_ne!(a.profile_id(), c.profile_id());
    }

    #[test]
    fn verifying_key_follows_signer() {
        let a = Ed25519Signer::from_bytes([3; 32]);
        let b = Ed25519Signer::from_bytes([3; 32]);
        assert_eq!(a.verifying_key(), b.verifying_key());
        assert_eq!(a.verifying_key().to_profile_id(), a.profile_id());
    }

    #[test]
    fn debug_redacts_signing_key() {
        let signer = Ed25519Signer::generate();
        assert!(format!("{signer:?}").contains("redacted"));
    }
}
