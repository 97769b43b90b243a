//! Cryptographic primitives for DSV.
//!
//! Provides domain-separated BLAKE3 hashing for content addressing and body
//! checksums, and the [`Signer`] capability used to sign commits together
//! with its Ed25519 implementation.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod hasher;
pub mod signer;

pub use hasher::ContentHasher;
pub use signer::{Ed25519Signer, SignError, Signer, VerifyingKey};
