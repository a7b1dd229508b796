//! Credential cipher for the identity provider.
//!
//! The login form never receives a plaintext password: the browser encrypts
//! it against a published RSA key (PKCS#1 v1.5, no OAEP) and prefixes the
//! base64 ciphertext with a marker so the server can tell the two forms
//! apart. This module reproduces that envelope. The key is parsed once at
//! construction; a blob that does not decode as an rsaEncryption
//! SubjectPublicKeyInfo is fatal before any credential is touched.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use tracing::debug;

use crate::error::{PortalError, PortalResult};

/// Prefix distinguishing ciphertext from plaintext passwords.
pub const CIPHERTEXT_MARKER: &str = "__RSA__";

/// The 2048-bit login key published by the identity provider, as a base64
/// X.509 SubjectPublicKeyInfo blob.
const LOGIN_PUBLIC_KEY: &str = "MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAwU7Wty6I3Sr4Z6onpSZRU39XNGdHYPIKFf8T7UP2FqihiOJEnFIF0n6tcncjDYGEnalhFiq/n8dXkhUCQWMPv2C1pT1PxT25SBVZlZNXq+abudxNoOGzc5kPdVuDIq4Nq7RfZHrbeu7IaWmxEmDm9zb/Q+VI9EIFM92p3e0ZLLfAwDASXzod9x4ocmBFXGuaDVGA8cPQxNvNXgKit5oLWMa4B1YZ0IMDSZbqpaM2llgQ0anN5VQYwFHSOMZy2LCYq97Db33rC74AbHWw7/bmO15p4q2y4t7qCbmaRIhGlpicCeETl/pljqksZ95/ckYW7Q5H/nSJT75ImYF0jEgIrQIDAQAB";

/// RSA password cipher wrapping the provider's public key.
#[derive(Debug)]
pub struct CredentialCipher {
    key: RsaPublicKey,
}

impl CredentialCipher {
    /// Creates the cipher from the provider's embedded key.
    pub fn builtin() -> PortalResult<Self> {
        Self::from_spki_base64(LOGIN_PUBLIC_KEY)
    }

    /// Creates the cipher from a base64 SubjectPublicKeyInfo blob.
    ///
    /// Both short-form and long-form DER length encodings are accepted;
    /// blobs whose algorithm identifier is not rsaEncryption are rejected.
    pub fn from_spki_base64(blob: &str) -> PortalResult<Self> {
        let der = STANDARD
            .decode(blob.trim())
            .map_err(|e| PortalError::key_format("public key blob is not base64").with_source(e))?;
        let key = RsaPublicKey::from_public_key_der(&der)
            .map_err(|e| PortalError::key_format("public key DER rejected").with_source(e))?;
        debug!(
            modulus_bytes = key.size(),
            exponent = %key.e(),
            "parsed login public key"
        );
        Ok(Self { key })
    }

    /// Encrypts a password into the portal's marker-prefixed envelope.
    ///
    /// Input already carrying the marker is returned unchanged, so stored
    /// ciphertext can be replayed through the login flow without being
    /// encrypted twice.
    pub fn encrypt_password(&self, plain: &str) -> PortalResult<String> {
        if plain.starts_with(CIPHERTEXT_MARKER) {
            return Ok(plain.to_string());
        }
        let ciphertext = self
            .key
            .encrypt(&mut rand::thread_rng(), Pkcs1v15Encrypt, plain.as_bytes())
            .map_err(|e| PortalError::internal("password encryption failed").with_source(e))?;
        Ok(format!("{}{}", CIPHERTEXT_MARKER, STANDARD.encode(ciphertext)))
    }

    /// Size of the key modulus in bytes (also the ciphertext length).
    pub fn modulus_bytes(&self) -> usize {
        self.key.size()
    }

    /// Public exponent, rendered for diagnostics.
    pub fn exponent(&self) -> String {
        self.key.e().to_string()
    }
}
