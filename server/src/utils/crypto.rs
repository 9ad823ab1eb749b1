//! Cryptographic utility functions

use anyhow::{Result, bail};
use rand::RngCore;
use rand::distributions::{Alphanumeric, DistString};
use sha2::{Digest, Sha256};

/// Size of the HS256 session signing key in bytes
pub const SIGNING_KEY_LEN: usize = 32;

/// Generate a cryptographically secure random key
pub fn generate_key(len: usize) -> Vec<u8> {
    let mut key = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut key);
    key
}

/// Generate a 256-bit session signing key
pub fn generate_signing_key() -> Vec<u8> {
    generate_key(SIGNING_KEY_LEN)
}

/// Generate a random alphanumeric password (used for the seeded admin)
pub fn generate_password(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), len)
}

/// Decode a hex-encoded signing key, rejecting anything but the expected size
pub fn decode_signing_key(encoded: &str) -> Result<Vec<u8>> {
    let key = hex::decode(encoded.trim())?;
    if key.len() != SIGNING_KEY_LEN {
        bail!(
            "Invalid signing key length: expected {} bytes, got {}",
            SIGNING_KEY_LEN,
            key.len()
        );
    }
    Ok(key)
}

/// Calculate SHA256 hash and return as hex string
pub fn sha256_hex(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}
