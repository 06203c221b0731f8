use sha2::{Digest, Sha256};

/// Content digest used for manifest entries.
pub trait Digester {
    /// Returns the lower-case hex digest of `bytes`.
    fn digest(&self, bytes: &[u8]) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digester;

impl Digester for Sha256Digester {
    fn digest(&self, bytes: &[u8]) -> String {
        sha256_hex(bytes)
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
