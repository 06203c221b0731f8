#![forbid(unsafe_code)]

use crate::error::Result;

pub mod cms;
pub mod credentials;

pub use cms::CmsSigner;
pub use credentials::{CredentialFiles, SigningCredentials};

/// Produces a detached signature over serialized manifest bytes.
pub trait ManifestSigner {
    /// Returns the DER encoded signature for `manifest`.
    fn sign(&self, manifest: &[u8]) -> Result<Vec<u8>>;
}

impl<S: ManifestSigner + ?Sized> ManifestSigner for &S {
    fn sign(&self, manifest: &[u8]) -> Result<Vec<u8>> {
        (**self).sign(manifest)
    }
}
