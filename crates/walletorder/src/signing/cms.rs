//! Detached PKCS#7 / CMS SignedData over manifest bytes.
//!
//! The signer info carries the content-type (id-data), message-digest and
//! signing-time signed attributes; the authority and signer certificates
//! are embedded in the certificate set.

use std::path::Path;

use cryptographic_message_syntax::{SignedDataBuilder, SignerBuilder};
use tracing::debug;

use crate::error::{OrderError, Result};

use super::ManifestSigner;
use super::credentials::{CredentialFiles, SigningCredentials};

pub struct CmsSigner {
    credentials: SigningCredentials,
}

impl CmsSigner {
    pub fn new(credentials: SigningCredentials) -> Self {
        Self { credentials }
    }

    pub fn from_dir(cert_dir: &Path, passphrase: &str, files: &CredentialFiles) -> Result<Self> {
        SigningCredentials::from_dir(cert_dir, passphrase, files).map(Self::new)
    }

    pub fn credentials(&self) -> &SigningCredentials {
        &self.credentials
    }
}

impl ManifestSigner for CmsSigner {
    fn sign(&self, manifest: &[u8]) -> Result<Vec<u8>> {
        let credentials = &self.credentials;

        let signer = SignerBuilder::new(&credentials.signing_key, credentials.certificate.clone());

        let mut builder = SignedDataBuilder::default()
            .content_external(manifest.to_vec())
            .signer(signer);

        for cert in &credentials.cert_chain {
            builder = builder.certificate(cert.clone());
        }
        builder = builder.certificate(credentials.certificate.clone());

        let der = builder
            .build_der()
            .map_err(|err| OrderError::crypto(format!("failed to build CMS signature: {err}")))?;

        debug!(len = der.len(), "signed manifest");
        Ok(der)
    }
}
