//! Loading of the signer certificate, its private key and the authority
//! certificate from PEM files.

use std::fs;
use std::path::Path;

use pkcs8::{EncryptedPrivateKeyInfo, SecretDocument};
use tracing::debug;
use x509_certificate::{CapturedX509Certificate, InMemorySigningKeyPair};

use crate::config::OrderConfig;
use crate::error::{OrderError, Result};

const ENCRYPTED_KEY_LABEL: &str = "ENCRYPTED PRIVATE KEY";
const PLAIN_KEY_LABEL: &str = "PRIVATE KEY";

/// File names of the credentials inside a certificate directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialFiles {
    pub signer_cert: String,
    pub signer_key: String,
    pub authority_cert: String,
}

impl Default for CredentialFiles {
    fn default() -> Self {
        Self::from(&OrderConfig::default())
    }
}

impl From<&OrderConfig> for CredentialFiles {
    fn from(config: &OrderConfig) -> Self {
        Self {
            signer_cert: config.signer_cert.clone(),
            signer_key: config.signer_key.clone(),
            authority_cert: config.authority_cert.clone(),
        }
    }
}

pub struct SigningCredentials {
    pub certificate: CapturedX509Certificate,
    pub signing_key: InMemorySigningKeyPair,
    /// Authority certificates embedded next to the signer certificate.
    pub cert_chain: Vec<CapturedX509Certificate>,
}

impl SigningCredentials {
    /// Reads the signer certificate, the signer key and the authority
    /// certificate from `dir`, in that order.
    pub fn from_dir(dir: &Path, passphrase: &str, files: &CredentialFiles) -> Result<Self> {
        let cert_pem = read(&dir.join(&files.signer_cert))?;
        let certificate = parse_certificate(&cert_pem, &files.signer_cert)?;

        let key_pem = read(&dir.join(&files.signer_key))?;
        let key_pem = std::str::from_utf8(&key_pem).map_err(|err| {
            OrderError::crypto(format!("{} is not UTF-8 PEM: {err}", files.signer_key))
        })?;
        let signing_key = load_signing_key(key_pem, passphrase)?;

        let authority_pem = read(&dir.join(&files.authority_cert))?;
        let cert_chain = parse_chain(&authority_pem, &files.authority_cert)?;

        debug!(
            dir = %dir.display(),
            chain = cert_chain.len(),
            "loaded signing credentials"
        );

        Ok(Self {
            certificate,
            signing_key,
            cert_chain,
        })
    }

    pub fn from_pem(
        cert_pem: &[u8],
        key_pem: &str,
        passphrase: &str,
        authority_pem: &[u8],
    ) -> Result<Self> {
        Ok(Self {
            certificate: parse_certificate(cert_pem, "signer certificate")?,
            signing_key: load_signing_key(key_pem, passphrase)?,
            cert_chain: parse_chain(authority_pem, "authority certificate")?,
        })
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|err| OrderError::io(path, err))
}

fn parse_certificate(pem: &[u8], label: &str) -> Result<CapturedX509Certificate> {
    CapturedX509Certificate::from_pem(pem)
        .map_err(|err| OrderError::crypto(format!("failed to parse {label}: {err}")))
}

fn parse_chain(pem: &[u8], label: &str) -> Result<Vec<CapturedX509Certificate>> {
    let chain = CapturedX509Certificate::from_pem_multiple(pem)
        .map_err(|err| OrderError::crypto(format!("failed to parse {label}: {err}")))?;
    if chain.is_empty() {
        return Err(OrderError::crypto(format!("{label} contains no certificate")));
    }
    Ok(chain)
}

/// Decodes a PKCS#8 private key, decrypting it with `passphrase` when the
/// PEM label marks it as encrypted.
fn load_signing_key(pem: &str, passphrase: &str) -> Result<InMemorySigningKeyPair> {
    let document = decode_private_key(pem, passphrase)?;
    InMemorySigningKeyPair::from_pkcs8_der(document.as_bytes())
        .map_err(|err| OrderError::crypto(format!("unsupported signer key: {err}")))
}

fn decode_private_key(pem: &str, passphrase: &str) -> Result<SecretDocument> {
    let (label, document) = SecretDocument::from_pem(pem)
        .map_err(|err| OrderError::crypto(format!("failed to parse private key PEM: {err}")))?;

    match label {
        ENCRYPTED_KEY_LABEL => {
            let info = EncryptedPrivateKeyInfo::try_from(document.as_bytes()).map_err(|err| {
                OrderError::crypto(format!("malformed encrypted private key: {err}"))
            })?;
            info.decrypt(passphrase).map_err(|err| {
                OrderError::crypto(format!(
                    "failed to decrypt private key (wrong passphrase?): {err}"
                ))
            })
        }
        PLAIN_KEY_LABEL => Ok(document),
        other => Err(OrderError::crypto(format!(
            "unsupported private key format `{other}`; expected PKCS#8"
        ))),
    }
}
