//! Assembly of a signed order bundle.
//!
//! A bundle holds the serialized descriptor, the selected images and
//! localization folders of the template, the manifest of their digests and
//! a detached signature over that manifest. Every call to
//! [`OrderGenerator::generate_order`] works on its own manifest and bundle.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::bundle::Bundle;
use crate::config::OrderConfig;
use crate::digest::{Digester, Sha256Digester};
use crate::error::{OrderError, Result};
use crate::manifest::{EntryValue, ManifestBuilder};
use crate::signing::{CmsSigner, CredentialFiles, ManifestSigner};

pub const DESCRIPTOR_MEMBER: &str = "order.json";
pub const MANIFEST_MEMBER: &str = "manifest.json";
pub const SIGNATURE_MEMBER: &str = "signature";

/// Per-call options. Unset directories fall back to the generator's
/// [`OrderConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderRequest {
    /// Image file names to bundle; empty bundles every image found.
    pub include_images: BTreeSet<String>,
    pub template_dir: Option<PathBuf>,
    pub cert_dir: Option<PathBuf>,
}

impl OrderRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_images<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_images = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    pub fn cert_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cert_dir = Some(dir.into());
        self
    }
}

fn read_descriptor(path: &Path) -> Result<Value> {
    let source = fs::read(path).map_err(|err| OrderError::io(path, err))?;
    serde_json::from_slice(&source).map_err(|source| OrderError::Descriptor {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone)]
pub struct OrderGenerator<D = Sha256Digester> {
    config: OrderConfig,
    digester: D,
}

impl OrderGenerator<Sha256Digester> {
    pub fn new(config: OrderConfig) -> Self {
        Self::with_digester(config, Sha256Digester)
    }
}

impl Default for OrderGenerator<Sha256Digester> {
    fn default() -> Self {
        Self::new(OrderConfig::default())
    }
}

impl<D: Digester> OrderGenerator<D> {
    pub fn with_digester(config: OrderConfig, digester: D) -> Self {
        Self { config, digester }
    }

    pub fn config(&self) -> &OrderConfig {
        &self.config
    }

    pub fn template_dir(&self, request: &OrderRequest) -> PathBuf {
        request
            .template_dir
            .clone()
            .unwrap_or_else(|| self.config.template_dir.clone())
    }

    pub fn cert_dir(&self, request: &OrderRequest) -> PathBuf {
        request
            .cert_dir
            .clone()
            .unwrap_or_else(|| self.config.cert_dir.clone())
    }

    /// Reads the template's descriptor using the configured file name.
    pub fn load_descriptor(&self, request: &OrderRequest) -> Result<Value> {
        read_descriptor(&self.config.descriptor_path(&self.template_dir(request)))
    }

    /// Builds a bundle signed with the PEM credentials of the certificate
    /// directory. The signer key is decrypted with `passphrase`.
    ///
    /// Credentials are only read once the manifest is complete, so template
    /// errors are reported before certificate errors.
    pub fn generate_order(
        &self,
        descriptor: &Value,
        passphrase: &str,
        request: &OrderRequest,
    ) -> Result<Bundle> {
        let cert_dir = self.cert_dir(request);
        let files = CredentialFiles::from(&self.config);

        self.assemble(descriptor, request, |manifest| {
            info!(cert_dir = %cert_dir.display(), "loading signing credentials");
            CmsSigner::from_dir(&cert_dir, passphrase, &files)?.sign(manifest)
        })
    }

    /// Builds a bundle signed by a caller supplied signer.
    pub fn generate_order_with_signer<S: ManifestSigner + ?Sized>(
        &self,
        descriptor: &Value,
        signer: &S,
        request: &OrderRequest,
    ) -> Result<Bundle> {
        self.assemble(descriptor, request, |manifest| signer.sign(manifest))
    }

    fn assemble<F>(&self, descriptor: &Value, request: &OrderRequest, sign: F) -> Result<Bundle>
    where
        F: FnOnce(&[u8]) -> Result<Vec<u8>>,
    {
        let template_dir = self.template_dir(request);
        let descriptor_member = self.config.descriptor_name.as_str();

        info!(
            template_dir = %template_dir.display(),
            include_images = request.include_images.len(),
            localization_copy = ?self.config.localization_copy,
            "generating order"
        );

        let mut bundle = Bundle::new();

        let descriptor_json = serde_json::to_string(descriptor)?;
        bundle.add_file(descriptor_member, descriptor_json.clone().into_bytes());

        let mut builder = ManifestBuilder::new(&mut bundle, &self.digester)
            .with_localization_copy(self.config.localization_copy);
        builder.build_for_root(&template_dir, &request.include_images)?;
        builder.add_entry(descriptor_member, EntryValue::Text(&descriptor_json))?;
        let manifest = builder.into_manifest();

        let manifest_bytes = manifest.to_json_bytes()?;
        info!(entries = manifest.len(), "built manifest");
        bundle.add_file(MANIFEST_MEMBER, manifest_bytes.clone());

        let signature = sign(&manifest_bytes)?;
        info!(len = signature.len(), "signed manifest");
        bundle.add_file(SIGNATURE_MEMBER, signature);

        Ok(bundle)
    }
}
