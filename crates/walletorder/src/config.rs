//! Default locations and file names used when generating orders.
//!
//! Values come from [`OrderConfig::default`], optionally replaced by a TOML
//! file ([`OrderConfig::load`]) and then by environment variables
//! ([`OrderConfig::apply_env`]). Per-call paths on
//! [`crate::OrderRequest`] win over all of them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{OrderError, Result};

pub const TEMPLATE_DIR_ENV: &str = "WALLETORDER_TEMPLATE_DIR";
pub const CERT_DIR_ENV: &str = "WALLETORDER_CERT_DIR";

/// How localization folders are copied into the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocalizationCopy {
    /// Copy the whole folder, then drop images excluded by the include set.
    /// Unclassified files stay in the bundle without a manifest entry.
    #[default]
    Bulk,
    /// Copy only the members that receive a manifest entry.
    Selective,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderConfig {
    pub template_dir: PathBuf,
    pub cert_dir: PathBuf,
    pub descriptor_name: String,
    pub signer_cert: String,
    pub signer_key: String,
    pub authority_cert: String,
    pub localization_copy: LocalizationCopy,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("./model.order"),
            cert_dir: PathBuf::from("./certs"),
            descriptor_name: crate::order::DESCRIPTOR_MEMBER.to_string(),
            signer_cert: "signerCert.pem".to_string(),
            signer_key: "signerKey.pem".to_string(),
            authority_cert: "wwdr.pem".to_string(),
            localization_copy: LocalizationCopy::Bulk,
        }
    }
}

impl OrderConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|err| OrderError::io(path, err))?;
        Self::from_toml_str(&source).map_err(|message| OrderError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    fn from_toml_str(source: &str) -> std::result::Result<Self, String> {
        let config: Self = toml::from_str(source).map_err(|err| err.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let names = [
            ("descriptor_name", &self.descriptor_name),
            ("signer_cert", &self.signer_cert),
            ("signer_key", &self.signer_key),
            ("authority_cert", &self.authority_cert),
        ];
        for (label, value) in names {
            if value.trim().is_empty() {
                return Err(format!("{label} must not be empty"));
            }
        }
        Ok(())
    }

    /// Overrides the directories from `WALLETORDER_TEMPLATE_DIR` and
    /// `WALLETORDER_CERT_DIR` when they are set and non-empty.
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(
            std::env::var_os(TEMPLATE_DIR_ENV).map(PathBuf::from),
            std::env::var_os(CERT_DIR_ENV).map(PathBuf::from),
        );
        self
    }

    fn apply_overrides(&mut self, template_dir: Option<PathBuf>, cert_dir: Option<PathBuf>) {
        if let Some(dir) = template_dir.filter(|dir| !dir.as_os_str().is_empty()) {
            self.template_dir = dir;
        }
        if let Some(dir) = cert_dir.filter(|dir| !dir.as_os_str().is_empty()) {
            self.cert_dir = dir;
        }
    }

    pub fn descriptor_path(&self, template_dir: &Path) -> PathBuf {
        template_dir.join(&self.descriptor_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_model_order_and_certs() {
        let config = OrderConfig::default();
        assert_eq!(config.template_dir, PathBuf::from("./model.order"));
        assert_eq!(config.cert_dir, PathBuf::from("./certs"));
        assert_eq!(config.authority_cert, "wwdr.pem");
        assert_eq!(config.localization_copy, LocalizationCopy::Bulk);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = OrderConfig::from_toml_str(
            "cert_dir = \"/etc/wallet/certs\"\nlocalization_copy = \"selective\"\n",
        )
        .expect("config parses");
        assert_eq!(config.cert_dir, PathBuf::from("/etc/wallet/certs"));
        assert_eq!(config.template_dir, PathBuf::from("./model.order"));
        assert_eq!(config.localization_copy, LocalizationCopy::Selective);
    }

    #[test]
    fn blank_file_names_are_rejected() {
        let err = OrderConfig::from_toml_str("signer_key = \"  \"\n").expect_err("invalid");
        assert!(err.contains("signer_key"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(OrderConfig::from_toml_str("template = \"x\"\n").is_err());
    }

    #[test]
    fn load_reads_toml_file_and_reports_missing_file() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("walletorder.toml");
        fs::write(
            &path,
            "template_dir = \"/srv/model.order\"\nsigner_key = \"key.pem\"\n",
        )
        .expect("write config");

        let config = OrderConfig::load(&path).expect("config loads");
        assert_eq!(config.template_dir, PathBuf::from("/srv/model.order"));
        assert_eq!(config.signer_key, "key.pem");
        assert_eq!(config.cert_dir, PathBuf::from("./certs"));

        fs::write(&path, "descriptor_name = \"\"\n").expect("write config");
        let err = OrderConfig::load(&path).expect_err("blank name");
        assert!(matches!(err, OrderError::Config { path: ref p, .. } if p == &path));

        let missing = temp.path().join("absent.toml");
        let err = OrderConfig::load(&missing).expect_err("missing file");
        match err {
            OrderError::NotFound { path } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_overrides_are_ignored() {
        let mut config = OrderConfig::default();
        config.apply_overrides(Some(PathBuf::new()), Some(PathBuf::from("/srv/certs")));
        assert_eq!(config.template_dir, PathBuf::from("./model.order"));
        assert_eq!(config.cert_dir, PathBuf::from("/srv/certs"));
    }
}
