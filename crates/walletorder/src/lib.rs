#![forbid(unsafe_code)]

pub mod bundle;
pub mod catalog;
pub mod config;
pub mod digest;
pub mod error;
pub mod manifest;
pub mod order;
pub mod signing;
pub mod telemetry;

pub use bundle::Bundle;
pub use catalog::{CatalogEntry, EntryKind, is_included_image, list_entries, list_images};
pub use config::{LocalizationCopy, OrderConfig};
pub use digest::{Digester, Sha256Digester, sha256_hex};
pub use error::{OrderError, Result};
pub use manifest::{EntryValue, Manifest, ManifestBuilder};
pub use order::{
    DESCRIPTOR_MEMBER, MANIFEST_MEMBER, OrderGenerator, OrderRequest, SIGNATURE_MEMBER,
};
pub use signing::{CmsSigner, ManifestSigner, SigningCredentials};
