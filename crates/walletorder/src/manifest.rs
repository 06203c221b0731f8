//! Manifest construction: selects template files, digests them and copies
//! their bytes into the bundle.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::bundle::{Bundle, join_member_name};
use crate::catalog::{CatalogEntry, is_included_image, list_entries};
use crate::config::LocalizationCopy;
use crate::digest::Digester;
use crate::error::{OrderError, Result};

/// Mapping of bundle-relative path to lower-case hex digest.
///
/// Serializes as a JSON object with keys in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(path, digest)| (path.as_str(), digest.as_str()))
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn insert(&mut self, path: String, digest: String) -> Option<String> {
        self.entries.insert(path, digest)
    }
}

/// Source of a manifest entry's digest.
#[derive(Debug, Clone, Copy)]
pub enum EntryValue<'a> {
    /// Digest the bytes of the file at this path.
    File(&'a Path),
    /// Digest the UTF-8 bytes of an already serialized value.
    Text(&'a str),
}

impl EntryValue<'_> {
    fn is_blank(&self) -> bool {
        match self {
            Self::File(path) => path.to_string_lossy().trim().is_empty(),
            Self::Text(text) => text.trim().is_empty(),
        }
    }
}

/// Accumulates manifest entries for a single order and copies the selected
/// files into the bundle being assembled.
pub struct ManifestBuilder<'a, D: Digester + ?Sized> {
    manifest: Manifest,
    bundle: &'a mut Bundle,
    digester: &'a D,
    localization_copy: LocalizationCopy,
}

impl<'a, D: Digester + ?Sized> ManifestBuilder<'a, D> {
    pub fn new(bundle: &'a mut Bundle, digester: &'a D) -> Self {
        Self {
            manifest: Manifest::new(),
            bundle,
            digester,
            localization_copy: LocalizationCopy::default(),
        }
    }

    pub fn with_localization_copy(mut self, mode: LocalizationCopy) -> Self {
        self.localization_copy = mode;
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn into_manifest(self) -> Manifest {
        self.manifest
    }

    /// Records `relative_path -> digest(value)`.
    ///
    /// A blank path or value is skipped with a warning rather than an error.
    pub fn add_entry(&mut self, relative_path: &str, value: EntryValue<'_>) -> Result<()> {
        if relative_path.trim().is_empty() || value.is_blank() {
            warn!(
                relative_path,
                ?value,
                "skipping manifest entry with empty path or value"
            );
            return Ok(());
        }

        let digest = match value {
            EntryValue::File(path) => {
                let bytes = fs::read(path).map_err(|err| OrderError::io(path, err))?;
                self.digester.digest(&bytes)
            }
            EntryValue::Text(text) => self.digester.digest(text.as_bytes()),
        };

        debug!(path = relative_path, digest = %digest, "manifest entry");
        if self.manifest.insert(relative_path.to_string(), digest).is_some() {
            debug!(path = relative_path, "replaced existing manifest entry");
        }
        Ok(())
    }

    /// Indexes the template root: root-level images and every `.lproj`
    /// localization folder. Other root files are left out.
    pub fn build_for_root(&mut self, root: &Path, include_set: &BTreeSet<String>) -> Result<()> {
        for entry in list_entries(root, None)? {
            if entry.is_localization() {
                self.handle_localization_folder(&entry.path, &entry.name, include_set)?;
            }

            if self.is_selected_image(&entry, include_set) {
                self.record_file(&entry.name, &entry.path)?;
            }
        }
        Ok(())
    }

    /// Adds a localization folder found at `relative_prefix` below the
    /// template root. `.strings` files and included images are indexed.
    pub fn handle_localization_folder(
        &mut self,
        folder: &Path,
        relative_prefix: &str,
        include_set: &BTreeSet<String>,
    ) -> Result<()> {
        match self.localization_copy {
            LocalizationCopy::Bulk => {
                let copied = self.bundle.add_local_folder(folder, relative_prefix)?;
                debug!(folder = relative_prefix, count = copied.len(), "copied localization folder");

                for child in list_entries(folder, None)? {
                    let key = join_member_name(relative_prefix, Path::new(&child.name));
                    if child.is_strings() || self.is_selected_image(&child, include_set) {
                        self.record_bundled(&key, &child.path)?;
                    } else if child.is_image() && self.bundle.remove(&key) {
                        debug!(member = %key, "dropped image excluded by include set");
                    }
                }
            }
            LocalizationCopy::Selective => {
                for child in list_entries(folder, None)? {
                    if child.is_strings() || self.is_selected_image(&child, include_set) {
                        let key = join_member_name(relative_prefix, Path::new(&child.name));
                        self.record_file(&key, &child.path)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn is_selected_image(&self, entry: &CatalogEntry, include_set: &BTreeSet<String>) -> bool {
        entry.is_file() && is_included_image(&entry.name, include_set, entry.extension())
    }

    /// Records the digest of a member already copied into the bundle.
    fn record_bundled(&mut self, member: &str, path: &Path) -> Result<()> {
        let digest = match self.bundle.get(member) {
            Some(bytes) => self.digester.digest(bytes),
            None => return self.record_file(member, path),
        };
        debug!(path = member, digest = %digest, "manifest entry");
        self.manifest.insert(member.to_string(), digest);
        Ok(())
    }

    /// Reads `path` once, records its digest and copies it into the bundle.
    fn record_file(&mut self, member: &str, path: &Path) -> Result<()> {
        let bytes = fs::read(path).map_err(|err| OrderError::io(path, err))?;
        let digest = self.digester.digest(&bytes);
        debug!(path = member, digest = %digest, "manifest entry");
        self.manifest.insert(member.to_string(), digest);
        self.bundle.add_file(member, bytes);
        Ok(())
    }
}
