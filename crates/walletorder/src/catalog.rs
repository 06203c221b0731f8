//! Directory listing and classification of template entries.
//!
//! Listings are non-recursive and sorted by name so that a template always
//! yields the same bundle layout.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{OrderError, Result};

pub const IMAGE_EXTENSION: &str = "png";
pub const STRINGS_EXTENSION: &str = "strings";
pub const LOCALIZATION_EXTENSION: &str = "lproj";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl CatalogEntry {
    /// Case-sensitive suffix after the last `.` of the entry name.
    pub fn extension(&self) -> Option<&str> {
        extension_of(&self.name)
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_image(&self) -> bool {
        self.is_file() && self.extension() == Some(IMAGE_EXTENSION)
    }

    pub fn is_strings(&self) -> bool {
        self.is_file() && self.extension() == Some(STRINGS_EXTENSION)
    }

    pub fn is_localization(&self) -> bool {
        self.is_dir() && self.extension() == Some(LOCALIZATION_EXTENSION)
    }
}

pub fn extension_of(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Lists the immediate children of `root`.
///
/// With a non-blank `extension_filter` only regular files carrying that
/// extension are returned. Without one, files and directories alike.
pub fn list_entries(root: &Path, extension_filter: Option<&str>) -> Result<Vec<CatalogEntry>> {
    let filter = extension_filter
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let read_dir = fs::read_dir(root).map_err(|err| OrderError::io(root, err))?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|err| OrderError::io(root, err))?;
        let path = entry.path();

        // Follows symlinks so a linked image is classified as a file.
        let metadata = fs::metadata(&path).map_err(|err| OrderError::io(&path, err))?;
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(path = %path.display(), "skipping entry with non UTF-8 name");
            continue;
        };

        let entry = CatalogEntry { name, path, kind };

        if let Some(ext) = filter
            && !(entry.is_file() && entry.extension() == Some(ext))
        {
            continue;
        }

        entries.push(entry);
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Names of the png files directly under `root`.
pub fn list_images(root: &Path) -> Result<Vec<String>> {
    Ok(list_entries(root, Some(IMAGE_EXTENSION))?
        .into_iter()
        .map(|entry| entry.name)
        .collect())
}

/// An image is bundled when it is a png and either no include set was given
/// or the set names it.
pub fn is_included_image(
    file_name: &str,
    include_set: &BTreeSet<String>,
    extension: Option<&str>,
) -> bool {
    extension == Some(IMAGE_EXTENSION)
        && (include_set.is_empty() || include_set.contains(file_name))
}
