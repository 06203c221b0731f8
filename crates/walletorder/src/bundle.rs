//! In-memory archive that accumulates named members until it is finalized
//! into ZIP bytes.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Component, Path};

use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{OrderError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleMember {
    pub name: String,
    pub contents: Vec<u8>,
}

/// Write-only archive. Members keep their insertion order; adding a name
/// twice replaces the earlier contents in place.
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    members: Vec<BundleMember>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) {
        let name = name.into();
        let contents = contents.into();
        match self.members.iter_mut().find(|member| member.name == name) {
            Some(existing) => existing.contents = contents,
            None => self.members.push(BundleMember { name, contents }),
        }
    }

    /// Reads `path` from disk and stores it under `name`.
    pub fn add_local_file(&mut self, path: &Path, name: impl Into<String>) -> Result<()> {
        let contents = fs::read(path).map_err(|err| OrderError::io(path, err))?;
        self.add_file(name, contents);
        Ok(())
    }

    /// Copies every file below `folder` into the bundle under `prefix/`.
    /// Returns the member names that were added.
    pub fn add_local_folder(&mut self, folder: &Path, prefix: &str) -> Result<Vec<String>> {
        let mut added = Vec::new();

        for entry in WalkDir::new(folder)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|err| {
                let path = err.path().unwrap_or(folder).to_path_buf();
                match err.into_io_error() {
                    Some(source) => OrderError::io(&path, source),
                    None => OrderError::Io {
                        path,
                        source: std::io::Error::other("filesystem loop detected"),
                    },
                }
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let rel = entry.path().strip_prefix(folder).unwrap_or(entry.path());
            let name = join_member_name(prefix, rel);
            self.add_local_file(entry.path(), name.clone())?;
            debug!(member = %name, "copied localization member");
            added.push(name);
        }

        Ok(added)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|member| member.name != name);
        before != self.members.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|member| member.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.members
            .iter()
            .find(|member| member.name == name)
            .map(|member| member.contents.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|member| member.name.as_str())
    }

    pub fn members(&self) -> &[BundleMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn to_zip_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for member in &self.members {
            writer.start_file(member.name.as_str(), options)?;
            writer
                .write_all(&member.contents)
                .map_err(|err| OrderError::Zip(err.into()))?;
        }

        Ok(writer.finish()?.into_inner())
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let bytes = self.to_zip_bytes()?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| OrderError::io(parent, err))?;
        }
        fs::write(path, bytes).map_err(|err| OrderError::io(path, err))
    }
}

/// Joins a forward-slash prefix with a relative filesystem path.
pub(crate) fn join_member_name(prefix: &str, rel: &Path) -> String {
    let mut segments: Vec<String> = prefix
        .split('/')
        .filter(|seg| !seg.is_empty())
        .map(str::to_string)
        .collect();
    for component in rel.components() {
        if let Component::Normal(seg) = component {
            segments.push(seg.to_string_lossy().into_owned());
        }
    }
    segments.join("/")
}
