//! Resource resolution against the configured resource root.
//!
//! Tools refer to files by a bare name (`ai-safety-notes.txt`,
//! `Fake_Invoice_Data.csv`). The resolver maps that name onto the resource
//! root and refuses anything that would land outside of it, whether through
//! an absolute path, a `..` component, or a symlink.

use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use super::error::ResourceError;
use crate::core::config::ResourcesConfig;

/// Resolves resource names to files under a fixed root directory.
///
/// No caching: every call hits the file system, so edits to resource files
/// are visible on the next request.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    root: PathBuf,
}

impl ResourceResolver {
    /// Create a resolver rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a resolver from the resources configuration section.
    pub fn from_config(config: &ResourcesConfig) -> Self {
        Self::new(config.base_path.clone())
    }

    /// The resource root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `name` to the canonical path of an existing file under the root.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, ResourceError> {
        if name.trim().is_empty() {
            return Err(ResourceError::invalid_name("name must not be empty"));
        }

        // Only plain relative segments are accepted
        let relative = Path::new(name);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            warn!("Rejected resource name outside the root: {}", name);
            return Err(ResourceError::access_denied(name));
        }

        let candidate = self.root.join(relative);
        if !candidate.exists() {
            debug!("Resource not found: {}", candidate.display());
            return Err(ResourceError::not_found(name));
        }

        let canonical_root = self.root.canonicalize()?;
        let canonical = candidate.canonicalize()?;

        // Symlinks are followed, but their target must stay under the root
        if !is_within_root(&canonical, &canonical_root) {
            warn!(
                "Resource {} resolves outside the root: {}",
                name,
                canonical.display()
            );
            return Err(ResourceError::access_denied(name));
        }

        if !canonical.is_file() {
            return Err(ResourceError::not_found(name));
        }

        Ok(canonical)
    }

    /// Read a resource as UTF-8 text.
    pub fn read(&self, name: &str) -> Result<String, ResourceError> {
        let path = self.resolve(name)?;
        Ok(fs::read_to_string(path)?)
    }

    /// Open a resource for streaming reads.
    pub fn open(&self, name: &str) -> Result<File, ResourceError> {
        let path = self.resolve(name)?;
        Ok(File::open(path)?)
    }
}

/// Checks if a path is within (or equal to) a root directory
fn is_within_root(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}
