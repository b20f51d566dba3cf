//! Artifact persistence.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::io::config::validate_logical_name;

pub trait ArtifactStore {
    /// Write `content` under `logical_name`, replacing any previous version.
    fn persist(&self, content: &str, logical_name: &str) -> Result<()>;
}

impl<T: ArtifactStore + ?Sized> ArtifactStore for &T {
    fn persist(&self, content: &str, logical_name: &str) -> Result<()> {
        (**self).persist(content, logical_name)
    }
}

/// Store rooted at a directory; logical names are relative paths inside it.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, logical_name: &str) -> Result<PathBuf> {
        validate_logical_name(logical_name)?;
        Ok(self.root.join(logical_name))
    }
}

impl ArtifactStore for FsArtifactStore {
    #[instrument(skip_all, fields(logical_name))]
    fn persist(&self, content: &str, logical_name: &str) -> Result<()> {
        let path = self.path_for(logical_name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create artifact dir {}", parent.display()))?;
        }
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("write temp artifact {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("replace artifact {}", path.display()))?;
        debug!(path = %path.display(), bytes = content.len(), "persisted artifact");
        Ok(())
    }
}
