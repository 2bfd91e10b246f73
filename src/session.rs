use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::model::WeeklyMenu;

/// The last generated weekly menu, persisted as JSON between invocations.
#[derive(Debug, Clone)]
pub struct MenuSession {
    path: PathBuf,
}

impl MenuSession {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when nothing has been stored yet.
    pub fn load(&self) -> Result<Option<WeeklyMenu>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read menu session {:?}", self.path))?;
        let menu = serde_json::from_str(&contents)
            .with_context(|| format!("Menu session {:?} is not a valid weekly menu", self.path))?;
        Ok(Some(menu))
    }

    pub fn store(&self, menu: &WeeklyMenu) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create session directory {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(menu)?;
        fs::write(&self.path, json).with_context(|| format!("Failed to write menu session {:?}", self.path))?;
        debug!(path = %self.path.display(), "menu session stored");
        Ok(())
    }

    /// Returns whether there was anything to clear.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path).with_context(|| format!("Failed to remove menu session {:?}", self.path))?;
        Ok(true)
    }
}
