//! File storage for profiles.
//!
//! Synchronous, like the rest of the profile pipeline: one file per
//! profile, description always equal to the file stem.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::PROFILE_EXTENSION;
use crate::error::ProfileError;
use crate::profile::Profile;

impl Profile {
    /// Load and parse a profile file, deriving the description from the
    /// file stem.
    ///
    /// # Errors
    ///
    /// Propagates read failures and `.asv` format errors.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let text =
            fs::read_to_string(path).map_err(|e| ProfileError::io("read", path, e))?;
        let description = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("profile")
            .to_string();
        let mut profile = Self::parse(description, &text)?;
        profile.path = Some(path.to_path_buf());
        debug!(path = %path.display(), model = profile.model_name(), "loaded profile");
        Ok(profile)
    }

    /// Write the profile to its backing file.
    ///
    /// # Errors
    ///
    /// Fails with [`ProfileError::Unsaved`] when the profile has never
    /// been persisted; use [`Profile::save_in`] first.
    pub fn save(&self) -> Result<(), ProfileError> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| ProfileError::Unsaved(self.description.clone()))?;
        self.write_to(path)
    }

    /// Persist the profile into `dir` as `<description>.asv` and bind it
    /// to that file.
    pub fn save_in(&mut self, dir: &Path) -> Result<(), ProfileError> {
        let path = dir.join(format!("{}.{PROFILE_EXTENSION}", self.description));
        self.write_to(&path)?;
        self.path = Some(path);
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<(), ProfileError> {
        let mut contents = self.serialize().join("\n");
        contents.push('\n');
        fs::write(path, contents).map_err(|e| ProfileError::io("write", path, e))?;
        debug!(path = %path.display(), "saved profile");
        Ok(())
    }

    /// Rename the profile, moving the backing file within its directory
    /// and keeping the original extension. A profile that was never saved
    /// just takes the new description.
    ///
    /// # Errors
    ///
    /// A failed filesystem rename leaves both the file and the in-memory
    /// description untouched.
    pub fn rename(&mut self, new_name: &str) -> Result<(), ProfileError> {
        if let Some(path) = &self.path {
            let new_path = match path.extension().and_then(|e| e.to_str()) {
                Some(ext) => path.with_file_name(format!("{new_name}.{ext}")),
                None => path.with_file_name(new_name),
            };
            fs::rename(path, &new_path)
                .map_err(|e| ProfileError::io("rename", path.clone(), e))?;
            debug!(from = %path.display(), to = %new_path.display(), "renamed profile");
            self.path = Some(new_path);
        }
        self.description = new_name.to_string();
        Ok(())
    }

    /// Delete the backing file. A no-op for profiles that were never
    /// persisted.
    ///
    /// # Errors
    ///
    /// A failed delete leaves the profile still bound to its file.
    pub fn remove(&mut self) -> Result<(), ProfileError> {
        if let Some(path) = &self.path {
            fs::remove_file(path).map_err(|e| ProfileError::io("remove", path.clone(), e))?;
            debug!(path = %path.display(), "removed profile");
            self.path = None;
        }
        Ok(())
    }
}

/// Result of scanning a profile directory.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Successfully loaded profiles, sorted by description.
    pub profiles: Vec<Profile>,
    /// Files that exist but failed to load, with their errors. A malformed
    /// profile never aborts the scan.
    pub failures: Vec<(PathBuf, ProfileError)>,
}

/// Load every `.asv` profile in `dir`.
///
/// # Errors
///
/// Fails only when the directory itself cannot be read; per-file problems
/// are collected in [`ScanOutcome::failures`].
pub fn scan_dir(dir: &Path) -> Result<ScanOutcome, ProfileError> {
    let entries = fs::read_dir(dir).map_err(|e| ProfileError::io("scan", dir, e))?;

    let mut outcome = ScanOutcome::default();
    for entry in entries {
        let entry = entry.map_err(|e| ProfileError::io("scan", dir, e))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(PROFILE_EXTENSION) {
            continue;
        }
        match Profile::load(&path) {
            Ok(profile) => outcome.profiles.push(profile),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable profile");
                outcome.failures.push((path, err));
            }
        }
    }

    outcome
        .profiles
        .sort_by(|a, b| a.description().cmp(b.description()));
    Ok(outcome)
}
