//! Process-wide store configuration.

use std::path::PathBuf;

/// Configuration injected into both stores at construction.
///
/// `autosave` is the single durability switch: on, every mutation rewrites
/// the affected backing file; off, the filesystem is never touched.
/// Individual operations cannot override it.
#[derive(Debug, Clone)]
pub struct ClinicConfig {
    pub autosave: bool,
    pub data_dir: PathBuf,
}

impl ClinicConfig {
    pub fn new(autosave: bool, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            autosave,
            data_dir: data_dir.into(),
        }
    }

    /// The single table file holding all patients.
    pub fn patients_file(&self) -> PathBuf {
        self.data_dir.join("patients.json")
    }

    /// Directory of per-patient note files, named by health number.
    pub fn records_dir(&self) -> PathBuf {
        self.data_dir.join("records")
    }

    /// Line-oriented `username,digest` credential file.
    pub fn users_file(&self) -> PathBuf {
        self.data_dir.join("users.txt")
    }
}
