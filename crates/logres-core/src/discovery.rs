//! Locating the Logos installation and its per-user catalog databases.
//!
//! The operator points the tool at a start directory (typically a Wine
//! prefix). Discovery walks it for the application executable, takes the
//! executable's directory as the installation root, and treats the first
//! per-user data directory as the signed-in user.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// Name of the installation root directory; doubles as the path-translation
/// anchor for recorded Windows paths.
pub const INSTALL_DIR_NAME: &str = "Logos";
/// File name of the application executable searched for under the start dir.
pub const APP_EXE_NAME: &str = "Logos.exe";

/// Environment problems detected before any catalog or network activity.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("not a valid folder: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("no Logos installation (Logos/Logos.exe) under {}", .0.display())]
    AppNotFound(PathBuf),
    #[error("no signed-in user data under {}", .0.display())]
    UserNotSignedIn(PathBuf),
    #[error("missing catalog database: {}", .0.display())]
    MissingDatabase(PathBuf),
}

/// A located installation: root directory plus the signed-in user id.
#[derive(Debug, Clone)]
pub struct Installation {
    pub install_dir: PathBuf,
    pub user_id: String,
}

impl Installation {
    /// Locate the installation under `start_dir`.
    ///
    /// The walk visits directory entries in file-name order, so when several
    /// candidate executables exist the same one wins on every run.
    pub fn locate(start_dir: &Path) -> Result<Self, SetupError> {
        if !start_dir.is_dir() {
            return Err(SetupError::NotADirectory(start_dir.to_path_buf()));
        }
        let install_dir = find_install_dir(start_dir)
            .ok_or_else(|| SetupError::AppNotFound(start_dir.to_path_buf()))?;
        let user_id = signed_in_user(&install_dir)
            .ok_or_else(|| SetupError::UserNotSignedIn(install_dir.join("Data")))?;
        tracing::debug!(
            install = %install_dir.display(),
            user = %user_id,
            "located installation"
        );
        Ok(Self {
            install_dir,
            user_id,
        })
    }

    /// Per-user data directory holding the catalog databases.
    pub fn user_data_dir(&self) -> PathBuf {
        self.install_dir.join("Data").join(&self.user_id)
    }

    /// Library catalog: maps resource ids to display titles.
    pub fn catalog_db_path(&self) -> PathBuf {
        self.user_data_dir().join("LibraryCatalog").join("catalog.db")
    }

    /// Update feed: resources with a newer version available.
    pub fn updates_db_path(&self) -> PathBuf {
        self.user_data_dir().join("UpdateManager").join("Updates.db")
    }

    /// Location map: where each resource is installed inside the prefix.
    pub fn locations_db_path(&self) -> PathBuf {
        self.user_data_dir()
            .join("ResourceManager")
            .join("ResourceManager.db")
    }
}

/// Walk `start_dir` for `Logos/Logos.exe` and return the executable's
/// directory. Entries are visited in file-name order for determinism.
fn find_install_dir(start_dir: &Path) -> Option<PathBuf> {
    WalkDir::new(start_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| {
            entry.file_type().is_file()
                && entry.file_name().to_str() == Some(APP_EXE_NAME)
                && entry
                    .path()
                    .parent()
                    .and_then(Path::file_name)
                    .and_then(|n| n.to_str())
                    == Some(INSTALL_DIR_NAME)
        })
        .and_then(|entry| entry.path().parent().map(Path::to_path_buf))
}

/// First per-user directory under `Data/`, by name. The application keeps
/// one directory per signed-in account; single-account setups are the norm.
fn signed_in_user(install_dir: &Path) -> Option<String> {
    let data_dir = install_dir.join("Data");
    let mut users: Vec<String> = fs::read_dir(&data_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    users.sort();
    users.into_iter().next()
}
