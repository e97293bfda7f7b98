use std::fs;
use std::path::{Path, PathBuf};

use showcase_core::{Showcase, ShowcaseContext, ShowcaseSnapshot};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("could not read session file `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not write session file `{path}`: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("session file `{path}` is not a valid snapshot: {source}")]
    Decode { path: PathBuf, source: serde_json::Error },
    #[error("session snapshot could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("session file `{path}` cannot be resumed: {source}")]
    Resume { path: PathBuf, source: showcase_core::NavigationError },
}

impl SessionStoreError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Read { .. } | Self::Write { .. } => "session_io",
            Self::Decode { .. } | Self::Encode(_) => "session_decode",
            Self::Resume { .. } => "invalid_argument",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Resume { .. } => 3,
            _ => 5,
        }
    }
}

pub fn load(path: &Path) -> Result<ShowcaseContext<Showcase>, SessionStoreError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| SessionStoreError::Read { path: path.to_path_buf(), source })?;
    let snapshot = serde_json::from_str::<ShowcaseSnapshot<Showcase>>(&raw)
        .map_err(|source| SessionStoreError::Decode { path: path.to_path_buf(), source })?;
    ShowcaseContext::try_from(snapshot)
        .map_err(|source| SessionStoreError::Resume { path: path.to_path_buf(), source })
}

pub fn save(path: &Path, context: &ShowcaseContext<Showcase>) -> Result<(), SessionStoreError> {
    let encoded =
        serde_json::to_string_pretty(&context.snapshot()).map_err(SessionStoreError::Encode)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| SessionStoreError::Write { path: path.to_path_buf(), source })?;
    }
    fs::write(path, encoded)
        .map_err(|source| SessionStoreError::Write { path: path.to_path_buf(), source })
}
