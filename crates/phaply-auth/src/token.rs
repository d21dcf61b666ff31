// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token persistence.
//!
//! The token file is the only client-side persisted state: a single file
//! named `token` under the phaply config directory (overridable via
//! `auth.token_path`).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use phaply_core::PhaplyError;
use secrecy::{ExposeSecret, SecretString};

/// Default location: `<config dir>/phaply/token`.
pub fn default_token_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("phaply")
        .join("token")
}

/// Reads the stored token, if any. A missing or empty file is `None`.
pub fn load(path: &Path) -> Result<Option<SecretString>, PhaplyError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let trimmed = contents.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string().into()))
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PhaplyError::Internal(format!(
            "failed to read token file {}: {e}",
            path.display()
        ))),
    }
}

/// Writes the token, creating the parent directory if needed.
pub fn store(path: &Path, token: &SecretString) -> Result<(), PhaplyError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            PhaplyError::Internal(format!(
                "failed to create token directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    std::fs::write(path, token.expose_secret()).map_err(|e| {
        PhaplyError::Internal(format!(
            "failed to write token file {}: {e}",
            path.display()
        ))
    })?;

    // The token grants full account access; keep it owner-readable only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms).map_err(|e| {
            PhaplyError::Internal(format!(
                "failed to restrict token file permissions {}: {e}",
                path.display()
            ))
        })?;
    }

    Ok(())
}

/// Removes the stored token. Removing an absent file is not an error.
pub fn clear(path: &Path) -> Result<(), PhaplyError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PhaplyError::Internal(format!(
            "failed to remove token file {}: {e}",
            path.display()
        ))),
    }
}
