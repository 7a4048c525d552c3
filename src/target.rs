//! Validation of the local download directory.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// The download target cannot be used.
#[derive(Debug, Error)]
pub enum TargetError {
    /// Nothing exists at the path.
    #[error("target download path {} does not exist", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The path exists but is not a directory.
    #[error("{} is not a directory", path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The user lacks read and/or write permission.
    #[error("user lacks {missing} permission for {}", path.display())]
    PermissionDenied {
        /// The offending path.
        path: PathBuf,
        /// `read`, `write`, or `read and write`.
        missing: &'static str,
    },

    /// The path could not be inspected.
    #[error("error validating target path {}: {source}", path.display())]
    Io {
        /// The inspected path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Ensures `path` is an existing directory the current user can read and write.
///
/// # Errors
///
/// Returns a [`TargetError`] describing the first failed check.
pub fn verify_target(path: &Path) -> Result<(), TargetError> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(TargetError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(TargetError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.is_dir() {
        return Err(TargetError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    let (readable, writable) = access(path, &metadata)?;
    let missing = match (readable, writable) {
        (true, true) => {
            debug!(path = %path.display(), "target verified");
            return Ok(());
        }
        (false, false) => "read and write",
        (false, true) => "read",
        (true, false) => "write",
    };
    Err(TargetError::PermissionDenied {
        path: path.to_path_buf(),
        missing,
    })
}

#[cfg(unix)]
fn access(path: &Path, _metadata: &std::fs::Metadata) -> Result<(bool, bool), TargetError> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|e| TargetError::Io {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, e),
    })?;

    // SAFETY: c_path is a valid NUL-terminated string; access() only reads it.
    let (readable, writable) = unsafe {
        (
            libc::access(c_path.as_ptr(), libc::R_OK) == 0,
            libc::access(c_path.as_ptr(), libc::W_OK) == 0,
        )
    };
    Ok((readable, writable))
}

#[cfg(not(unix))]
fn access(_path: &Path, metadata: &std::fs::Metadata) -> Result<(bool, bool), TargetError> {
    Ok((true, !metadata.permissions().readonly()))
}
