//! Free space on the file system holding a path.

use std::io;
use std::path::Path;

/// Source of free-space figures for a local path.
pub trait DiskSpace: Send + Sync {
    /// Bytes available to the current user on the file system containing `path`.
    ///
    /// # Errors
    ///
    /// Returns the OS error when the file system cannot be queried.
    fn available_bytes(&self, path: &Path) -> io::Result<u64>;
}

/// Queries the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDiskSpace;

impl DiskSpace for SystemDiskSpace {
    fn available_bytes(&self, path: &Path) -> io::Result<u64> {
        available_space(path)
    }
}

/// Returns the bytes available to unprivileged users on the file system
/// containing `path`.
///
/// # Errors
///
/// Returns the OS error when `path` does not exist or cannot be queried.
#[cfg(unix)]
pub fn available_space(path: &Path) -> io::Result<u64> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    // SAFETY: c_path is a valid NUL-terminated string, `stat` is zeroed
    // before the call and only read after statvfs reports success.
    unsafe {
        let mut stat: libc::statvfs = std::mem::zeroed();
        if libc::statvfs(c_path.as_ptr(), &mut stat) != 0 {
            return Err(io::Error::last_os_error());
        }
        // f_bavail counts blocks available to unprivileged users, in f_frsize units.
        #[allow(clippy::unnecessary_cast)]
        let available = (stat.f_bavail as u64).saturating_mul(stat.f_frsize as u64);
        Ok(available)
    }
}

/// Returns the bytes available to the caller on the volume containing `path`.
///
/// # Errors
///
/// Returns the OS error when `path` does not exist or cannot be queried.
#[cfg(windows)]
pub fn available_space(path: &Path) -> io::Result<u64> {
    use std::os::windows::ffi::OsStrExt;
    use winapi::um::fileapi::GetDiskFreeSpaceExW;

    let wide_path: Vec<u16> = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    let mut available: u64 = 0;
    let mut total: u64 = 0;
    let mut total_free: u64 = 0;

    // SAFETY: wide_path is NUL-terminated and every out pointer refers to a
    // live, aligned u64 that is only read after the call succeeds.
    let ok = unsafe {
        GetDiskFreeSpaceExW(
            wide_path.as_ptr(),
            (&raw mut available).cast(),
            (&raw mut total).cast(),
            (&raw mut total_free).cast(),
        )
    };
    if ok == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(available)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_available_space_for_temp_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let available = SystemDiskSpace.available_bytes(dir.path());
        assert!(available.is_ok(), "statvfs failed: {available:?}");
    }

    #[test]
    fn test_available_space_missing_path_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(available_space(&missing).is_err());
    }
}
