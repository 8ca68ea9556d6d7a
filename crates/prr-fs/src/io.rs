//! Atomic I/O operations with file locking

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;

use crate::{Error, Result};

/// Tuning for locked writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// How long to keep retrying a contended lock before giving up.
    pub lock_timeout: Duration,
    /// Whether to fsync the temporary file before renaming it into place.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(10),
            enable_fsync: true,
        }
    }
}

/// Path of the sidecar lock file guarding `target`.
///
/// The lock file is created next to the target on first use and is never
/// removed.
pub fn lock_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    target.with_file_name(name)
}

/// Exclusive advisory lock on a sidecar `<file>.lock`.
///
/// The lock is released when the guard is dropped. The target itself is
/// never locked directly because it gets replaced by rename while held.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    target: PathBuf,
}

impl FileLock {
    /// Acquire the lock for `target`, retrying with exponential backoff
    /// until `timeout` elapses.
    ///
    /// A symlinked target is resolved first, so the lock and the later
    /// rename apply to the real file.
    pub fn acquire(target: &Path, timeout: Duration) -> Result<Self> {
        let target = resolve_target(target)?;
        let path = lock_path(&target);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(10))
            .with_max_interval(Duration::from_millis(250))
            .with_max_elapsed_time(Some(timeout))
            .build();

        backoff::retry(policy, || {
            FileExt::try_lock_exclusive(&file).map_err(backoff::Error::transient)
        })
        .map_err(|_| Error::LockFailed {
            path: target.clone(),
        })?;

        tracing::debug!(path = %target.display(), "Acquired exclusive lock");
        Ok(Self { file, target })
    }

    /// The file this lock guards, with symlinks resolved.
    pub fn target(&self) -> &Path {
        &self.target
    }
}

/// Follow `path` to the real file when it is a symlink.
fn resolve_target(path: &Path) -> Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).map_err(|e| Error::io(path, e))
        }
        _ => Ok(path.to_path_buf()),
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock to prevent concurrent access.
pub fn write_atomic(path: &Path, content: &[u8], config: RobustnessConfig) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let lock = FileLock::acquire(path, config.lock_timeout)?;
    write_locked(&lock, content, config)
}

/// Replace the file guarded by `lock` with `content`.
///
/// The caller already holds the lock, so a read-modify-write sequence can
/// keep it across the read and the write. The replacement takes over the
/// permissions of the file it replaces; a new file is private to its owner
/// on unix.
pub fn write_locked(lock: &FileLock, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let native_path = lock.target();

    // Temp file in same directory so the rename stays on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let result = write_temp(&temp_path, content, config.enable_fsync)
        .and_then(|()| copy_permissions(native_path, &temp_path))
        .and_then(|()| fs::rename(&temp_path, native_path).map_err(|e| Error::io(native_path, e)));

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_temp(temp_path: &Path, content: &[u8], fsync: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut temp_file = options
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    if fsync {
        temp_file
            .sync_all()
            .map_err(|e| Error::io(temp_path, e))?;
    }
    Ok(())
}

/// Give `temp_path` the permissions of `target`, if `target` exists.
fn copy_permissions(target: &Path, temp_path: &Path) -> Result<()> {
    match fs::metadata(target) {
        Ok(meta) => {
            fs::set_permissions(temp_path, meta.permissions()).map_err(|e| Error::io(temp_path, e))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(target, e)),
    }
}

/// Create `path` and any missing parents, accessible to the owner only
/// on unix.
pub fn create_private_dir(path: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path).map_err(|e| Error::io(path, e))
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Read text content from a file, treating a missing file as empty.
pub fn read_text_or_empty(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(Error::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_path_appends_suffix() {
        let path = lock_path(Path::new("/profile/pgprules.xml"));
        assert_eq!(path, PathBuf::from("/profile/pgprules.xml.lock"));
    }

    #[test]
    fn test_default_robustness() {
        let config = RobustnessConfig::default();
        assert_eq!(config.lock_timeout, Duration::from_secs(10));
        assert!(config.enable_fsync);
    }
}
