use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory lock held next to a data file while it is read-modify-written.
///
/// Uses flock (Unix) so two `hab` processes never interleave writes to the
/// same habit store. The lock is released when the file handle closes; the
/// lock file itself stays in place, since every writer must flock the same
/// inode.
pub struct StoreLock {
    _file: File,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("timed out waiting for {path}")]
    Timeout { path: PathBuf },
}

impl LockError {
    pub fn path(&self) -> &Path {
        match self {
            LockError::CreateError { path, .. } | LockError::Timeout { path } => path,
        }
    }
}

impl StoreLock {
    /// Lock `<data_file>.lock`, waiting up to `timeout`.
    pub fn acquire(data_file: &Path, timeout: Duration) -> Result<Self, LockError> {
        let lock_path = lock_path_for(data_file);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| LockError::CreateError {
                path: lock_path.clone(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => {
                    return Ok(StoreLock { _file: file });
                }
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => return Err(LockError::Timeout { path: lock_path }),
            }
        }
    }

    /// Acquire with the default timeout (5 seconds)
    pub fn acquire_default(data_file: &Path) -> Result<Self, LockError> {
        Self::acquire(data_file, Duration::from_secs(5))
    }
}

fn lock_path_for(data_file: &Path) -> PathBuf {
    let mut name = data_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    data_file.with_file_name(name)
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lock_file_sits_next_to_data_file() {
        let path = lock_path_for(Path::new("/tmp/x/habits.json"));
        assert_eq!(path, PathBuf::from("/tmp/x/habits.json.lock"));
    }

    #[test]
    fn acquire_and_release() {
        let tmp = TempDir::new().unwrap();
        let data = tmp.path().join("habits.json");

        let lock = StoreLock::acquire_default(&data);
        assert!(lock.is_ok());
        drop(lock);
        assert!(tmp.path().join("habits.json.lock").exists());

        assert!(StoreLock::acquire_default(&data).is_ok());
    }

    #[test]
    fn contention_times_out() {
        let tmp = TempDir::new().unwrap();
        let data = tmp.path().join("habits.json");

        let _held = StoreLock::acquire_default(&data).unwrap();
        let second = StoreLock::acquire(&data, Duration::from_millis(50));
        assert!(matches!(second, Err(LockError::Timeout { .. })));
    }
}
