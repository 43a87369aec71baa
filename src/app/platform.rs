// Author: Dustin Pilgrim
// License: MIT

use std::io;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

// ---------------- single-instance lock ----------------

pub fn lock_path() -> PathBuf {
    crate::ipc::runtime_dir().join("chatimer").join("chatimer.lock")
}

/// Holds the lock for as long as the returned listener lives. A lock file
/// nobody answers on is stale and gets replaced.
pub fn acquire_single_instance_lock(path: &Path) -> Result<UnixListener, String> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match UnixListener::bind(path) {
        Ok(l) => Ok(l),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => match UnixStream::connect(path) {
            Ok(_) => Err(format!(
                "chatimer is already running (another instance holds {})",
                path.display()
            )),
            Err(_) => {
                let _ = std::fs::remove_file(path);
                UnixListener::bind(path)
                    .map_err(|e| format!("failed to bind instance lock {}: {e}", path.display()))
            }
        },
        Err(e) => Err(format!("failed to bind instance lock {}: {e}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_instance_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatimer.lock");

        let held = acquire_single_instance_lock(&path).unwrap();
        let err = acquire_single_instance_lock(&path).unwrap_err();
        assert!(err.contains("already running"));
        drop(held);
    }

    #[test]
    fn stale_lock_is_taken_over() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatimer.lock");

        // Dropping the listener leaves the socket file behind.
        drop(acquire_single_instance_lock(&path).unwrap());
        assert!(path.exists());

        assert!(acquire_single_instance_lock(&path).is_ok());
    }
}
