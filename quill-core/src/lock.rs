//! Advisory run lock.
//!
//! Two overlapping reconciliation runs (a manual `quill sync` while the timer
//! fires `quill run-once`) would race on the whole-document schedule rewrite.
//! The lock scopes "one run at a time" around state load→save; the loser gets
//! [`CoreError::AlreadyRunning`] instead of corrupting state.
//!
//! PID-based: the lock file holds the owner's pid. A lock whose owner is no
//! longer alive is stale and is broken on the next acquire.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::app_dir_at;
use crate::error::{io_err, CoreError};

/// `<home>/.quill/quill.lock` — pure, no I/O.
pub fn lock_path_at(home: &Path) -> PathBuf {
    app_dir_at(home).join("quill.lock")
}

/// Held for the duration of one reconciliation run; released on drop.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Acquire the run lock under an explicit home directory.
    ///
    /// Fails with [`CoreError::AlreadyRunning`] if a live process holds it.
    pub fn acquire_at(home: &Path) -> Result<Self, CoreError> {
        let path = lock_path_at(home);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }

        if path.exists() {
            let holder = fs::read_to_string(&path)
                .ok()
                .and_then(|s| s.trim().parse::<u32>().ok());
            match holder {
                Some(pid) if is_process_alive(pid) => {
                    return Err(CoreError::AlreadyRunning { path });
                }
                // Stale (dead owner or unreadable content): break it.
                _ => {
                    let _ = fs::remove_file(&path);
                }
            }
        }

        fs::write(&path, std::process::id().to_string()).map_err(|e| io_err(&path, e))?;
        Ok(Self { path })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn is_process_alive(pid: u32) -> bool {
    #[cfg(target_os = "linux")]
    {
        Path::new(&format!("/proc/{pid}")).exists()
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("ps")
            .args(["-p", &pid.to_string()])
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        let _ = pid;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn acquire_writes_pid_and_release_removes_file() {
        let home = TempDir::new().unwrap();
        let lock = RunLock::acquire_at(home.path()).expect("acquire");
        let contents = fs::read_to_string(lock.path()).expect("read");
        assert_eq!(
            contents.trim().parse::<u32>().expect("pid"),
            std::process::id()
        );
        let path = lock.path().to_path_buf();
        drop(lock);
        assert!(!path.exists(), "lock file must be removed on drop");
    }

    #[test]
    fn second_acquire_fails_while_held() {
        let home = TempDir::new().unwrap();
        let _held = RunLock::acquire_at(home.path()).expect("acquire");
        let err = RunLock::acquire_at(home.path()).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyRunning { .. }), "got: {err}");
        assert!(err.to_string().contains("already in progress"));
    }

    #[test]
    fn stale_lock_from_dead_process_is_broken() {
        let home = TempDir::new().unwrap();
        let path = lock_path_at(home.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        // No live process has pid 0 from our perspective on Linux (/proc/0
        // does not exist) — and garbage content is equally stale.
        fs::write(&path, "not-a-pid").unwrap();
        let lock = RunLock::acquire_at(home.path()).expect("break stale lock");
        assert!(lock.path().exists());
    }
}
