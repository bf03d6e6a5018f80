//! Persisted CPU baseline, one slot per (host, identity).
//!
//! The baseline is a cache, not a ledger: a lost update only widens the next
//! measurement window. Correctness under concurrent invocations relies
//! solely on replacing the file with an atomic rename, so readers see either
//! the old or the new line and never a partial one.

use super::sample::{CpuSample, CPU_ROW_MARKER};
use std::collections::HashMap;
use std::fmt;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::SystemTime;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// File name prefix of per-identity state files.
pub const STATE_FILE_PREFIX: &str = "hostfacts-cpu";

/// Mode applied to state files so any local user may refresh the baseline.
#[cfg(unix)]
pub const STATE_FILE_MODE: u32 = 0o666;

/// The invoking user, used to namespace the baseline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identity of the current process (its effective uid on unix).
    pub fn current() -> Self {
        #[cfg(unix)]
        {
            Self(nix::unistd::geteuid().as_raw().to_string())
        }

        #[cfg(not(unix))]
        {
            debug!("No user identity on this platform, using fallback");
            Self::fallback()
        }
    }

    /// Identity used when no lookup is possible.
    pub fn fallback() -> Self {
        Self("0".to_string())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted sample and the time it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredSample {
    pub sample: CpuSample,
    pub stored_at: SystemTime,
}

/// Errors from persisting a baseline.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to prepare state directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to replace state file {path}: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Key-value store holding the last sample per identity.
pub trait SampleStore {
    /// Load the baseline for `identity`. Missing, unreadable or malformed
    /// state is `None`.
    fn load(&self, identity: &Identity) -> Option<StoredSample>;

    /// Replace the baseline for `identity`.
    fn store(&self, identity: &Identity, sample: &CpuSample) -> Result<(), StateError>;
}

/// Parse the single-line state file format.
///
/// Missing trailing counters are zero. A wrong or absent marker makes the
/// whole file unusable.
pub fn parse_state(content: &str) -> Option<CpuSample> {
    let line = content.lines().next()?;
    let mut sample = CpuSample::parse_row(line)?;
    // Only the eight persisted counters are meaningful here
    sample.guest = 0;
    sample.guest_nice = 0;
    Some(sample)
}

/// State files in a directory, named `hostfacts-cpu.<identity>`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Location of the state file for `identity`.
    pub fn path_for(&self, identity: &Identity) -> PathBuf {
        self.dir.join(format!("{}.{}", STATE_FILE_PREFIX, identity))
    }
}

impl SampleStore for FileStore {
    fn load(&self, identity: &Identity) -> Option<StoredSample> {
        let path = self.path_for(identity);

        // Read content and mtime through one handle so both describe the same file
        let mut file = match std::fs::File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No CPU state file");
                return None;
            }
        };

        let stored_at = match file.metadata().and_then(|m| m.modified()) {
            Ok(time) => time,
            Err(e) => {
                debug!(
                    path = %path.display(),
                    error = %e,
                    "CPU state file has no modification time"
                );
                return None;
            }
        };

        let mut content = String::new();
        if let Err(e) = file.read_to_string(&mut content) {
            debug!(path = %path.display(), error = %e, "Failed to read CPU state file");
            return None;
        }

        match parse_state(&content) {
            Some(sample) => Some(StoredSample { sample, stored_at }),
            None => {
                debug!(
                    path = %path.display(),
                    expected_marker = CPU_ROW_MARKER,
                    "Ignoring malformed CPU state file"
                );
                None
            }
        }
    }

    fn store(&self, identity: &Identity, sample: &CpuSample) -> Result<(), StateError> {
        let path = self.path_for(identity);

        std::fs::create_dir_all(&self.dir).map_err(|source| StateError::Directory {
            path: self.dir.clone(),
            source,
        })?;

        // Temp file in the same directory so the rename stays on one filesystem
        let mut temp = NamedTempFile::new_in(&self.dir).map_err(|source| StateError::Write {
            path: self.dir.clone(),
            source,
        })?;

        temp.write_all(sample.to_state_line().as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|source| StateError::Write {
                path: temp.path().to_path_buf(),
                source,
            })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(STATE_FILE_MODE);
            if let Err(e) = temp.as_file().set_permissions(perms) {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to set CPU state file permissions"
                );
            }
        }

        temp.persist(&path).map_err(|e| StateError::Replace {
            path: path.clone(),
            source: e.error,
        })?;

        debug!(path = %path.display(), sample = %sample, "Stored CPU baseline");
        Ok(())
    }
}

/// In-memory store, for tests and callers that must not touch the disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<Identity, StoredSample>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry with an explicit timestamp.
    pub fn insert(&self, identity: &Identity, sample: CpuSample, stored_at: SystemTime) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(identity.clone(), StoredSample { sample, stored_at });
        }
    }

    pub fn get(&self, identity: &Identity) -> Option<StoredSample> {
        self.entries.lock().ok()?.get(identity).copied()
    }
}

impl SampleStore for MemoryStore {
    fn load(&self, identity: &Identity) -> Option<StoredSample> {
        self.get(identity)
    }

    fn store(&self, identity: &Identity, sample: &CpuSample) -> Result<(), StateError> {
        self.insert(identity, *sample, SystemTime::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn sample(user: u64, idle: u64) -> CpuSample {
        CpuSample {
            user,
            nice: 1,
            system: 2,
            idle,
            iowait: 3,
            irq: 4,
            softirq: 5,
            steal: 6,
            ..Default::default()
        }
    }

    #[test]
    fn test_path_is_namespaced_by_identity() {
        let store = FileStore::new("/var/tmp");
        assert_eq!(
            store.path_for(&Identity::new("1000")),
            PathBuf::from("/var/tmp/hostfacts-cpu.1000")
        );
        assert_ne!(
            store.path_for(&Identity::new("1000")),
            store.path_for(&Identity::new("1001"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_current_identity_is_effective_uid() {
        let euid = nix::unistd::geteuid().as_raw().to_string();
        assert_eq!(Identity::current(), Identity::new(euid));
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let id = Identity::new("1000");
        let s = sample(100, 850);

        store.store(&id, &s).unwrap();
        let loaded = store.load(&id).unwrap();
        assert_eq!(loaded.sample, s);

        let on_disk = std::fs::read_to_string(store.path_for(&id)).unwrap();
        assert_eq!(on_disk, "cpu 100 1 2 850 3 4 5 6\n");
    }

    #[test]
    fn test_store_creates_directory() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("state"));
        let id = Identity::new("0");

        store.store(&id, &sample(1, 2)).unwrap();
        assert!(store.path_for(&id).exists());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let id = Identity::new("0");

        for i in 0..5 {
            store.store(&id, &sample(i, i)).unwrap();
        }

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_state_file_is_world_writable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let id = Identity::new("0");
        store.store(&id, &sample(1, 2)).unwrap();

        let mode = std::fs::metadata(store.path_for(&id)).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, STATE_FILE_MODE);
    }

    #[test]
    fn test_malformed_state_is_ignored() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let id = Identity::new("0");

        std::fs::write(store.path_for(&id), "").unwrap();
        assert!(store.load(&id).is_none());

        std::fs::write(store.path_for(&id), "garbage 1 2 3\n").unwrap();
        assert!(store.load(&id).is_none());
    }

    #[test]
    fn test_short_state_defaults_missing_counters() {
        let parsed = parse_state("cpu 10 0 5 100\n").unwrap();
        assert_eq!(parsed.user, 10);
        assert_eq!(parsed.idle, 100);
        assert_eq!(parsed.steal, 0);
    }

    #[test]
    fn test_concurrent_reader_never_sees_partial_file() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        let id = Identity::new("0");
        store.store(&id, &sample(0, 0)).unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let writer = {
            let store = Arc::clone(&store);
            let id = id.clone();
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                for i in 1..=300 {
                    store.store(&id, &sample(i, i * 10)).unwrap();
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        while !done.load(Ordering::SeqCst) {
            let loaded = store.load(&id).expect("state file must always be complete");
            assert_eq!(loaded.sample.idle, loaded.sample.user * 10);
            assert_eq!(loaded.sample.steal, 6);
        }

        writer.join().unwrap();
        assert_eq!(store.load(&id).unwrap().sample.user, 300);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        let id = Identity::new("42");
        assert!(store.load(&id).is_none());

        store.store(&id, &sample(7, 8)).unwrap();
        assert_eq!(store.load(&id).unwrap().sample, sample(7, 8));
        assert!(store.load(&Identity::new("43")).is_none());
    }
}
