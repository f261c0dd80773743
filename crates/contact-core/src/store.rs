//! Submission Storage
//!
//! Append-only storage for contact submissions. Records are never updated or
//! deleted; `list_all` returns them in insertion order.

use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use crate::error::{ContactError, Result};
use crate::model::{ContactSubmission, NewSubmission, SubmissionId};

/// Submission storage trait
pub trait SubmissionStore: Send + Sync {
    /// Assign an id and timestamp, append, and return the stored record
    fn create(&self, submission: NewSubmission) -> Result<ContactSubmission>;

    /// All records in insertion order
    fn list_all(&self) -> Result<Vec<ContactSubmission>>;

    /// Number of stored records
    fn count(&self) -> Result<usize> {
        self.list_all().map(|all| all.len())
    }
}

/// Stamp a new record. Called with the store's write lock held so that
/// `created_at` never goes backwards, even if the wall clock does.
fn stamp(new: NewSubmission, last: Option<&ContactSubmission>) -> ContactSubmission {
    let now = Utc::now();
    let created_at: DateTime<Utc> = last.map_or(now, |prev| now.max(prev.created_at));
    ContactSubmission::from_new(new, SubmissionId::generate(), created_at)
}

fn poisoned() -> ContactError {
    ContactError::Persistence("store lock poisoned".into())
}

/// In-memory submission store (lives as long as the process)
pub struct MemorySubmissionStore {
    submissions: RwLock<Vec<ContactSubmission>>,
}

impl Default for MemorySubmissionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySubmissionStore {
    pub const fn new() -> Self {
        Self {
            submissions: RwLock::new(Vec::new()),
        }
    }
}

impl SubmissionStore for MemorySubmissionStore {
    fn create(&self, submission: NewSubmission) -> Result<ContactSubmission> {
        let mut submissions = self.submissions.write().map_err(|_| poisoned())?;
        let record = stamp(submission, submissions.last());
        submissions.push(record.clone());
        Ok(record)
    }

    fn list_all(&self) -> Result<Vec<ContactSubmission>> {
        let submissions = self.submissions.read().map_err(|_| poisoned())?;
        Ok(submissions.clone())
    }

    fn count(&self) -> Result<usize> {
        let submissions = self.submissions.read().map_err(|_| poisoned())?;
        Ok(submissions.len())
    }
}

/// Durable store backed by a JSON-lines file
///
/// Existing records are loaded on open. Each `create` appends one line and
/// flushes before the record becomes visible to `list_all`.
pub struct JsonlSubmissionStore {
    path: PathBuf,
    inner: Mutex<JsonlState>,
}

struct JsonlState {
    file: File,
    submissions: Vec<ContactSubmission>,
}

impl JsonlSubmissionStore {
    /// Open (or create) the file at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let submissions = if path.exists() {
            load(&path)?
        } else {
            Vec::new()
        };

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| terminate_last_line(&mut file).map(|()| file))
            .map_err(|e| ContactError::Persistence(format!("{}: {e}", path.display())))?;
        file.seek(SeekFrom::End(0))
            .map_err(|e| ContactError::Persistence(format!("{}: {e}", path.display())))?;

        tracing::debug!(
            path = %path.display(),
            loaded = submissions.len(),
            "Opened submission file"
        );

        Ok(Self {
            path,
            inner: Mutex::new(JsonlState { file, submissions }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A file whose last record lacks its newline would have the next append
/// glued onto that line.
fn terminate_last_line(file: &mut File) -> io::Result<()> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(());
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        file.write_all(b"\n")?;
        file.flush()?;
    }
    Ok(())
}

/// Append-only sink that can be cut back after a failed write
trait AppendLog: Write {
    fn log_len(&self) -> io::Result<u64>;
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl AppendLog for File {
    fn log_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Write one whole line or nothing: a partial write is rolled back
fn append_line(log: &mut impl AppendLog, line: &[u8]) -> io::Result<()> {
    let len = log.log_len()?;
    match log.write_all(line).and_then(|()| log.flush()) {
        Ok(()) => Ok(()),
        Err(e) => {
            if let Err(rollback) = log.truncate_to(len) {
                tracing::error!("Failed to roll back partial record: {}", rollback);
            }
            Err(e)
        }
    }
}

fn load(path: &Path) -> Result<Vec<ContactSubmission>> {
    let file = File::open(path)
        .map_err(|e| ContactError::Persistence(format!("{}: {e}", path.display())))?;

    let mut submissions = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line
            .map_err(|e| ContactError::Persistence(format!("{}: {e}", path.display())))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ContactSubmission = serde_json::from_str(&line).map_err(|e| {
            ContactError::Persistence(format!("{}:{}: {e}", path.display(), index + 1))
        })?;
        submissions.push(record);
    }
    Ok(submissions)
}

impl SubmissionStore for JsonlSubmissionStore {
    fn create(&self, submission: NewSubmission) -> Result<ContactSubmission> {
        let mut guard = self.inner.lock().map_err(|_| poisoned())?;
        let state = &mut *guard;
        let record = stamp(submission, state.submissions.last());

        let mut line = serde_json::to_string(&record)
            .map_err(|e| ContactError::Persistence(e.to_string()))?;
        line.push('\n');

        append_line(&mut state.file, line.as_bytes())
            .map_err(|e| ContactError::Persistence(format!("{}: {e}", self.path.display())))?;

        state.submissions.push(record.clone());
        Ok(record)
    }

    fn list_all(&self) -> Result<Vec<ContactSubmission>> {
        let state = self.inner.lock().map_err(|_| poisoned())?;
        Ok(state.submissions.clone())
    }

    fn count(&self) -> Result<usize> {
        let state = self.inner.lock().map_err(|_| poisoned())?;
        Ok(state.submissions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn new_submission(name: &str) -> NewSubmission {
        NewSubmission {
            name: name.into(),
            email: format!("{}@x.com", name.to_lowercase()),
            phone: None,
            service: Some("website".into()),
            message: Some("hi".into()),
        }
    }

    #[test]
    fn test_create_then_list() {
        let store = MemorySubmissionStore::new();
        assert!(store.list_all().unwrap().is_empty());

        let before = Utc::now();
        let created = store.create(new_submission("Ann")).unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(all, vec![created.clone()]);
        assert_eq!(created.name, "Ann");
        assert_eq!(created.email, "ann@x.com");
        assert!(created.created_at >= before);
    }

    #[test]
    fn test_insertion_order_and_unique_ids() {
        let store = MemorySubmissionStore::new();
        let first = store.create(new_submission("Ann")).unwrap();
        let second = store.create(new_submission("Bob")).unwrap();

        assert_ne!(first.id, second.id);
        assert!(second.created_at >= first.created_at);

        let names: Vec<_> = store.list_all().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["Ann", "Bob"]);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_concurrent_creates() {
        let store = Arc::new(MemorySubmissionStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        store.create(new_submission(&format!("T{t}N{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 200);

        let ids: HashSet<_> = all.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), 200);
        assert!(all.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[test]
    fn test_jsonl_store_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("submissions.jsonl");

        let first = {
            let store = JsonlSubmissionStore::open(&path).unwrap();
            let first = store.create(new_submission("Ann")).unwrap();
            store.create(new_submission("Bob")).unwrap();
            first
        };

        let reopened = JsonlSubmissionStore::open(&path).unwrap();
        let all = reopened.list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], first);
        assert_eq!(all[1].name, "Bob");

        let third = reopened.create(new_submission("Cid")).unwrap();
        assert!(third.created_at >= all[1].created_at);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_jsonl_store_repairs_missing_final_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("submissions.jsonl");

        {
            let store = JsonlSubmissionStore::open(&path).unwrap();
            store.create(new_submission("Ann")).unwrap();
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, contents.trim_end()).unwrap();

        {
            let store = JsonlSubmissionStore::open(&path).unwrap();
            assert_eq!(store.count().unwrap(), 1);
            store.create(new_submission("Bob")).unwrap();
        }

        let reopened = JsonlSubmissionStore::open(&path).unwrap();
        let names: Vec<_> = reopened.list_all().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["Ann", "Bob"]);
    }

    /// Accepts `budget` bytes, then fails every write
    struct ShortLog {
        bytes: Vec<u8>,
        budget: usize,
    }

    impl Write for ShortLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::other("device full"));
            }
            let n = buf.len().min(self.budget);
            self.bytes.extend_from_slice(&buf[..n]);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl AppendLog for ShortLog {
        fn log_len(&self) -> io::Result<u64> {
            Ok(self.bytes.len() as u64)
        }

        fn truncate_to(&mut self, len: u64) -> io::Result<()> {
            self.bytes.truncate(usize::try_from(len).unwrap());
            Ok(())
        }
    }

    #[test]
    fn test_partial_append_is_rolled_back() {
        let mut log = ShortLog {
            bytes: b"{\"first\":1}\n".to_vec(),
            budget: 5,
        };

        assert!(append_line(&mut log, b"{\"second\":2}\n").is_err());
        assert_eq!(log.bytes, b"{\"first\":1}\n");

        log.budget = usize::MAX;
        append_line(&mut log, b"{\"third\":3}\n").unwrap();
        assert_eq!(log.bytes, b"{\"first\":1}\n{\"third\":3}\n");
    }

    #[test]
    fn test_jsonl_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("submissions.jsonl");
        std::fs::write(&path, "{not json}\n").unwrap();

        match JsonlSubmissionStore::open(&path) {
            Err(ContactError::Persistence(msg)) => assert!(msg.contains(":1:")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("corrupt file should not open"),
        }
    }
}
