use crate::step::{Step, StepGraph};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[cfg(unix)]
use std::os::unix::io::AsRawFd;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error on line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },
    #[error("Lock error: {0}")]
    Lock(String),
}

/// RAII guard for file locks - automatically releases lock on drop
struct FileLock {
    #[cfg(unix)]
    file: File,
}

impl FileLock {
    /// Acquire an exclusive lock on a lock file
    #[cfg(unix)]
    fn acquire<P: AsRef<Path>>(lock_path: P) -> Result<Self, ParseError> {
        // Ensure the .stepgraph directory exists
        if let Some(parent) = lock_path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        // Acquire exclusive lock (LOCK_EX) - blocks until available
        let fd = file.as_raw_fd();
        let ret = unsafe { libc::flock(fd, libc::LOCK_EX) };

        if ret != 0 {
            return Err(ParseError::Lock(format!(
                "Failed to acquire lock on {:?}: {}",
                lock_path.as_ref(),
                std::io::Error::last_os_error()
            )));
        }

        Ok(FileLock { file })
    }

    #[cfg(not(unix))]
    fn acquire<P: AsRef<Path>>(_lock_path: P) -> Result<Self, ParseError> {
        // No flock outside Unix; stepgraph is primarily for Unix systems
        Ok(FileLock {})
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            // Release the lock (LOCK_UN) - best effort, ignore errors on drop
            let fd = self.file.as_raw_fd();
            unsafe {
                libc::flock(fd, libc::LOCK_UN);
            }
        }
    }
}

/// Get the lock file path for a given steps file
fn get_lock_path<P: AsRef<Path>>(steps_path: P) -> PathBuf {
    let steps_path = steps_path.as_ref();
    if let Some(parent) = steps_path.parent() {
        parent.join("steps.lock")
    } else {
        PathBuf::from("steps.lock")
    }
}

/// Load steps from a JSONL file (one step per line).
/// Uses advisory file locking to prevent concurrent access corruption.
pub fn load_steps<P: AsRef<Path>>(path: P) -> Result<StepGraph, ParseError> {
    let lock_path = get_lock_path(&path);
    let _lock = FileLock::acquire(&lock_path)?;

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut graph = StepGraph::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let step: Step = serde_json::from_str(trimmed).map_err(|e| ParseError::Json {
            line: line_num + 1,
            source: e,
        })?;
        if graph.contains(&step.id) {
            warn!(
                id = %step.id,
                line = line_num + 1,
                "duplicate step id, overwriting previous definition"
            );
        }
        graph.add_step(step);
    }

    Ok(graph)
    // Lock is automatically released when _lock goes out of scope
}

/// Save steps to a JSONL file.
/// Uses advisory file locking and atomic write (temp file + rename) to
/// prevent data loss on crash.
pub fn save_steps<P: AsRef<Path>>(graph: &StepGraph, path: P) -> Result<(), ParseError> {
    let path = path.as_ref();
    let lock_path = get_lock_path(path);
    let _lock = FileLock::acquire(&lock_path)?;

    // Write to a temporary file in the same directory, then atomically
    // rename, so a crash mid-write leaves the original file intact.
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(".steps.tmp.{}", std::process::id()));

    let result = (|| -> Result<(), ParseError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;

        for step in graph.steps() {
            let line = serde_json::to_string(step).map_err(|e| ParseError::Json {
                line: 0,
                source: e,
            })?;
            writeln!(file, "{}", line)?;
        }

        file.sync_all()?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        // Best effort cleanup of the temp file
        let _ = std::fs::remove_file(&tmp_path);
    }

    result
}
