//! Polling file follower. Watches one append-mostly file by size and inode,
//! reads new data in bounded chunks, and hands out whole lines. Partial
//! lines stay buffered until the writer finishes them.

use std::fs::{File, Metadata};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crate::events::AppEvent;

/// Upper bound on how much is read per poll, so one poll never stalls the
/// reader behind a huge burst of writes.
pub const READ_QUANTUM: usize = 64 * 1024;

#[derive(Debug, PartialEq)]
pub enum Outcome {
    NoChange,
    NewLines(Vec<String>),
    /// The file was truncated or replaced by another one. The follower is
    /// already rewound to the start.
    Truncated,
    /// The file could not be read right now. Transient, the follower keeps
    /// trying.
    Unavailable(String),
}

pub struct FileFollower {
    path: PathBuf,
    position: u64,
    pending: Vec<u8>,
    identity: Option<(u64, u64)>,
}

impl FileFollower {
    pub fn new(path: impl Into<PathBuf>) -> FileFollower {
        FileFollower::from_offset(path, 0)
    }

    /// Start following from a known offset, typically the end of what was
    /// already loaded.
    pub fn from_offset(path: impl Into<PathBuf>, offset: u64) -> FileFollower {
        let path = path.into();
        let identity = std::fs::metadata(&path)
            .ok()
            .and_then(|metadata| file_identity(&metadata));
        FileFollower {
            path,
            position: offset,
            pending: Vec::new(),
            identity,
        }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn rewind(&mut self) {
        self.position = 0;
        self.pending.clear();
    }

    pub fn poll(&mut self) -> Outcome {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(err) => return Outcome::Unavailable(err.to_string()),
        };
        // A different inode at the same path means the file was replaced.
        // The size check below misses that whenever the new file is at
        // least as big as what was already read.
        let identity = file_identity(&metadata);
        if self.identity.is_some() && identity != self.identity {
            self.identity = identity;
            self.rewind();
            return Outcome::Truncated;
        }
        self.identity = identity;
        let size = metadata.len();
        if size < self.position {
            self.rewind();
            return Outcome::Truncated;
        }
        if size == self.position {
            return Outcome::NoChange;
        }
        match self.read_chunk() {
            Ok(lines) if lines.is_empty() => Outcome::NoChange,
            Ok(lines) => Outcome::NewLines(lines),
            Err(err) => Outcome::Unavailable(err.to_string()),
        }
    }

    fn read_chunk(&mut self) -> io::Result<Vec<String>> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(self.position))?;
        let mut buffer = vec![0u8; READ_QUANTUM];
        let n = file.read(&mut buffer)?;
        self.position += n as u64;
        self.pending.extend_from_slice(&buffer[..n]);

        let mut lines = Vec::new();
        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        Ok(lines)
    }
}

/// dev/inode pair naming the file itself rather than its path. `None` where
/// the platform has no such notion; replacement then goes undetected until
/// the size shrinks.
fn file_identity(metadata: &Metadata) -> Option<(u64, u64)> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        return Some((metadata.dev(), metadata.ino()));
    }

    #[cfg(not(unix))]
    {
        let _ = metadata;
        None
    }
}

/// Read every complete line already in the file. Returns the lines and the
/// offset just past the last newline, where following should resume; an
/// unterminated tail is left for the follower.
pub fn load_existing(path: &Path) -> io::Result<(Vec<String>, u64)> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;

    let mut lines = Vec::new();
    let mut start = 0;
    let mut consumed = 0;
    for (at, byte) in buffer.iter().enumerate() {
        if *byte == b'\n' {
            let mut end = at;
            if end > start && buffer[end - 1] == b'\r' {
                end -= 1;
            }
            lines.push(String::from_utf8_lossy(&buffer[start..end]).into_owned());
            start = at + 1;
            consumed = start;
        }
    }
    Ok((lines, consumed as u64))
}

/// Follow the file on its own thread, pushing outcomes into the channel.
/// Raising `rewind` makes the next poll restart from offset 0 and announce
/// a `Reloaded` first, so the receiver can reset before the lines arrive.
pub fn start_follower_thread(
    path: PathBuf,
    offset: u64,
    poll_interval: Duration,
    rewind: Arc<AtomicBool>,
    tx: mpsc::Sender<AppEvent>,
) {
    thread::spawn(move || {
        let mut follower = FileFollower::from_offset(path, offset);
        let mut failing = false;
        loop {
            if rewind.swap(false, Ordering::Relaxed) {
                follower.rewind();
                if tx.send(AppEvent::Reloaded).is_err() {
                    return;
                }
                continue;
            }
            match follower.poll() {
                Outcome::NoChange => {
                    failing = false;
                    thread::sleep(poll_interval);
                }
                Outcome::NewLines(lines) => {
                    failing = false;
                    for line in lines {
                        if tx.send(AppEvent::Line(line)).is_err() {
                            return;
                        }
                    }
                }
                Outcome::Truncated => {
                    failing = false;
                    if tx.send(AppEvent::Truncated).is_err() {
                        return;
                    }
                }
                Outcome::Unavailable(reason) => {
                    // report once per failure streak, then keep retrying
                    if !failing {
                        failing = true;
                        if tx.send(AppEvent::FollowerError(reason)).is_err() {
                            return;
                        }
                    }
                    thread::sleep(poll_interval);
                }
            }
        }
    });
}
