//! Size-rotated log file sink
//!
//! Appends formatted events to `lumen.log`. Before a write would push the
//! file past its size limit, the file is shifted to `lumen.log.1` (older
//! backups move up one slot, the oldest is dropped) and a fresh file starts.
//!
//! Plugs into `tracing-subscriber` as a [`MakeWriter`].

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

struct ActiveFile {
    file: File,
    len: u64,
}

/// Append-only log file with size-based rotation
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    active: Mutex<ActiveFile>,
}

impl RotatingFile {
    /// Open (or create) `path` for appending, creating parent directories
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = open_append(&path)?;
        let len = file.metadata()?.len();

        Ok(Self {
            path,
            max_bytes,
            backups,
            active: Mutex::new(ActiveFile { file, len }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self, slot: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{slot}"));
        PathBuf::from(name)
    }

    fn rotate(&self, active: &mut ActiveFile) -> io::Result<()> {
        active.file.flush()?;

        if self.backups == 0 {
            active.file = File::create(&self.path)?;
            active.len = 0;
            return Ok(());
        }

        for slot in (1..self.backups).rev() {
            let from = self.backup_path(slot);
            if from.exists() {
                fs::rename(&from, self.backup_path(slot + 1))?;
            }
        }
        fs::rename(&self.path, self.backup_path(1))?;

        active.file = open_append(&self.path)?;
        active.len = 0;
        Ok(())
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, ActiveFile>> {
        self.active
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Writer handed out per event by [`RotatingFile`]
pub struct RotatingWriter<'a> {
    target: &'a RotatingFile,
}

impl Write for RotatingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut active = self.target.lock()?;
        let incoming = buf.len() as u64;
        if active.len > 0 && active.len + incoming > self.target.max_bytes {
            self.target.rotate(&mut active)?;
        }
        active.file.write_all(buf)?;
        active.len += incoming;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.target.lock()?.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RotatingFile {
    type Writer = RotatingWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingWriter { target: self }
    }
}

/// Plain-text `fmt` layer writing timestamped events into `file`
pub fn file_layer<S>(file: RotatingFile) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_writer(file)
}
