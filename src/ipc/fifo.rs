//! Named-pipe [`CommandSource`] implementation.
//!
//! A running switcher owns a FIFO; later invocations of `hyprtabs next`
//! (bound to Alt+Tab) write one word per line into it.
//!
//! # Wire format
//!
//! ```text
//! next
//! prev
//! activate
//! close
//! ```
//!
//! Any other line is ignored.  The pipe is opened non-blocking and polled,
//! so clearing the running flag stops the listener within one poll
//! interval even when no writer ever shows up.

use crate::command::UiEvent;
use crate::traits::CommandSource;
use log::{debug, error, info};
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use std::io::{ErrorKind, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

/// Default interval between polls of an idle pipe.
pub const DEFAULT_POLL: Duration = Duration::from_millis(50);

/// Errors produced by the FIFO transport.
#[derive(Debug, thiserror::Error)]
pub enum FifoError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("mkfifo {path}: {errno}")]
    Mkfifo { path: PathBuf, errno: nix::errno::Errno },
    #[error("no switcher is reading {0}")]
    NoReader(PathBuf),
}

/// Create a fresh FIFO at `path`, replacing whatever was there.
pub fn create(path: impl AsRef<Path>) -> Result<(), FifoError> {
    let path = path.as_ref();
    match std::fs::remove_file(path) {
        Ok(()) => debug!("removed stale {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(source) => {
            return Err(FifoError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }
    nix::unistd::mkfifo(path, Mode::from_bits_truncate(0o666)).map_err(|errno| FifoError::Mkfifo {
        path: path.to_path_buf(),
        errno,
    })
}

/// Remove the FIFO at `path`, ignoring a missing file.
pub fn remove(path: impl AsRef<Path>) {
    let path = path.as_ref();
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != ErrorKind::NotFound {
            error!("failed to remove {}: {}", path.display(), e);
        }
    }
}

/// Write `event` to the switcher reading `path`.
///
/// Fails with [`FifoError::NoReader`] instead of blocking when nobody has
/// the pipe open.
pub fn send(path: impl AsRef<Path>, event: UiEvent) -> Result<(), FifoError> {
    let path = path.as_ref();
    let io_err = |source: std::io::Error| FifoError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut pipe = std::fs::OpenOptions::new()
        .write(true)
        .custom_flags(OFlag::O_NONBLOCK.bits())
        .open(path)
        .map_err(|e| match e.raw_os_error() {
            Some(code) if code == nix::libc::ENXIO => FifoError::NoReader(path.to_path_buf()),
            _ => io_err(e),
        })?;
    writeln!(pipe, "{}", event).map_err(io_err)?;
    debug!("sent {} to {}", event, path.display());
    Ok(())
}

/// A [`CommandSource`] that reads newline-delimited commands from a FIFO.
pub struct FifoListener {
    path: PathBuf,
    running: Arc<AtomicBool>,
    poll: Duration,
}

impl FifoListener {
    /// Listen on `path` for as long as `running` stays set.
    ///
    /// The FIFO itself is made with [`create`]; the listener waits for it to
    /// appear if it does not exist yet.
    pub fn new(path: impl AsRef<Path>, running: Arc<AtomicBool>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            running,
            poll: DEFAULT_POLL,
        }
    }

    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    /// The filesystem path of the pipe.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Option<std::fs::File> {
        while self.running.load(Ordering::SeqCst) {
            match std::fs::OpenOptions::new()
                .read(true)
                .custom_flags(OFlag::O_NONBLOCK.bits())
                .open(&self.path)
            {
                Ok(pipe) => return Some(pipe),
                Err(e) => {
                    debug!("waiting for {}: {}", self.path.display(), e);
                    std::thread::sleep(self.poll);
                }
            }
        }
        None
    }
}

impl CommandSource for FifoListener {
    type Error = FifoError;

    /// Poll the pipe until the running flag is cleared or the sink closes.
    ///
    /// This method **blocks**.  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::SyncSender<UiEvent>) -> Result<(), Self::Error> {
        let Some(mut pipe) = self.open() else {
            return Ok(());
        };
        info!("listening on {}", self.path.display());

        let mut pending: Vec<u8> = Vec::new();
        let mut buf = [0u8; 256];
        while self.running.load(Ordering::SeqCst) {
            match pipe.read(&mut buf) {
                // Every writer hung up (or none connected yet).  An
                // unterminated tail is the writer's last line.
                Ok(0) => {
                    if !pending.is_empty() {
                        let line = std::mem::take(&mut pending);
                        if !forward(&line, &sink) {
                            return Ok(());
                        }
                    }
                    std::thread::sleep(self.poll);
                }
                Ok(n) => {
                    pending.extend_from_slice(&buf[..n]);
                    while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
                        let line: Vec<u8> = pending.drain(..=pos).collect();
                        if !forward(&line, &sink) {
                            return Ok(());
                        }
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => std::thread::sleep(self.poll),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(FifoError::Io {
                        path: self.path.clone(),
                        source,
                    })
                }
            }
        }
        info!("fifo listener stopped");
        Ok(())
    }
}

/// Parse one raw line and pass it on.  False once the sink is gone.
fn forward(line: &[u8], sink: &mpsc::SyncSender<UiEvent>) -> bool {
    let text = String::from_utf8_lossy(line);
    match UiEvent::parse_line(&text) {
        Some(event) => {
            debug!("received {}", event);
            if sink.send(event).is_err() {
                info!("sink closed, shutting down");
                return false;
            }
        }
        None if text.trim().is_empty() => {}
        None => debug!("ignoring {:?}", text.trim()),
    }
    true
}

//  Tests
