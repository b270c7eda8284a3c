//! JSON-lines reading sink
//!
//! Appends one JSON object per reading, stamped with the arrival time.
//! `(timestamp, table)` is the natural key, so replays of the same telegram
//! within one second collapse to the same key downstream.
//!
//! Connection tasks must never wait on the disk, so the sink is:
//! - a bounded queue (non-blocking `try_send`)
//! - a dedicated writer thread that appends and flushes each line

use crate::constants::JSONL_QUEUE_CAPACITY;
use crate::dispatch::ReadingSink;
use crate::error::{GatewayError, Result};
use crate::telegram::StoredReading;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use tracing::{error, warn};

#[derive(Serialize)]
struct Record<'a> {
    timestamp: i64,
    datetime: String,
    table: String,
    #[serde(flatten)]
    reading: &'a StoredReading,
}

pub struct JsonLinesSink {
    path: PathBuf,
    sender: Option<SyncSender<String>>,
    worker: Option<JoinHandle<()>>,
}

impl JsonLinesSink {
    /// Open `path` for appending, creating parent directories as needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let map_err = |e| GatewayError::Io {
            path: path.clone(),
            source: e,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(map_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(map_err)?;

        let (tx, rx) = sync_channel::<String>(JSONL_QUEUE_CAPACITY);
        let worker_path = path.clone();
        let worker = thread::Builder::new()
            .name("telegram-gateway-jsonl".to_string())
            .spawn(move || run_writer(rx, file, worker_path))
            .map_err(|e| map_err(io::Error::other(e.to_string())))?;

        Ok(Self {
            path,
            sender: Some(tx),
            worker: Some(worker),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReadingSink for JsonLinesSink {
    fn submit(&self, reading: StoredReading) {
        let now = chrono::Local::now();
        let record = Record {
            timestamp: now.timestamp(),
            datetime: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            table: reading.table_name(),
            reading: &reading,
        };
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize reading: {}", e);
                return;
            }
        };

        let Some(sender) = &self.sender else {
            return;
        };
        match sender.try_send(line) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(path = %self.path.display(), "Writer queue full, dropping reading");
            }
            Err(TrySendError::Disconnected(_)) => {
                error!(path = %self.path.display(), "Writer thread gone, dropping reading");
            }
        }
    }
}

impl Drop for JsonLinesSink {
    fn drop(&mut self) {
        // Closing the queue lets the writer drain it and exit
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_writer(rx: Receiver<String>, file: File, path: PathBuf) {
    let mut writer = BufWriter::new(file);
    while let Ok(line) = rx.recv() {
        if let Err(e) = write_line(&mut writer, &line) {
            error!(path = %path.display(), "Failed to write reading: {}", e);
        }
    }
}

fn write_line(writer: &mut BufWriter<File>, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}
