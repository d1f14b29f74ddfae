//! JSONL file writer for feed turns.
//!
//! Each appended [`Turn`] is serialized as a single JSON line tagged with
//! `"type": "turn"` and the wall-clock time it was written.

use roundtable_application::ports::transcript_sink::TranscriptSink;
use roundtable_domain::Turn;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Transcript sink that appends one JSON object per turn.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlTranscriptSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlTranscriptSink {
    /// Open (or create) the transcript at `path` in append mode.
    ///
    /// Creates parent directories as needed. Returns `None` if the file
    /// cannot be opened; a missing transcript never stops a round.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create transcript directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open transcript file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TranscriptSink for JsonlTranscriptSink {
    fn record(&self, turn: &Turn) {
        let written_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut record = match serde_json::to_value(turn) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) => return,
            Err(e) => {
                warn!("Could not serialize turn for transcript: {}", e);
                return;
            }
        };
        record.insert("type".to_string(), "turn".into());
        record.insert("written_at".to_string(), written_at.into());

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            // Append-only; flush per line so a crash loses at most one turn
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlTranscriptSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
