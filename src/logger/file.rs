/// Optional file sink for log lines
///
/// Disabled until [`init_file_logging`] is called with a directory; every
/// formatted line is then appended to `fetcher_<date>.log` in that directory.
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use once_cell::sync::Lazy;

static LOG_FILE: Lazy<Mutex<Option<BufWriter<File>>>> = Lazy::new(|| Mutex::new(None));

/// Open (or create) the log file inside `dir`
pub fn init_file_logging(dir: &Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("fetcher_{}.log", Local::now().format("%Y%m%d")));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    if let Ok(mut slot) = LOG_FILE.lock() {
        *slot = Some(BufWriter::new(file));
    }

    Ok(path)
}

pub fn write_to_file(line: &str) {
    if let Ok(mut slot) = LOG_FILE.lock() {
        if let Some(writer) = slot.as_mut() {
            // Write failures are ignored
            let _ = writeln!(writer, "{}", line);
        }
    }
}

pub fn flush_file_logging() {
    if let Ok(mut slot) = LOG_FILE.lock() {
        if let Some(writer) = slot.as_mut() {
            let _ = writer.flush();
        }
    }
}
