//! Date-named log file writer with daily rotation and count-based retention.
//!
//! Files are named `{prefix}_{YYYY-MM-DD}.log`. The date is checked on every
//! write; when it changes a new file is opened and the oldest files beyond
//! the retention limit are deleted.

use chrono::{Local, NaiveDate};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of the current calendar date.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Rotating file writer used as the sink behind the non-blocking worker.
pub struct DailyFileAppender {
    dir: PathBuf,
    prefix: String,
    max_files: usize,
    clock: Clock,
    current: Option<(NaiveDate, File)>,
}

impl DailyFileAppender {
    /// Appender rotating on the local calendar date.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, max_files: usize) -> Self {
        Self::with_clock(dir, prefix, max_files, Arc::new(|| Local::now().date_naive()))
    }

    /// Appender driven by an arbitrary date source.
    pub fn with_clock(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        max_files: usize,
        clock: Clock,
    ) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            max_files: max_files.max(1),
            clock,
            current: None,
        }
    }

    /// Path of the log file for `date`.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        log_file_path(&self.dir, &self.prefix, date)
    }

    /// Open the file for today, creating and pruning as needed.
    fn refresh(&mut self) -> io::Result<&mut File> {
        let today = (self.clock)();
        let stale = !matches!(&self.current, Some((date, _)) if *date == today);

        if stale {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.path_for(today))?;
            self.current = Some((today, file));
            // Retention is best effort; the record still has to be written.
            if let Err(e) = self.prune() {
                eprintln!(
                    "warning: failed to prune old log files in {}: {}",
                    self.dir.display(),
                    e
                );
            }
        }

        match &mut self.current {
            Some((_, file)) => Ok(file),
            None => Err(io::Error::other("log file not open")),
        }
    }

    /// Delete the oldest dated files so at most `max_files` remain.
    ///
    /// Keeps going past files it cannot remove and reports the first failure.
    fn prune(&self) -> io::Result<()> {
        let mut dated: Vec<(NaiveDate, PathBuf)> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                let date = parse_log_date(name.to_str()?, &self.prefix)?;
                Some((date, entry.path()))
            })
            .collect();

        if dated.len() <= self.max_files {
            return Ok(());
        }

        dated.sort_by(|a, b| b.0.cmp(&a.0));
        let mut first_error = None;
        for (_, path) in dated.drain(self.max_files..) {
            if let Err(e) = fs::remove_file(&path) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl Write for DailyFileAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.refresh()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.current {
            Some((_, file)) => file.flush(),
            None => Ok(()),
        }
    }
}

/// `{dir}/{prefix}_{YYYY-MM-DD}.log`
pub fn log_file_path(dir: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}_{}.log", prefix, date.format(DATE_FORMAT)))
}

/// Extract the date from a file name produced by [`log_file_path`].
fn parse_log_date(file_name: &str, prefix: &str) -> Option<NaiveDate> {
    let date = file_name
        .strip_prefix(prefix)?
        .strip_prefix('_')?
        .strip_suffix(".log")?;
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}
