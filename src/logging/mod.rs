//! Process-wide logging setup.
//!
//! Log records go to a single date-named file under the log directory,
//! delivered by a background worker so the chat loop never waits on disk.
//! Nothing is ever written to the console from here.

pub mod appender;
pub mod format;

use crate::config::Config;
use appender::DailyFileAppender;
use format::LineFormat;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{Directive, EnvFilter};
use tracing_subscriber::layer::Layered;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, Layer, Registry};

/// Startup failures. None of these are recoverable.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to create directory {}: {}", .path.display(), .source)]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to install global subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("failed to replace log sink: {0}")]
    Reload(#[from] reload::Error),
}

type Filtered = Layered<EnvFilter, Registry>;
type SinkLayer = Box<dyn Layer<Filtered> + Send + Sync>;

/// Owner of the swappable file sink.
///
/// The subscriber returned by [`Logging::new`] holds a reload slot; each call
/// to [`Logging::attach`] puts a fresh sink in that slot, replacing whatever
/// was there, so there is never more than one file layer active.
pub struct Logging {
    handle: reload::Handle<Option<SinkLayer>, Filtered>,
    guard: Option<WorkerGuard>,
}

impl Logging {
    /// Create the subscriber with an empty sink slot.
    pub fn new() -> (Self, impl tracing::Subscriber + Send + Sync + 'static) {
        let (slot, handle) = reload::Layer::new(None);
        let subscriber = Registry::default().with(level_filter()).with(slot);
        (
            Self {
                handle,
                guard: None,
            },
            subscriber,
        )
    }

    /// Attach the file sink described by `config`, replacing any previous one.
    pub fn attach(&mut self, config: &Config) -> Result<(), SetupError> {
        let appender = DailyFileAppender::new(
            &config.log_dir,
            &config.log_file_prefix,
            config.max_log_files,
        );
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let sink = fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .event_format(LineFormat)
            .boxed();

        self.handle.reload(Some(sink))?;
        // Dropping the old guard flushes the replaced sink's queue.
        self.guard = Some(guard);
        Ok(())
    }

    /// Remove the file sink and block until its queued records are on disk.
    pub fn detach(&mut self) -> Result<(), SetupError> {
        let swapped = self.handle.reload(None);
        self.guard = None;
        swapped.map_err(SetupError::from)
    }
}

static LOGGING: Mutex<Option<Logging>> = Mutex::new(None);

/// Create the log and output directories if they don't exist yet.
pub fn ensure_directories(config: &Config) -> Result<(), SetupError> {
    for dir in config.required_dirs() {
        fs::create_dir_all(dir).map_err(|source| SetupError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    debug!(
        "Directories {} and {} ensured.",
        config.log_dir.display(),
        config.output_dir.display()
    );
    Ok(())
}

/// Point the process-wide logger at the daily log file.
///
/// The first call installs the global subscriber. Later calls swap the sink
/// in place.
pub fn configure_logging(config: &Config) -> Result<(), SetupError> {
    {
        let mut slot = LOGGING.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.is_none() {
            let (logging, subscriber) = Logging::new();
            tracing::subscriber::set_global_default(subscriber)?;
            *slot = Some(logging);
        }
        if let Some(logging) = slot.as_mut() {
            logging.attach(config)?;
        }
    }

    info!("Logging configured.");
    Ok(())
}

/// Flush and detach the process-wide sink.
///
/// Statics are never dropped, so this must run before the process exits or
/// the last records may still be sitting in the worker queue.
pub fn shutdown() -> Result<(), SetupError> {
    let mut slot = LOGGING.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    match slot.as_mut() {
        Some(logging) => logging.detach(),
        None => Ok(()),
    }
}

/// INFO and above; HTTP internals are kept out of the chat log.
fn level_filter() -> EnvFilter {
    let mut filter = EnvFilter::new("info");
    for directive in ["hyper=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tracing::{debug, error};

    fn read_logs(dir: &Path) -> String {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "log"))
            .collect();
        paths.sort();
        paths
            .iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .collect()
    }

    #[test]
    fn test_ensure_directories_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let config = Config::with_data_root(root.path().join("data"));

        ensure_directories(&config).unwrap();
        ensure_directories(&config).unwrap();

        assert!(config.log_dir.is_dir());
        assert!(config.output_dir.is_dir());
    }

    #[test]
    fn test_ensure_directories_reports_path() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("data");
        fs::write(&blocker, "not a directory").unwrap();
        let config = Config::with_data_root(&blocker);

        let err = ensure_directories(&config).unwrap_err();
        match err {
            SetupError::Directory { path, .. } => assert_eq!(path, config.log_dir),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_file_name_and_format() {
        let root = tempfile::tempdir().unwrap();
        let config = Config::with_data_root(root.path());
        ensure_directories(&config).unwrap();

        let (mut logging, subscriber) = Logging::new();
        tracing::subscriber::with_default(subscriber, || {
            logging.attach(&config).unwrap();
            info!("AI response: Hello!");
            debug!("below threshold");
        });
        drop(logging);

        let today = chrono::Local::now().date_naive();
        let expected = format!("chat_{}.log", today.format("%Y-%m-%d"));
        assert!(config.log_dir.join(&expected).exists());

        let logs = read_logs(&config.log_dir);
        assert!(logs.contains(" | INFO | AI response: Hello!"));
        assert!(!logs.contains("below threshold"));
    }

    #[test]
    fn test_attach_twice_does_not_duplicate() {
        let root = tempfile::tempdir().unwrap();
        let config = Config::with_data_root(root.path());
        ensure_directories(&config).unwrap();

        let (mut logging, subscriber) = Logging::new();
        tracing::subscriber::with_default(subscriber, || {
            logging.attach(&config).unwrap();
            logging.attach(&config).unwrap();
            info!("single event");
            error!("single failure");
        });
        drop(logging);

        let logs = read_logs(&config.log_dir);
        assert_eq!(logs.matches("single event").count(), 1);
        assert_eq!(logs.matches("single failure").count(), 1);
    }

    #[test]
    fn test_detach_flushes_last_record() {
        let root = tempfile::tempdir().unwrap();
        let config = Config::with_data_root(root.path());
        ensure_directories(&config).unwrap();

        let (mut logging, subscriber) = Logging::new();
        tracing::subscriber::with_default(subscriber, || {
            logging.attach(&config).unwrap();
            info!("User requested to exit the chat.");
            logging.detach().unwrap();
            info!("after detach");
        });

        // Read before `logging` is dropped: detach alone must have flushed.
        let logs = read_logs(&config.log_dir);
        assert!(logs.contains("| INFO | User requested to exit the chat."));
        assert!(!logs.contains("after detach"));
        drop(logging);
    }

    // The only test that touches the global subscriber; everything else
    // uses scoped dispatchers, which take precedence on their own threads.
    #[test]
    fn test_configure_logging_twice_then_shutdown() {
        let root = tempfile::tempdir().unwrap();
        let config = Config::with_data_root(root.path());
        ensure_directories(&config).unwrap();

        configure_logging(&config).unwrap();
        configure_logging(&config).unwrap();
        info!("global sink marker");
        shutdown().unwrap();

        let logs = read_logs(&config.log_dir);
        assert_eq!(logs.matches("| INFO | Logging configured.").count(), 2);
        assert_eq!(logs.matches("global sink marker").count(), 1);

        info!("after shutdown marker");
        assert!(!read_logs(&config.log_dir).contains("after shutdown marker"));
    }
}
