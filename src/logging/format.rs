//! `timestamp | level | message` line format.

use crate::config::LOG_TIME_FORMAT;
use chrono::Local;
use std::fmt;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Formats each record as `2024-01-01 12:00:00 | INFO | message`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} | {} | ",
            Local::now().format(LOG_TIME_FORMAT),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
pub(crate) mod capture {
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// In-memory log destination shared between a subscriber and a test.
    #[derive(Clone, Default)]
    pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }

        /// Subscriber writing `LineFormat` records into this buffer.
        pub(crate) fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
            tracing_subscriber::fmt()
                .with_ansi(false)
                .with_max_level(tracing::Level::INFO)
                .with_writer(self.clone())
                .event_format(super::LineFormat)
                .finish()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::capture::CapturedLogs;
    use super::*;
    use tracing::{error, info};

    #[test]
    fn test_line_layout() {
        let captured = CapturedLogs::default();

        tracing::subscriber::with_default(captured.subscriber(), || {
            info!("User input: {}", "hello");
            error!("API call failed");
        });

        let out = captured.contents();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let parts: Vec<&str> = lines[0].splitn(3, " | ").collect();
        assert_eq!(parts.len(), 3);
        assert!(chrono::NaiveDateTime::parse_from_str(parts[0], LOG_TIME_FORMAT).is_ok());
        assert_eq!(parts[1], "INFO");
        assert_eq!(parts[2], "User input: hello");

        assert!(lines[1].contains(" | ERROR | API call failed"));
    }

    #[test]
    fn test_extra_fields_follow_message() {
        let captured = CapturedLogs::default();

        tracing::subscriber::with_default(captured.subscriber(), || {
            error!(error = "connection refused", "API call failed");
        });

        let out = captured.contents();
        assert!(out.contains("| ERROR | API call failed error=\"connection refused\""));
    }
}
