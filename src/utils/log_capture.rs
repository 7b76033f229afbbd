//! In-memory `log` sink for tests.
//!
//! The logger is process-global, so records are tagged with the thread that
//! emitted them. Tests on a current-thread runtime only see their own records.

use std::sync::{Mutex, Once};
use std::thread::{self, ThreadId};

use log::{Level, Log, Metadata, Record};

#[derive(Debug, Clone)]
pub(crate) struct Captured {
    pub level: Level,
    pub message: String,
}

struct CaptureLogger {
    records: Mutex<Vec<(ThreadId, Captured)>>,
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};
static INSTALL: Once = Once::new();

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let captured = Captured {
            level: record.level(),
            message: record.args().to_string(),
        };
        self.records
            .lock()
            .unwrap()
            .push((thread::current().id(), captured));
    }

    fn flush(&self) {}
}

/// Handle over the records emitted by the current thread.
pub(crate) struct LogCapture {
    thread: ThreadId,
}

impl LogCapture {
    /// Install the logger if needed and forget earlier records of this thread.
    pub(crate) fn start() -> Self {
        INSTALL.call_once(|| {
            log::set_logger(&LOGGER).unwrap();
            log::set_max_level(log::LevelFilter::Trace);
        });
        let thread = thread::current().id();
        LOGGER.records.lock().unwrap().retain(|(t, _)| *t != thread);
        Self { thread }
    }

    pub(crate) fn at(&self, level: Level) -> Vec<String> {
        LOGGER
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, r)| *t == self.thread && r.level == level)
            .map(|(_, r)| r.message.clone())
            .collect()
    }
}
