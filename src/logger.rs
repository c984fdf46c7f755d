//! Per-message trading log. Not a global singleton — an owned handle
//! constructed once per process and threaded through the session and
//! every strategy's constructor. Supports a synchronous mode (write and
//! flush inline) and a dedicated-thread mode (push to a lock-free SPSC
//! ring, let the background thread own the file).
//!
//! Any `FATAL` entry sets the shared [`crate::risk::AbortLatch`] as a side
//! effect of logging it — the session loop discovers the abort on its next
//! poll rather than being notified directly.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossbeam::queue::ArrayQueue;

use crate::risk::AbortLatch;
use crate::throttle::yield_briefly;

const QUEUE_CAPACITY: usize = 8192;
const FLUSH_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            other => Err(format!("unrecognized log level: {other}")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    timestamp: chrono::DateTime<Utc>,
    level: LogLevel,
    file: &'static str,
    line: u32,
    message: String,
}

impl LogEntry {
    fn render_human(&self) -> String {
        format!(
            "{} [{}] {}:{} - {}",
            self.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
            self.level,
            self.file,
            self.line,
            self.message
        )
    }

    fn render_csv(&self) -> String {
        format!(
            "{},{},{}:{},{}",
            self.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
            self.level,
            self.file,
            self.line,
            self.message.replace(',', ";")
        )
    }
}

pub struct LoggerConfig {
    pub log_folder: PathBuf,
    pub log_prefix: String,
    pub min_level: LogLevel,
    pub print_logs: bool,
    pub csv: bool,
    pub single_threaded: bool,
}

enum Sink {
    Sync(BufWriter<File>),
    Async {
        queue: Arc<ArrayQueue<LogEntry>>,
        shutdown: Arc<AtomicBool>,
        worker: Option<JoinHandle<()>>,
    },
}

pub struct Logger {
    min_level: LogLevel,
    print_logs: bool,
    csv: bool,
    abort: AbortLatch,
    sink: Sink,
}

impl Logger {
    pub fn start(config: LoggerConfig, abort: AbortLatch) -> std::io::Result<Self> {
        std::fs::create_dir_all(&config.log_folder)?;
        let extension = if config.csv { "csv" } else { "log" };
        let path = config
            .log_folder
            .join(format!("{}.{extension}", config.log_prefix));
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let writer = BufWriter::new(file);

        let sink = if config.single_threaded {
            Sink::Sync(writer)
        } else {
            let queue = Arc::new(ArrayQueue::<LogEntry>::new(QUEUE_CAPACITY));
            let shutdown = Arc::new(AtomicBool::new(false));
            let worker = spawn_worker(writer, Arc::clone(&queue), Arc::clone(&shutdown), config.csv);
            Sink::Async {
                queue,
                shutdown,
                worker: Some(worker),
            }
        };

        Ok(Logger {
            min_level: config.min_level,
            print_logs: config.print_logs,
            csv: config.csv,
            abort,
            sink,
        })
    }

    pub fn log(&mut self, level: LogLevel, file: &'static str, line: u32, message: String) {
        if level < self.min_level {
            return;
        }

        if self.print_logs {
            eprintln!("[{level}] {file}:{line} - {message}");
        }

        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            file,
            line,
            message,
        };

        if level == LogLevel::Fatal {
            self.abort.set();
        }

        match &mut self.sink {
            Sink::Sync(writer) => {
                let rendered = if self.csv { entry.render_csv() } else { entry.render_human() };
                let _ = writeln!(writer, "{rendered}");
                if level >= LogLevel::Error {
                    let _ = writer.flush();
                }
            }
            Sink::Async { queue, .. } => {
                let mut entry = entry;
                while let Err(rejected) = queue.push(entry) {
                    entry = rejected;
                    std::hint::spin_loop();
                }
            }
        }
    }

    /// Logs a `FATAL` entry and sets the abort latch when `condition` is
    /// false. Mirrors the source's assert-and-abort helper.
    pub fn verify(&mut self, condition: bool, file: &'static str, line: u32, message: impl FnOnce() -> String) {
        if !condition {
            self.log(LogLevel::Fatal, file, line, message());
        }
    }

    pub fn stop(&mut self) {
        if let Sink::Async { shutdown, worker, .. } = &mut self.sink {
            shutdown.store(true, Ordering::SeqCst);
            if let Some(handle) = worker.take() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_worker(
    mut writer: BufWriter<File>,
    queue: Arc<ArrayQueue<LogEntry>>,
    shutdown: Arc<AtomicBool>,
    csv: bool,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name("logger".into())
        .spawn(move || {
            let mut last_flush = Instant::now();
            loop {
                let mut drained_any = false;
                while let Some(entry) = queue.pop() {
                    drained_any = true;
                    let is_fatal = entry.level == LogLevel::Fatal;
                    let rendered = if csv { entry.render_csv() } else { entry.render_human() };
                    let _ = writeln!(writer, "{rendered}");
                    if is_fatal {
                        let _ = writer.flush();
                        last_flush = Instant::now();
                    }
                }

                if last_flush.elapsed() >= FLUSH_INTERVAL {
                    let _ = writer.flush();
                    last_flush = Instant::now();
                }

                if shutdown.load(Ordering::SeqCst) && queue.is_empty() {
                    let _ = writer.flush();
                    break;
                }

                if !drained_any {
                    yield_briefly();
                }
            }
        })
        .expect("failed to spawn logger thread")
}

/// Logs at `$level` through `$logger`, formatting the message with
/// `format!` and capturing the call site.
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, $($arg:tt)*) => {
        $logger.log($level, file!(), line!(), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::logger::LogLevel::Debug, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::logger::LogLevel::Info, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::logger::LogLevel::Warn, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::logger::LogLevel::Error, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::logger::LogLevel::Fatal, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &std::path::Path, single_threaded: bool) -> LoggerConfig {
        LoggerConfig {
            log_folder: dir.to_path_buf(),
            log_prefix: "test".to_string(),
            min_level: LogLevel::Debug,
            print_logs: false,
            csv: false,
            single_threaded,
        }
    }

    #[test]
    fn sync_mode_writes_entries_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = Logger::start(config(dir.path(), true), AbortLatch::new()).unwrap();
        log_info!(logger, "hello {}", 1);
        logger.stop();

        let contents = std::fs::read_to_string(dir.path().join("test.log")).unwrap();
        assert!(contents.contains("[INFO]"));
        assert!(contents.contains("hello 1"));
    }

    #[test]
    fn fatal_entry_sets_abort_latch() {
        let dir = tempfile::tempdir().unwrap();
        let latch = AbortLatch::new();
        let mut logger = Logger::start(config(dir.path(), true), latch.clone()).unwrap();
        assert!(!latch.is_set());
        log_fatal!(logger, "venue rejected session");
        assert!(latch.is_set());
        logger.stop();
    }

    #[test]
    fn entries_below_min_level_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), true);
        config.min_level = LogLevel::Warn;
        let mut logger = Logger::start(config, AbortLatch::new()).unwrap();
        log_debug!(logger, "should not appear");
        log_warn!(logger, "should appear");
        logger.stop();

        let contents = std::fs::read_to_string(dir.path().join("test.log")).unwrap();
        assert!(!contents.contains("should not appear"));
        assert!(contents.contains("should appear"));
    }

    #[test]
    fn async_mode_drains_queue_and_flushes_on_stop() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = Logger::start(config(dir.path(), false), AbortLatch::new()).unwrap();
        for i in 0..100 {
            log_info!(logger, "entry {}", i);
        }
        logger.stop();

        let contents = std::fs::read_to_string(dir.path().join("test.log")).unwrap();
        assert!(contents.contains("entry 99"));
        assert_eq!(contents.lines().count(), 100);
    }

    #[test]
    fn verify_logs_fatal_only_when_condition_fails() {
        let dir = tempfile::tempdir().unwrap();
        let latch = AbortLatch::new();
        let mut logger = Logger::start(config(dir.path(), true), latch.clone()).unwrap();
        logger.verify(true, file!(), line!(), || "unreachable".to_string());
        assert!(!latch.is_set());
        logger.verify(false, file!(), line!(), || "invariant broke".to_string());
        assert!(latch.is_set());
        logger.stop();
    }
}
