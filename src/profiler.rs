//! RAII timing guard. Disabled by default — constructing a guard through
//! [`Profiler::measure`] is a no-op unless the profiler was started with
//! profiling enabled, so instrumented call sites cost nothing in normal
//! operation.

use quanta::Clock;

use crate::logger::{LogLevel, Logger};

#[derive(Clone)]
pub struct Profiler {
    enabled: bool,
    clock: Clock,
}

impl Profiler {
    pub fn new(enabled: bool) -> Self {
        Profiler {
            enabled,
            clock: Clock::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Starts timing `name`. The returned guard logs the elapsed time
    /// through `logger` on drop; when profiling is disabled the guard
    /// carries no start time and does nothing on drop.
    pub fn measure<'a>(&self, name: &'static str, logger: &'a mut Logger) -> ProfileGuard<'a> {
        ProfileGuard {
            name,
            start: self.enabled.then(|| self.clock.now()),
            logger,
        }
    }
}

pub struct ProfileGuard<'a> {
    name: &'static str,
    start: Option<quanta::Instant>,
    logger: &'a mut Logger,
}

impl Drop for ProfileGuard<'_> {
    fn drop(&mut self) {
        if let Some(start) = self.start {
            let elapsed = start.elapsed();
            self.logger.log(
                LogLevel::Debug,
                file!(),
                line!(),
                format!("[PROFILER] {} took {} ns", self.name, elapsed.as_nanos()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LoggerConfig;
    use crate::risk::AbortLatch;

    fn logger(dir: &std::path::Path) -> Logger {
        Logger::start(
            LoggerConfig {
                log_folder: dir.to_path_buf(),
                log_prefix: "profiler_test".to_string(),
                min_level: LogLevel::Debug,
                print_logs: false,
                csv: false,
                single_threaded: true,
            },
            AbortLatch::new(),
        )
        .unwrap()
    }

    #[test]
    fn disabled_profiler_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = logger(dir.path());
        let profiler = Profiler::new(false);
        {
            let _guard = profiler.measure("noop", &mut log);
        }
        log.stop();
        let contents = std::fs::read_to_string(dir.path().join("profiler_test.log")).unwrap();
        assert!(contents.is_empty());
    }

    #[test]
    fn enabled_profiler_logs_elapsed_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = logger(dir.path());
        let profiler = Profiler::new(true);
        {
            let _guard = profiler.measure("work", &mut log);
        }
        log.stop();
        let contents = std::fs::read_to_string(dir.path().join("profiler_test.log")).unwrap();
        assert!(contents.contains("[PROFILER] work took"));
    }
}
