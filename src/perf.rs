//! Best-effort runtime diagnostics: long tasks and heap usage.
//!
//! Nothing here affects behavior. Hosts that cannot report long tasks or
//! memory simply get no diagnostics; attach failures are logged and dropped.

use crate::config::PerfConfig;
use crate::layout::Capabilities;
use crate::page::Page;
use crate::timers::{Task, TimerId, Timers};
use crate::types::MemoryUsage;

#[derive(Debug)]
pub struct PerfMonitor {
    long_task_ms: f64,
    memory_warn_mb: u64,
    long_tasks: bool,
    memory_check: Option<TimerId>,
}

impl PerfMonitor {
    pub fn init(
        capabilities: &Capabilities,
        config: &PerfConfig,
        page: &mut impl Page,
        timers: &mut Timers,
    ) -> Self {
        let long_tasks = capabilities.performance_observer
            && match page.observe_long_tasks() {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(error = %err, "performance monitoring not available");
                    false
                }
            };
        let memory_check = page
            .memory_usage()
            .map(|_| timers.set_interval(config.memory_check_ms, Task::MemoryCheck));
        Self {
            long_task_ms: config.long_task_ms,
            memory_warn_mb: config.memory_warn_mb,
            long_tasks,
            memory_check,
        }
    }

    pub fn watching_long_tasks(&self) -> bool {
        self.long_tasks
    }

    pub fn watching_memory(&self) -> bool {
        self.memory_check.is_some()
    }

    /// Returns true if the task was long enough to report.
    pub fn long_task(&self, duration_ms: f64) -> bool {
        if duration_ms > self.long_task_ms {
            tracing::warn!(duration_ms, "long task detected");
            true
        } else {
            false
        }
    }

    /// Periodic heap check. Returns the usage when it is over the limit.
    pub fn check_memory(&self, page: &impl Page) -> Option<MemoryUsage> {
        let usage = page.memory_usage()?;
        let (used_mb, total_mb) = usage.megabytes();
        if used_mb > self.memory_warn_mb {
            tracing::warn!(used_mb, total_mb, "high memory usage");
            Some(usage)
        } else {
            None
        }
    }

    pub fn dispose(&mut self, timers: &mut Timers) {
        if let Some(id) = self.memory_check.take() {
            timers.cancel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageOp, RecordingPage};

    const MB: u64 = 1_048_576;

    #[test]
    fn unsupported_long_tasks_are_swallowed() {
        let mut page = RecordingPage::new();
        page.long_tasks_supported = false;
        let mut timers = Timers::new();
        let monitor = PerfMonitor::init(&Capabilities::default(), &PerfConfig::default(), &mut page, &mut timers);
        assert!(!monitor.watching_long_tasks());
        assert_eq!(page.ops(), &[PageOp::ObserveLongTasks { attached: false }]);
    }

    #[test]
    fn missing_performance_observer_skips_attach() {
        let mut page = RecordingPage::new();
        let mut timers = Timers::new();
        let caps = Capabilities {
            performance_observer: false,
            ..Capabilities::default()
        };
        let monitor = PerfMonitor::init(&caps, &PerfConfig::default(), &mut page, &mut timers);
        assert!(!monitor.watching_long_tasks());
        assert!(page.ops().is_empty());
    }

    #[test]
    fn long_task_threshold_is_exclusive() {
        let mut page = RecordingPage::new();
        let mut timers = Timers::new();
        let monitor = PerfMonitor::init(&Capabilities::default(), &PerfConfig::default(), &mut page, &mut timers);
        assert!(!monitor.long_task(50.0));
        assert!(monitor.long_task(50.5));
    }

    #[test]
    fn memory_check_only_with_memory_reporting() {
        let mut page = RecordingPage::new();
        let mut timers = Timers::new();
        let monitor = PerfMonitor::init(&Capabilities::default(), &PerfConfig::default(), &mut page, &mut timers);
        assert!(!monitor.watching_memory());
        assert_eq!(timers.pending(), 0);

        page.memory = Some(MemoryUsage {
            used_bytes: 10 * MB,
            total_bytes: 20 * MB,
        });
        let mut monitor = PerfMonitor::init(&Capabilities::default(), &PerfConfig::default(), &mut page, &mut timers);
        assert!(monitor.watching_memory());
        assert_eq!(timers.next_due(), Some(30_000));
        monitor.dispose(&mut timers);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn warns_above_limit() {
        let mut page = RecordingPage::new();
        let mut timers = Timers::new();
        page.memory = Some(MemoryUsage {
            used_bytes: 50 * MB,
            total_bytes: 80 * MB,
        });
        let monitor = PerfMonitor::init(&Capabilities::default(), &PerfConfig::default(), &mut page, &mut timers);
        assert_eq!(monitor.check_memory(&page), None);

        page.memory = Some(MemoryUsage {
            used_bytes: 51 * MB,
            total_bytes: 80 * MB,
        });
        assert!(monitor.check_memory(&page).is_some());
    }
}
