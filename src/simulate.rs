//! Scripted sessions: replay timed events against a [`RecordingPage`].
//!
//! A script is a JSON file describing the page structure, the host's
//! capabilities, and a list of events with virtual timestamps:
//!
//! ```json
//! {
//!   "steps": [
//!     {"at": 100, "event": {"type": "category_selected", "category": "abstract"}},
//!     {"at": 250, "event": {"type": "gallery_item_clicked", "index": 0}},
//!     {"at": 900, "event": {"type": "key", "key": "escape"}}
//!   ],
//!   "until": 6000
//! }
//! ```
//!
//! Between steps the virtual clock advances and every timer that comes due
//! runs in deadline order. Each timer and each event becomes one
//! [`ReportEntry`] carrying the page operations it caused, so the report
//! reads as a timeline of what the visitor would have seen.

use crate::config::SiteConfig;
use crate::event::Event;
use crate::layout::PageLayout;
use crate::page::{PageOp, RecordingPage};
use crate::portfolio::{Portfolio, PortfolioError, PortfolioState};
use crate::types::{MemoryUsage, Millis};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid script: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),
    #[error("step at {at}ms comes after a step at {previous}ms")]
    OutOfOrder { at: Millis, previous: Millis },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Script {
    pub layout: PageLayout,
    pub environment: Environment,
    pub steps: Vec<Step>,
    /// Keep the clock running to this time after the last step.
    pub until: Option<Millis>,
    /// Dispose the portfolio at the end of the session.
    pub dispose: bool,
}

/// What the simulated host can do.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Environment {
    pub long_tasks_supported: bool,
    pub memory: Option<MemoryUsage>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            long_tasks_supported: true,
            memory: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub at: Millis,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Init,
    Event,
    Timer,
    Dispose,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub at: Millis,
    pub source: Source,
    pub label: &'static str,
    pub ops: Vec<PageOp>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Set when the layout could not be bound; the session still runs.
    pub init_error: Option<String>,
    pub entries: Vec<ReportEntry>,
    pub state: PortfolioState,
}

pub fn load_script(path: &Path) -> Result<Script, SimulateError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Run a script to completion and collect the timeline.
pub fn run(config: SiteConfig, script: Script) -> Result<Report, SimulateError> {
    let mut page = RecordingPage::new();
    page.long_tasks_supported = script.environment.long_tasks_supported;
    page.memory = script.environment.memory;

    let mut portfolio = Portfolio::new(config, page);
    let mut entries = Vec::new();

    let init_error = match portfolio.init(&script.layout) {
        Ok(()) => None,
        Err(PortfolioError::Layout(err)) => Some(err.to_string()),
        Err(err) => return Err(err.into()),
    };
    record(&mut portfolio, &mut entries, Source::Init, "init");

    let mut previous = 0;
    for step in script.steps {
        if step.at < previous {
            return Err(SimulateError::OutOfOrder {
                at: step.at,
                previous,
            });
        }
        previous = step.at;
        run_due(&mut portfolio, &mut entries, step.at)?;
        let label = step.event.kind();
        portfolio.handle(step.event)?;
        record(&mut portfolio, &mut entries, Source::Event, label);
    }

    let end = script.until.map_or(previous, |until| until.max(previous));
    run_due(&mut portfolio, &mut entries, end)?;

    if script.dispose {
        portfolio.dispose();
        record(&mut portfolio, &mut entries, Source::Dispose, "dispose");
    }

    tracing::debug!(entries = entries.len(), end, "simulation finished");
    Ok(Report {
        init_error,
        entries,
        state: portfolio.state(),
    })
}

fn run_due(
    portfolio: &mut Portfolio<RecordingPage>,
    entries: &mut Vec<ReportEntry>,
    until: Millis,
) -> Result<(), SimulateError> {
    while let Some((_, label)) = portfolio.step(until)? {
        record(portfolio, entries, Source::Timer, label);
    }
    portfolio.advance_to(until)?;
    Ok(())
}

fn record(
    portfolio: &mut Portfolio<RecordingPage>,
    entries: &mut Vec<ReportEntry>,
    source: Source,
    label: &'static str,
) {
    entries.push(ReportEntry {
        at: portfolio.now(),
        source,
        label,
        ops: portfolio.page_mut().take_ops(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::ActiveModal;
    use crate::types::Key;

    fn script(json: &str) -> Script {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn empty_script_runs_init_only() {
        let report = run(SiteConfig::default(), Script::default()).unwrap();
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].source, Source::Init);
        assert!(!report.entries[0].ops.is_empty());
        assert_eq!(report.state.slide, Some(0));
        assert!(report.init_error.is_none());
    }

    #[test]
    fn timers_run_between_steps() {
        let script = script(
            r#"{
                "steps": [
                    {"at": 2100, "event": {"type": "category_selected", "category": "abstract"}}
                ]
            }"#,
        );
        let report = run(SiteConfig::default(), script).unwrap();
        let labels: Vec<&str> = report.entries.iter().map(|e| e.label).collect();
        assert_eq!(
            labels,
            vec![
                "init",
                "release_transition",
                "fade_loader",
                "remove_loader",
                "category_selected"
            ]
        );
        let times: Vec<Millis> = report.entries.iter().map(|e| e.at).collect();
        assert_eq!(times, vec![0, 1000, 1500, 2000, 2100]);
        assert_eq!(
            report.state.modal,
            ActiveModal::Gallery {
                category: "abstract".to_string()
            }
        );
    }

    #[test]
    fn until_extends_the_session() {
        let script = script(r#"{"until": 5000}"#);
        let report = run(SiteConfig::default(), script).unwrap();
        assert!(report.entries.iter().any(|e| e.label == "autoplay_tick"));
        assert_eq!(report.state.now, 5000);
        assert_eq!(report.state.slide, Some(1));
    }

    #[test]
    fn out_of_order_steps_are_rejected() {
        let script = script(
            r#"{
                "steps": [
                    {"at": 500, "event": {"type": "carousel_next"}},
                    {"at": 400, "event": {"type": "carousel_next"}}
                ]
            }"#,
        );
        let err = run(SiteConfig::default(), script).unwrap_err();
        assert!(matches!(
            err,
            SimulateError::OutOfOrder {
                at: 400,
                previous: 500
            }
        ));
    }

    #[test]
    fn invalid_layout_is_reported_not_fatal() {
        let mut script = Script::default();
        script.layout.carousel.indicators = 7;
        let report = run(SiteConfig::default(), script).unwrap();
        assert!(report.init_error.is_some());
        assert_eq!(report.state.slide, None);
    }

    #[test]
    fn dispose_stops_everything() {
        let mut script = Script::default();
        script.dispose = true;
        script.steps.push(Step {
            at: 10,
            event: Event::Key {
                key: Key::Tab,
                input_focused: false,
            },
        });
        let report = run(SiteConfig::default(), script).unwrap();
        let last = report.entries.last().unwrap();
        assert_eq!(last.source, Source::Dispose);
        assert!(report.state.disposed);
        assert_eq!(report.state.pending_timers, 0);
    }

    #[test]
    fn unknown_script_keys_are_rejected() {
        assert!(serde_json::from_str::<Script>(r#"{"stepz": []}"#).is_err());
    }

    #[test]
    fn load_script_reads_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("session.json");
        fs::write(&path, r#"{"until": 100}"#).unwrap();
        let script = load_script(&path).unwrap();
        assert_eq!(script.until, Some(100));

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_script(&path), Err(SimulateError::Json(_))));
    }
}
