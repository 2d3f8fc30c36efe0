//! Reset progress reporting.
//!
//! A reset reports one [`RebuildEvent`] per recipe attempted, bracketed by a
//! start line and a final status line. The same events feed the CLI (stderr,
//! human or JSON) and the `/reset` HTTP response (through a channel).

use std::fmt;
use std::io::Write;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// A single progress event for a reset.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RebuildEvent {
    /// Old store removed; about to embed `total` recipes.
    Started { total: usize },
    /// Recipe `n` of `total` embedded.
    Embedded {
        n: usize,
        total: usize,
        id: String,
        title: String,
    },
    /// Recipe `n` of `total` skipped because the provider failed.
    Failed {
        n: usize,
        total: usize,
        id: String,
        title: String,
        reason: String,
    },
    /// Store written.
    Done { embedded: usize, failed: usize },
    /// Reset aborted; nothing more follows.
    Fatal { reason: String },
}

impl fmt::Display for RebuildEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebuildEvent::Started { total } => {
                write!(f, "reset  embedding {} recipes", total)
            }
            RebuildEvent::Embedded { n, total, id, title } => {
                write!(f, "[{}/{}] ok      {} ({})", n, total, id, title)
            }
            RebuildEvent::Failed {
                n,
                total,
                id,
                title,
                reason,
            } => write!(
                f,
                "[{}/{}] failed  {} ({}): {}",
                n, total, id, title, reason
            ),
            RebuildEvent::Done { embedded, failed } => {
                write!(f, "done  embedded: {}  failed: {}", embedded, failed)
            }
            RebuildEvent::Fatal { reason } => write!(f, "fatal: {}", reason),
        }
    }
}

/// Receives reset progress. Called from the reset loop between provider calls.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: RebuildEvent);
}

/// Human-friendly progress on stderr, one line per event.
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: RebuildEvent) {
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{}", event);
        let _ = err.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: RebuildEvent) {
        if let Ok(line) = serde_json::to_string(&event) {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{}", line);
            let _ = err.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: RebuildEvent) {}
}

/// Forwards events to a channel. A closed receiver (client gone) is ignored
/// and the reset keeps going.
pub struct ChannelProgress {
    tx: UnboundedSender<RebuildEvent>,
}

impl ChannelProgress {
    pub fn new(tx: UnboundedSender<RebuildEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressReporter for ChannelProgress {
    fn report(&self, event: RebuildEvent) {
        let _ = self.tx.send(event);
    }
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines() {
        let ok = RebuildEvent::Embedded {
            n: 2,
            total: 5,
            id: "r2".into(),
            title: "Tomato soup".into(),
        };
        assert_eq!(ok.to_string(), "[2/5] ok      r2 (Tomato soup)");

        let failed = RebuildEvent::Failed {
            n: 1,
            total: 5,
            id: "r1".into(),
            title: "Pancakes".into(),
            reason: "embedding failed: provider returned no vector".into(),
        };
        assert!(failed.to_string().starts_with("[1/5] failed  r1 (Pancakes): "));

        let done = RebuildEvent::Done {
            embedded: 4,
            failed: 1,
        };
        assert_eq!(done.to_string(), "done  embedded: 4  failed: 1");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(RebuildEvent::Started { total: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({ "event": "started", "total": 3 }));
    }

    #[test]
    fn test_channel_ignores_closed_receiver() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        ChannelProgress::new(tx).report(RebuildEvent::Done {
            embedded: 0,
            failed: 0,
        });
    }
}
