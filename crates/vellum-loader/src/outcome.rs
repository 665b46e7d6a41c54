use std::fmt;
use std::time::Duration;

use vellum_types::{FileId, NodeId};

// ---------------------------------------------------------------------------
// LoadPhase
// ---------------------------------------------------------------------------

/// States of the load pipeline.
///
/// `Done`, `Skipped`, and `Errored` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadPhase {
    Idle,
    CacheCheck,
    InFlightCheck,
    Lookup,
    CollisionCheck,
    Admission,
    Downloading,
    Decrypting,
    Materializing,
    Rendering,
    Done,
    Skipped,
    Errored,
}

impl LoadPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Skipped | Self::Errored)
    }
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// LoadOutcome
// ---------------------------------------------------------------------------

/// Where rendered media came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderSource {
    /// Straight from the materialized-file cache.
    Cache,
    /// From a full lookup, download, decrypt, and materialize run.
    Pipeline,
}

/// Why a pipeline stopped without doing any work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Another pipeline owns the identifier; the placeholder was parked on it.
    AlreadyLoading,
    /// Collapsible media for the identifier is already in the document.
    AlreadyRendered,
}

/// User-visible failure categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    LookupNotFound,
    DownloadFailed,
    DecryptFailed,
    MaterializeFailed,
    RenderFailed,
}

/// A failed resolution, localized to one placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadFailure {
    pub kind: FailureKind,
    /// The phase in which the fault occurred.
    pub phase: LoadPhase,
    /// The status message shown to the user.
    pub message: String,
}

/// Terminal result of one `resolve` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered {
        node: NodeId,
        source: RenderSource,
        /// Parked placeholders for the same identifier rendered afterwards.
        waiters_served: usize,
    },
    Skipped(SkipReason),
    Failed(LoadFailure),
}

impl LoadOutcome {
    /// The terminal phase this outcome corresponds to.
    pub fn terminal_phase(&self) -> LoadPhase {
        match self {
            Self::Rendered { .. } => LoadPhase::Done,
            Self::Skipped(_) => LoadPhase::Skipped,
            Self::Failed(_) => LoadPhase::Errored,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    pub fn failure(&self) -> Option<&LoadFailure> {
        match self {
            Self::Failed(f) => Some(f),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// LoadReport
// ---------------------------------------------------------------------------

/// Time spent in one phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseRecord {
    pub phase: LoadPhase,
    pub elapsed: Duration,
}

/// Full trace of one `resolve` call.
#[derive(Clone, Debug)]
pub struct LoadReport {
    pub file_id: FileId,
    pub placeholder: NodeId,
    pub outcome: LoadOutcome,
    /// Non-terminal phases visited, in order.
    pub phases: Vec<PhaseRecord>,
    /// Total wall-clock time of the call.
    pub elapsed: Duration,
}

impl LoadReport {
    /// Whether the placeholder was replaced by media.
    pub fn is_success(&self) -> bool {
        self.outcome.is_rendered()
    }

    /// Phases visited, in order, ending with the terminal phase.
    pub fn phase_trail(&self) -> Vec<LoadPhase> {
        self.phases
            .iter()
            .map(|r| r.phase)
            .chain(std::iter::once(self.outcome.terminal_phase()))
            .collect()
    }

    /// Whether the pipeline entered `phase` at any point.
    pub fn visited(&self, phase: LoadPhase) -> bool {
        self.phase_trail().contains(&phase)
    }
}
