//! Runtime events emitted while reconciling.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Steps of one reconciliation.
///
/// `Validating → Compiling → Persisting → Applying → Converged`, with any
/// step able to end in `Failed`. Only `Persisting` and `Applying` touch the
/// outside world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePhase {
    Validating,
    Compiling,
    Persisting,
    Applying,
    Converged,
    Failed,
}

impl ReconcilePhase {
    /// Whether a failure in this phase may have left external side effects.
    pub const fn has_side_effects(self) -> bool {
        matches!(self, Self::Persisting | Self::Applying)
    }
}

impl fmt::Display for ReconcilePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::Compiling => "compiling",
            Self::Persisting => "persisting",
            Self::Applying => "applying",
            Self::Converged => "converged",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    PhaseChanged {
        working_dir: PathBuf,
        phase: ReconcilePhase,
    },
    Converged {
        working_dir: PathBuf,
        services: Vec<String>,
        artifacts_changed: bool,
    },
    Failed {
        working_dir: PathBuf,
        phase: ReconcilePhase,
        message: String,
    },
}
