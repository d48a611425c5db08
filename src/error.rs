use std::fmt;

use crate::lp::LpError;

/// Result type for solver operations
pub type Result<T> = std::result::Result<T, SolverError>;

/// Phase of one value-iteration epoch, used to locate fatal failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupPhase {
    AwaitingPreviousLayer,
    Projecting,
    CrossSumming,
    MergingActions,
    Pruning,
    StoppingCheck,
}

impl fmt::Display for BackupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackupPhase::AwaitingPreviousLayer => "AwaitingPreviousLayer",
            BackupPhase::Projecting => "Projecting",
            BackupPhase::CrossSumming => "CrossSumming",
            BackupPhase::MergingActions => "MergingActions",
            BackupPhase::Pruning => "Pruning",
            BackupPhase::StoppingCheck => "StoppingCheck",
        };
        f.write_str(name)
    }
}

/// Where in the computation a fatal error happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    pub stage: Option<usize>,
    pub action: Option<usize>,
    pub observation: Option<usize>,
    pub phase: Option<BackupPhase>,
}

impl ErrorContext {
    pub fn stage(stage: usize) -> Self {
        ErrorContext {
            stage: Some(stage),
            ..Default::default()
        }
    }

    pub fn with_action(mut self, action: usize) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_observation(mut self, observation: usize) -> Self {
        self.observation = Some(observation);
        self
    }

    pub fn with_phase(mut self, phase: BackupPhase) -> Self {
        self.phase = Some(phase);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(stage) = self.stage {
            parts.push(format!("stage {}", stage));
        }
        if let Some(action) = self.action {
            parts.push(format!("action {}", action));
        }
        if let Some(observation) = self.observation {
            parts.push(format!("observation {}", observation));
        }
        if let Some(phase) = self.phase {
            parts.push(format!("phase {}", phase));
        }
        if parts.is_empty() {
            f.write_str("no context")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Main error type for the solver
#[derive(Debug, Clone)]
pub enum SolverError {
    /// Invalid configuration value, detected before any computation
    InvalidConfig {
        name: String,
        reason: String,
    },

    /// Invalid dimensions for operations
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Transition/observation/reward model failed validation
    InvalidModel(String),

    /// IO errors (file operations)
    Io(String),

    /// Serialization/deserialization errors
    Serialization(String),

    /// Malformed text input (belief lists, alpha files)
    Parse {
        line: usize,
        reason: String,
    },

    /// The LP backend failed; the value function can no longer be trusted
    Lp {
        context: ErrorContext,
        source: LpError,
    },

    /// Every candidate vector was pruned away
    EmptyCandidateSet {
        context: ErrorContext,
    },

    /// NaN, infinities or overflow in a vector set
    Numerical {
        context: ErrorContext,
        reason: String,
    },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::InvalidConfig { name, reason } => {
                write!(f, "Invalid configuration '{}': {}", name, reason)
            }
            SolverError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            SolverError::InvalidModel(msg) => write!(f, "Invalid model: {}", msg),
            SolverError::Io(msg) => write!(f, "IO error: {}", msg),
            SolverError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            SolverError::Parse { line, reason } => {
                write!(f, "Parse error on line {}: {}", line, reason)
            }
            SolverError::Lp { context, source } => {
                write!(f, "LP solver failure at {}: {}", context, source)
            }
            SolverError::EmptyCandidateSet { context } => write!(
                f,
                "all candidate vectors pruned at {} - check prune_epsilon and the model",
                context
            ),
            SolverError::Numerical { context, reason } => {
                write!(f, "Numerical error at {}: {}", context, reason)
            }
        }
    }
}

impl std::error::Error for SolverError {}

impl From<std::io::Error> for SolverError {
    fn from(err: std::io::Error) -> Self {
        SolverError::Io(err.to_string())
    }
}

impl From<bincode::Error> for SolverError {
    fn from(err: bincode::Error) -> Self {
        SolverError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for SolverError {
    fn from(err: serde_json::Error) -> Self {
        SolverError::Serialization(err.to_string())
    }
}

// Helper functions for common error patterns
impl SolverError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        SolverError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_config<S: Into<String>>(name: S, reason: S) -> Self {
        SolverError::InvalidConfig {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn lp(context: ErrorContext, source: LpError) -> Self {
        SolverError::Lp { context, source }
    }

    /// True for failures that invalidate the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SolverError::Lp { .. }
                | SolverError::EmptyCandidateSet { .. }
                | SolverError::Numerical { .. }
        )
    }
}
