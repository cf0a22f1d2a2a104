//! Structured error types shared across gch crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`GchError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (identifiers, sizes, paths).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the gch engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum GchError {
    /// Graph structural or canonicalisation errors.
    #[error("graph error: {0}")]
    Graph(ErrorInfo),
    /// Persistent store I/O errors.
    #[error("store error: {0}")]
    Store(ErrorInfo),
    /// File header, terminator or dimension mismatches. Always fatal.
    #[error("format error: {0}")]
    Format(ErrorInfo),
    /// A prerequisite artefact (basis, matrix, rank) has not been built.
    #[error("not built: {0}")]
    NotBuilt(ErrorInfo),
    /// Rank engine errors.
    #[error("rank error: {0}")]
    Rank(ErrorInfo),
    /// A composition test (square-zero, commutativity) failed.
    #[error("test failure: {0}")]
    Test(ErrorInfo),
    /// Command line argument errors.
    #[error("cli error: {0}")]
    Cli(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl GchError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            GchError::Graph(info)
            | GchError::Store(info)
            | GchError::Format(info)
            | GchError::NotBuilt(info)
            | GchError::Rank(info)
            | GchError::Test(info)
            | GchError::Cli(info) => info,
        }
    }

    /// Returns true when the error marks a missing prerequisite rather than
    /// corruption.
    pub fn is_not_built(&self) -> bool {
        matches!(self, GchError::NotBuilt(_))
    }
}
