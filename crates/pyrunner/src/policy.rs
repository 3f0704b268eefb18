//! Lexical denylist for submitted snippets
//!
//! This is a naive substring check. It is trivially bypassed (string
//! concatenation, `importlib`, `__import__`, aliases) and is NOT an isolation
//! boundary; the process boundary in [`crate::sandbox`] is the only real
//! containment this crate provides. Real isolation needs OS-level sandboxing
//! (restricted user, namespaces, syscall filtering, cgroups).

use thiserror::Error;
use tracing::warn;

/// Patterns rejected when no explicit list is configured
pub const DEFAULT_FORBIDDEN_PATTERNS: [&str; 6] = [
    "os.system",
    "subprocess",
    "eval(",
    "exec(",
    "import os",
    "import subprocess",
];

/// A snippet matched a denylisted pattern
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Forbidden code pattern detected: {0}")]
    ForbiddenPattern(String),
}

/// Case-insensitive substring denylist
#[derive(Debug, Clone)]
pub struct Denylist {
    patterns: Vec<String>,
}

impl Denylist {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Get the configured patterns, in match order
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Reject the snippet on the first pattern it contains
    pub fn check(&self, code: &str) -> Result<(), PolicyError> {
        let code_lower = code.to_lowercase();
        for pattern in &self.patterns {
            if code_lower.contains(&pattern.to_lowercase()) {
                warn!(pattern = %pattern, "snippet rejected by denylist");
                return Err(PolicyError::ForbiddenPattern(pattern.clone()));
            }
        }
        Ok(())
    }
}

impl Default for Denylist {
    fn default() -> Self {
        Self::new(DEFAULT_FORBIDDEN_PATTERNS)
    }
}
