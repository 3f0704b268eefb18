use serde::{Deserialize, Serialize, Serializer};

/// Inputs as supplied by a transport
///
/// Two request shapes are accepted: a text blob where every non-blank line is
/// one input, or an explicit sequence of values used as-is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Inputs {
    /// Newline-separated values; lines are trimmed and blank lines dropped
    Text(String),

    /// Ordered values; strings are kept verbatim, other scalars stringified
    /// the way Python's `str()` renders them (`True`, `False`, `None`)
    List(Vec<serde_json::Value>),
}

impl Inputs {
    /// No inputs at all (a single run without injected input)
    pub fn none() -> Self {
        Inputs::List(Vec::new())
    }

    /// Flatten into the ordered list of input values, one per run
    pub fn into_values(self) -> Vec<String> {
        match self {
            Inputs::Text(text) => text
                .split('\n')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect(),
            Inputs::List(values) => values
                .into_iter()
                .map(|value| match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Bool(true) => "True".to_owned(),
                    serde_json::Value::Bool(false) => "False".to_owned(),
                    serde_json::Value::Null => "None".to_owned(),
                    // Numbers print the same; nested values stay as JSON
                    other => other.to_string(),
                })
                .collect(),
        }
    }
}

impl Default for Inputs {
    fn default() -> Self {
        Self::none()
    }
}

impl From<&str> for Inputs {
    fn from(text: &str) -> Self {
        Inputs::Text(text.to_owned())
    }
}

impl From<Vec<String>> for Inputs {
    fn from(values: Vec<String>) -> Self {
        Inputs::List(values.into_iter().map(serde_json::Value::String).collect())
    }
}

/// Coarse time-complexity classification of a snippet
///
/// Derived purely from syntactic loop nesting, see [`crate::analyzer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexityVerdict {
    /// No loop constructs
    Constant,

    /// At least one loop, none nested inside another
    Linear,

    /// A loop nested inside another loop, at any depth
    Quadratic,

    /// The snippet could not be parsed
    Unknown,
}

impl ComplexityVerdict {
    /// Human-readable label reported to clients
    pub fn label(&self) -> &'static str {
        match self {
            ComplexityVerdict::Constant => "O(1) - Constant time complexity detected",
            ComplexityVerdict::Linear => {
                "O(n) - Linear time complexity detected due to single loops"
            }
            ComplexityVerdict::Quadratic => {
                "O(n^2) - Quadratic time complexity detected due to nested loops"
            }
            ComplexityVerdict::Unknown => "Unable to analyze time complexity",
        }
    }
}

impl std::fmt::Display for ComplexityVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ComplexityVerdict {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

/// Coarse space bucket derived from the measured memory delta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceBucket {
    /// Under 1 MB
    Constant,

    /// Under 10 MB
    Linear,

    /// 10 MB and above
    QuadraticOrHigher,
}

impl SpaceBucket {
    /// Upper bound (exclusive) of the constant bucket, in megabytes
    pub const CONSTANT_LIMIT_MB: f64 = 1.0;
    /// Upper bound (exclusive) of the linear bucket, in megabytes
    pub const LINEAR_LIMIT_MB: f64 = 10.0;

    /// Bucket a memory delta given in megabytes
    pub fn from_memory_mb(memory_mb: f64) -> Self {
        if memory_mb < Self::CONSTANT_LIMIT_MB {
            SpaceBucket::Constant
        } else if memory_mb < Self::LINEAR_LIMIT_MB {
            SpaceBucket::Linear
        } else {
            SpaceBucket::QuadraticOrHigher
        }
    }

    /// Report label including the measured amount
    pub fn describe(memory_mb: f64) -> String {
        let prefix = match Self::from_memory_mb(memory_mb) {
            SpaceBucket::Constant => "O(1) - Constant space",
            SpaceBucket::Linear => "O(n) - Linear space",
            SpaceBucket::QuadraticOrHigher => "O(n^2) or higher - Quadratic space",
        };
        format!("{prefix} (used {memory_mb:.2}MB)")
    }
}

/// Terminal state of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The child exited on its own
    Completed,

    /// The deadline expired and the process group was signalled
    TimedOut,
}

/// Outcome of one isolated child-process execution
#[derive(Debug, Clone)]
pub struct RunResult {
    pub status: RunStatus,

    /// Captured output between the sentinel markers (empty if absent)
    pub stdout: String,

    /// Decoded stderr, or the timeout message if the run timed out
    pub stderr: String,

    /// Exit code if the child exited normally
    pub exit_code: Option<i32>,
}

impl RunResult {
    #[must_use]
    pub fn timed_out(&self) -> bool {
        matches!(self.status, RunStatus::TimedOut)
    }

    /// Check if the child exited with code 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, RunStatus::Completed) && self.exit_code == Some(0)
    }
}

/// Structured result of an execution request
///
/// Every field is present on every path, including failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionReport {
    /// Outputs of all runs joined by newline, in input order
    pub output: String,

    /// Empty on success
    pub error: String,

    /// Wall-clock time spent on all runs, in seconds
    #[serde(rename = "execution_time")]
    pub execution_time_seconds: f64,

    pub time_complexity: ComplexityVerdict,

    pub space_complexity: String,

    /// Measured memory delta in megabytes, rounded to two decimals
    #[serde(rename = "memory_usage")]
    pub memory_usage_mb: f64,

    /// The inputs actually consumed, one per run
    pub inputs_used: Vec<String>,
}

impl ExecutionReport {
    /// Label used for `space_complexity` on failure paths
    pub const NOT_AVAILABLE: &'static str = "N/A";

    /// Report for a request that failed before or during execution
    pub fn failure(error: impl Into<String>, time_complexity: ComplexityVerdict) -> Self {
        Self {
            output: String::new(),
            error: error.into(),
            execution_time_seconds: 0.0,
            time_complexity,
            space_complexity: Self::NOT_AVAILABLE.to_owned(),
            memory_usage_mb: 0.0,
            inputs_used: Vec::new(),
        }
    }

    /// Check if no error was reported
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }
}
