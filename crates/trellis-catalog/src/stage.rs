//! Stage content units: ordered explanation/exercise payloads inside a lesson.
//!
//! Stages carry no completion state in the catalog. Completion is tracked
//! externally by the progress engine via the stage id.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One ordered content unit within a lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Stage {
    Explanation {
        id: String,
        title: String,
        /// Markdown/HTML display content. Opaque to the engine.
        content: String,
    },
    Exercise {
        id: String,
        title: String,
        instructions: String,
        initial_code: String,
        solution: Solution,
    },
}

impl Stage {
    pub fn id(&self) -> &str {
        match self {
            Stage::Explanation { id, .. } | Stage::Exercise { id, .. } => id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Stage::Explanation { title, .. } | Stage::Exercise { title, .. } => title,
        }
    }

    pub fn is_exercise(&self) -> bool {
        matches!(self, Stage::Exercise { .. })
    }
}

/// How an exercise submission is graded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "match", content = "value", rename_all = "lowercase")]
pub enum Solution {
    /// Whitespace-trimmed exact comparison.
    Exact(String),
    /// Regular-expression match against the trimmed submission.
    Pattern(String),
}

/// Errors raised while grading a submission.
#[derive(Debug, thiserror::Error)]
pub enum SolutionError {
    #[error("invalid solution pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl Solution {
    /// Grade one submission.
    ///
    /// A pattern that fails to compile is an authoring defect and surfaces
    /// as an error rather than a silent mismatch. `check_catalog` flags the
    /// same defect ahead of time.
    pub fn matches(&self, submission: &str) -> Result<bool, SolutionError> {
        match self {
            Solution::Exact(expected) => Ok(submission.trim() == expected.trim()),
            Solution::Pattern(pattern) => {
                let re = Regex::new(pattern).map_err(|e| SolutionError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
                Ok(re.is_match(submission.trim()))
            }
        }
    }
}
