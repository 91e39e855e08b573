//! Reply of a worker to a submission.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code returned by the worker.
///
/// Passed through untouched; `SUCCESS`/`FAIL` are the codes shared with the
/// worker side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetCode(pub i32);

impl RetCode {
    pub const SUCCESS: RetCode = RetCode(0);
    pub const FAIL: RetCode = RetCode(1);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// Registered name of the code, if any.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::SUCCESS => Some("SUCCESS"),
            Self::FAIL => Some("FAIL"),
            _ => None,
        }
    }
}

impl fmt::Display for RetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({name})", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReply {
    pub ret_code: RetCode,
    /// Echo of the accepted job, empty on rejection.
    #[serde(default)]
    pub job_id: String,
}

impl SubmissionReply {
    pub fn accepted(job_id: impl Into<String>) -> Self {
        Self {
            ret_code: RetCode::SUCCESS,
            job_id: job_id.into(),
        }
    }

    pub fn rejected(ret_code: RetCode) -> Self {
        Self {
            ret_code,
            job_id: String::new(),
        }
    }
}
