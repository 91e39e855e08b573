//! Errors - エラー型と分類
//!
//! エンコード系のエラーは Parameter Codec の境界で即座に返し、
//! 途中まで適用された状態は残しません。
//! トランスポート系のエラーはリトライせずにそのまま呼び出し側へ返します。

use std::time::Duration;

use crate::domain::ids::{JobId, TaskId};
use crate::ports::transport::TransportError;

/// ErrorKind は呼び出し側のリトライ判断のための分類
///
/// - Permanent: 入力が不正（同じ入力でリトライしても無意味）
/// - Transient: 接続・送信の失敗（request は worker に届いていない）
/// - Indeterminate: 送信後のタイムアウトや受信失敗（worker 側で受理されたか不明）
///
/// `Receive` / `ConnectionClosed` は reply 待ちでしか起きないので Indeterminate です。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Permanent,
    Transient,
    Indeterminate,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("malformed parameter entry {entry:?}: {reason}")]
    MalformedParameter { entry: String, reason: String },

    #[error("unknown parameter {name:?}: not declared in the parameter schema")]
    UnknownParameter { name: String },

    #[error("invalid task type {0}: not in the task type registry")]
    InvalidTaskType(i32),

    #[error("invalid language tag {0}")]
    InvalidLanguage(i32),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("no reply for job {job_id} (task {task_id}) within {waited:?}; worker-side outcome is unknown")]
    IndeterminateOutcome {
        job_id: JobId,
        task_id: TaskId,
        waited: Duration,
    },
}

impl SubmitError {
    pub fn malformed(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        SubmitError::MalformedParameter {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown(name: impl Into<String>) -> Self {
        SubmitError::UnknownParameter { name: name.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SubmitError::MalformedParameter { .. }
            | SubmitError::UnknownParameter { .. }
            | SubmitError::InvalidTaskType(_)
            | SubmitError::InvalidLanguage(_) => ErrorKind::Permanent,
            SubmitError::Transport(
                TransportError::Receive(_) | TransportError::ConnectionClosed,
            ) => ErrorKind::Indeterminate,
            SubmitError::Transport(_) => ErrorKind::Transient,
            SubmitError::IndeterminateOutcome { .. } => ErrorKind::Indeterminate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_offending_input() {
        let err = SubmitError::malformed("pirType:INT32:1", "expected 4 fields, found 3");
        assert_eq!(
            err.to_string(),
            "malformed parameter entry \"pirType:INT32:1\": expected 4 fields, found 3"
        );

        let err = SubmitError::unknown("psiTagg");
        assert!(err.to_string().contains("psiTagg"));

        assert!(SubmitError::InvalidTaskType(9).to_string().contains('9'));
    }

    #[test]
    fn errors_are_classified_for_retry_decisions() {
        assert_eq!(SubmitError::unknown("x").kind(), ErrorKind::Permanent);
        assert_eq!(
            SubmitError::from(TransportError::SendTimeout(Duration::from_secs(1))).kind(),
            ErrorKind::Transient
        );
        assert_eq!(
            SubmitError::from(TransportError::Connect {
                address: "127.0.0.1:1".to_string(),
                reason: "refused".to_string(),
            })
            .kind(),
            ErrorKind::Transient
        );

        let err = SubmitError::IndeterminateOutcome {
            job_id: JobId::from_token("j").unwrap(),
            task_id: TaskId::from_token("t").unwrap(),
            waited: Duration::from_secs(1),
        };
        assert_eq!(err.kind(), ErrorKind::Indeterminate);
    }

    #[test]
    fn receive_failures_leave_the_outcome_unknown() {
        assert_eq!(
            SubmitError::from(TransportError::ConnectionClosed).kind(),
            ErrorKind::Indeterminate
        );
        assert_eq!(
            SubmitError::from(TransportError::Receive("connection reset".to_string())).kind(),
            ErrorKind::Indeterminate
        );
    }
}
