//! State - 1 回の投入の状態
//!
//! # 状態遷移
//! - built: envelope 構築済み
//! - sent: worker へ送信済み
//! - replied: reply を受信（終端）
//! - failed: トランスポート失敗・タイムアウト（終端）
//!
//! リトライや部分状態はありません。

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Built,
    Sent,
    Replied,
    Failed,
}

impl SubmissionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SubmissionState::Replied | SubmissionState::Failed)
    }

    /// Whether `self -> next` is an allowed transition.
    pub fn can_transition_to(self, next: SubmissionState) -> bool {
        use SubmissionState::*;
        matches!(
            (self, next),
            (Built, Sent) | (Built, Failed) | (Sent, Replied) | (Sent, Failed)
        )
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionState::Built => "built",
            SubmissionState::Sent => "sent",
            SubmissionState::Replied => "replied",
            SubmissionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use super::SubmissionState::*;

    #[rstest]
    #[case(Built, Sent, true)]
    #[case(Built, Failed, true)]
    #[case(Sent, Replied, true)]
    #[case(Sent, Failed, true)]
    #[case(Built, Replied, false)]
    #[case(Replied, Sent, false)]
    #[case(Failed, Sent, false)]
    #[case(Sent, Built, false)]
    fn transitions(#[case] from: SubmissionState, #[case] to: SubmissionState, #[case] ok: bool) {
        assert_eq!(from.can_transition_to(to), ok);
    }

    #[test]
    fn terminal_states() {
        assert!(Replied.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!Built.is_terminal());
        assert!(!Sent.is_terminal());
    }
}
