//! App - アプリケーション層
//!
//! ports を組み合わせて「タスクを組み立てて投入する」流れを実装します。
//!
//! # 主要コンポーネント
//! - **TaskBuilder**: TaskDescriptor の構築と検証
//! - **SequenceRegistry**: client ごとの sequence / processed_up_to
//! - **EnvelopeBuilder**: SubmissionEnvelope の構築
//! - **SubmitClient**: transport 越しの 1 回の request/reply

pub mod builder;
pub mod client;
pub mod envelope;
pub mod sequence;

// 主要な型を再エクスポート
pub use self::builder::TaskBuilder;
pub use self::client::SubmitClient;
pub use self::envelope::EnvelopeBuilder;
pub use self::sequence::{SequenceRegistry, SequenceTicket};
