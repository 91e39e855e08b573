//! Transport port - worker への RPC 抽象化
//!
//! `connect(endpoint) -> Channel` と、その Channel 上の
//! `send(envelope)` / `recv() -> reply` だけを要求します。
//! send と recv を分けているのは、「送信前の失敗」と
//! 「送信後のタイムアウト（結果不明）」を呼び出し側で区別するためです。
//!
//! # 実装
//! - **TcpTransport**: NDJSON over TCP
//! - **InMemoryTransport**: テスト用

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::envelope::SubmissionEnvelope;
use crate::domain::reply::SubmissionReply;

/// Where and how to reach a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub address: String,
    /// Certificate for a TLS channel. `None` means an insecure channel.
    pub cert: Option<PathBuf>,
}

impl Endpoint {
    pub fn insecure(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            cert: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to connect to {address}: {reason}")]
    Connect { address: String, reason: String },

    #[error("connecting to {address} timed out after {after:?}")]
    ConnectTimeout { address: String, after: Duration },

    #[error("failed to send request: {0}")]
    Send(String),

    #[error("sending request timed out after {0:?}")]
    SendTimeout(Duration),

    #[error("failed to receive reply: {0}")]
    Receive(String),

    #[error("connection closed before a reply arrived")]
    ConnectionClosed,

    #[error("unsupported transport option: {0}")]
    Unsupported(String),
}

/// Transport は worker への接続を開く
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn Channel>, TransportError>;
}

/// Channel は 1 回の request/reply に使う接続
///
/// drop されると接続は解放されます。
#[async_trait]
pub trait Channel: Send {
    async fn send(&mut self, envelope: &SubmissionEnvelope) -> Result<(), TransportError>;

    async fn recv(&mut self) -> Result<SubmissionReply, TransportError>;
}
