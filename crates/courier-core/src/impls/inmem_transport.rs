//! InMemoryTransport - テスト用のトランスポート
//!
//! # 学習ポイント
//! - Arc + Mutex で受信ログを共有
//! - `std::future::pending` で「reply が永遠に来ない」状況を再現
//! - Drop で開いている channel 数を数え、解放漏れを検出

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::stub_worker::{Responder, accept_all};
use crate::domain::envelope::SubmissionEnvelope;
use crate::domain::reply::SubmissionReply;
use crate::ports::transport::{Channel, Endpoint, Transport, TransportError};

struct InMemoryState {
    responder: Responder,
    /// 受信した envelope（送信順）
    received: Mutex<Vec<SubmissionEnvelope>>,
    refuse_connect: AtomicBool,
    /// 次の N 回の reply を返さない
    stalled_replies: AtomicUsize,
    /// 次の N 回は reply の代わりに接続を切る
    closed_replies: AtomicUsize,
    open_channels: AtomicUsize,
}

/// InMemoryTransport は worker をプロセス内で模擬する
///
/// clone したハンドルは同じ状態を共有します。
#[derive(Clone)]
pub struct InMemoryTransport {
    state: Arc<InMemoryState>,
}

impl InMemoryTransport {
    pub fn new(responder: Responder) -> Self {
        Self {
            state: Arc::new(InMemoryState {
                responder,
                received: Mutex::new(Vec::new()),
                refuse_connect: AtomicBool::new(false),
                stalled_replies: AtomicUsize::new(0),
                closed_replies: AtomicUsize::new(0),
                open_channels: AtomicUsize::new(0),
            }),
        }
    }

    /// A worker that accepts every submission.
    pub fn accepting() -> Self {
        Self::new(accept_all())
    }

    /// Make subsequent `connect` calls fail (or succeed again).
    pub fn refuse_connections(&self, refuse: bool) {
        self.state.refuse_connect.store(refuse, Ordering::SeqCst);
    }

    /// The next `n` channels receive the request but never reply.
    pub fn stall_replies(&self, n: usize) {
        self.state.stalled_replies.store(n, Ordering::SeqCst);
    }

    /// The next `n` channels receive the request, then close without a reply.
    pub fn close_after_send(&self, n: usize) {
        self.state.closed_replies.store(n, Ordering::SeqCst);
    }

    pub fn received(&self) -> Vec<SubmissionEnvelope> {
        self.state
            .received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn open_channels(&self) -> usize {
        self.state.open_channels.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn Channel>, TransportError> {
        if self.state.refuse_connect.load(Ordering::SeqCst) {
            return Err(TransportError::Connect {
                address: endpoint.address.clone(),
                reason: "connection refused".to_string(),
            });
        }
        self.state.open_channels.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryChannel {
            state: Arc::clone(&self.state),
            pending: None,
        }))
    }
}

struct InMemoryChannel {
    state: Arc<InMemoryState>,
    pending: Option<SubmissionEnvelope>,
}

#[async_trait]
impl Channel for InMemoryChannel {
    async fn send(&mut self, envelope: &SubmissionEnvelope) -> Result<(), TransportError> {
        self.state
            .received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(envelope.clone());
        self.pending = Some(envelope.clone());
        Ok(())
    }

    async fn recv(&mut self) -> Result<SubmissionReply, TransportError> {
        let stalled = take_one(&self.state.stalled_replies);
        if stalled {
            std::future::pending::<()>().await;
        }
        if take_one(&self.state.closed_replies) {
            self.pending = None;
            return Err(TransportError::ConnectionClosed);
        }
        let envelope = self.pending.take().ok_or(TransportError::ConnectionClosed)?;
        Ok((self.state.responder)(&envelope))
    }
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

impl Drop for InMemoryChannel {
    fn drop(&mut self) {
        self.state.open_channels.fetch_sub(1, Ordering::SeqCst);
    }
}
