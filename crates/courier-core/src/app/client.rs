//! SubmitClient - envelope を worker に投げて reply を受け取る
//!
//! # 学習ポイント
//! - グローバル状態を持たず、transport / endpoint / client_id / sequence を所有する
//! - Channel は呼び出しごとに取得し、どの経路でも drop で解放
//! - 「送信前の失敗」は `Transport`、「送信後のタイムアウト」は `IndeterminateOutcome`
//! - 送信後の受信失敗は `Transport` のままだが、`kind()` は Indeterminate
//! - 内部リトライはしない（結果不明のまま再送すると二重実行の判断ができないため）
//!
//! # 状態遷移
//! ```text
//! Built ──> Sent ──> Replied
//!   │         │
//!   └─────────┴────> Failed
//! ```

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::envelope::EnvelopeBuilder;
use super::sequence::SequenceRegistry;
use crate::config::ClientConfig;
use crate::domain::envelope::SubmissionEnvelope;
use crate::domain::errors::SubmitError;
use crate::domain::ids::{ClientId, WorkerId};
use crate::domain::reply::SubmissionReply;
use crate::domain::state::SubmissionState;
use crate::domain::task::TaskDescriptor;
use crate::impls::TcpTransport;
use crate::ports::transport::{Endpoint, Transport, TransportError};

pub struct SubmitClient {
    transport: Arc<dyn Transport>,
    endpoint: Endpoint,
    client_id: ClientId,
    intended_worker: Option<WorkerId>,
    envelopes: EnvelopeBuilder,
    request_timeout: Duration,
}

impl SubmitClient {
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Client with its own sequence registry.
    pub fn new(transport: Arc<dyn Transport>, endpoint: Endpoint, client_id: ClientId) -> Self {
        Self {
            transport,
            endpoint,
            client_id,
            intended_worker: None,
            envelopes: EnvelopeBuilder::new(Arc::new(SequenceRegistry::new())),
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Share a sequence registry with other clients or envelope builders.
    pub fn with_sequences(mut self, sequences: Arc<SequenceRegistry>) -> Self {
        self.envelopes = EnvelopeBuilder::new(sequences);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Default worker for envelopes built by [`SubmitClient::submit_task`].
    pub fn with_intended_worker(mut self, worker: WorkerId) -> Self {
        self.intended_worker = Some(worker);
        self
    }

    /// TCP client wired from a loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        let transport = TcpTransport::new(config.connect_timeout());
        Self::new(Arc::new(transport), config.endpoint(), config.client_id())
            .with_request_timeout(config.request_timeout())
            .with_intended_worker(config.intended_worker())
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn sequences(&self) -> &Arc<SequenceRegistry> {
        self.envelopes.sequences()
    }

    /// Wrap `task` in an envelope numbered for this client.
    pub fn envelope(&self, task: TaskDescriptor) -> SubmissionEnvelope {
        self.envelopes
            .build(task, self.intended_worker.clone(), &self.client_id)
    }

    /// Build the envelope for `task` and submit it.
    pub async fn submit_task(&self, task: TaskDescriptor) -> Result<SubmissionReply, SubmitError> {
        let envelope = self.envelope(task);
        self.submit(&envelope).await
    }

    /// Perform one request/reply exchange.
    ///
    /// The reply is returned as received; a non-success `ret_code` is not an error here.
    pub async fn submit(&self, envelope: &SubmissionEnvelope) -> Result<SubmissionReply, SubmitError> {
        let started = Instant::now();
        let deadline = started + self.request_timeout;
        log_state(envelope, SubmissionState::Built);

        let mut channel = match self.transport.connect(&self.endpoint).await {
            Ok(channel) => channel,
            Err(e) => return Err(self.fail(envelope, e.into())),
        };

        match tokio::time::timeout_at(deadline, channel.send(envelope)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(self.fail(envelope, e.into())),
            Err(_) => {
                let e = TransportError::SendTimeout(self.request_timeout);
                return Err(self.fail(envelope, e.into()));
            }
        }
        log_state(envelope, SubmissionState::Sent);

        let reply = match tokio::time::timeout_at(deadline, channel.recv()).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => return Err(self.fail(envelope, e.into())),
            Err(_) => {
                let e = SubmitError::IndeterminateOutcome {
                    job_id: envelope.task().job_id().clone(),
                    task_id: envelope.task().task_id().clone(),
                    waited: started.elapsed(),
                };
                return Err(self.fail(envelope, e));
            }
        };
        drop(channel);

        self.envelopes
            .sequences()
            .mark_processed(envelope.submit_client_id(), envelope.sequence_number());

        tracing::info!(
            job_id = %envelope.task().job_id(),
            task_id = %envelope.task().task_id(),
            seq = envelope.sequence_number(),
            client_id = %envelope.submit_client_id(),
            state = %SubmissionState::Replied,
            ret_code = %reply.ret_code,
            reply_job_id = %reply.job_id,
            "submission replied"
        );
        Ok(reply)
    }

    fn fail(&self, envelope: &SubmissionEnvelope, error: SubmitError) -> SubmitError {
        tracing::warn!(
            job_id = %envelope.task().job_id(),
            task_id = %envelope.task().task_id(),
            seq = envelope.sequence_number(),
            client_id = %envelope.submit_client_id(),
            state = %SubmissionState::Failed,
            kind = ?error.kind(),
            address = %self.endpoint.address,
            error = %error,
            "submission failed"
        );
        error
    }
}

fn log_state(envelope: &SubmissionEnvelope, state: SubmissionState) {
    tracing::debug!(
        job_id = %envelope.task().job_id(),
        task_id = %envelope.task().task_id(),
        seq = envelope.sequence_number(),
        client_id = %envelope.submit_client_id(),
        state = %state,
        "submission state"
    );
}
