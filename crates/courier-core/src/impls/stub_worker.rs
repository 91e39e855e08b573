//! StubWorker - TCP で envelope を受け取り reply を返すだけの worker
//!
//! 計算は一切しません。ローカルでの動作確認と結合テスト用です。

use futures::{SinkExt, StreamExt};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;

use super::ndjson::NdJsonCodec;
use crate::domain::envelope::SubmissionEnvelope;
use crate::domain::reply::SubmissionReply;

/// Decides the reply for one received envelope.
pub type Responder = Arc<dyn Fn(&SubmissionEnvelope) -> SubmissionReply + Send + Sync>;

/// Accept everything and echo the job id.
pub fn accept_all() -> Responder {
    Arc::new(|envelope: &SubmissionEnvelope| {
        SubmissionReply::accepted(envelope.task().job_id().as_str())
    })
}

pub struct StubWorker {
    listener: TcpListener,
    responder: Responder,
}

impl StubWorker {
    pub async fn bind(addr: &str, responder: Responder) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            responder,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the listener fails.
    pub async fn serve(self) -> io::Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let responder = Arc::clone(&self.responder);
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, responder).await {
                    tracing::warn!(%peer, error = %e, "stub worker connection failed");
                }
            });
        }
    }
}

async fn handle_connection(stream: TcpStream, responder: Responder) -> io::Result<()> {
    let mut framed = Framed::new(stream, NdJsonCodec::<SubmissionEnvelope>::new());
    while let Some(envelope) = framed.next().await {
        let envelope = envelope?;
        let reply = responder(&envelope);
        tracing::info!(
            job_id = %envelope.task().job_id(),
            task_id = %envelope.task().task_id(),
            seq = envelope.sequence_number(),
            client_id = %envelope.submit_client_id(),
            ret_code = %reply.ret_code,
            "stub worker answered submission"
        );
        framed.send(reply).await?;
    }
    Ok(())
}
