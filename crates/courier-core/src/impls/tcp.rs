//! TcpTransport - NDJSON over TCP
//!
//! 1 回の投入ごとに新しい接続を張り、envelope を 1 行送って reply を 1 行読みます。
//! TLS はサポートしていないので、証明書付きの Endpoint は明示的に拒否します。

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use super::ndjson::NdJsonCodec;
use crate::domain::envelope::SubmissionEnvelope;
use crate::domain::reply::SubmissionReply;
use crate::ports::transport::{Channel, Endpoint, Transport, TransportError};

#[derive(Debug, Clone)]
pub struct TcpTransport {
    connect_timeout: Duration,
}

impl TcpTransport {
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn Channel>, TransportError> {
        if let Some(cert) = &endpoint.cert {
            return Err(TransportError::Unsupported(format!(
                "TLS certificate {} given, but the tcp transport only opens insecure channels",
                cert.display()
            )));
        }

        let stream = tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect(endpoint.address.as_str()),
        )
        .await
        .map_err(|_| TransportError::ConnectTimeout {
            address: endpoint.address.clone(),
            after: self.connect_timeout,
        })?
        .map_err(|e| TransportError::Connect {
            address: endpoint.address.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!(address = %endpoint.address, "connected to worker");
        Ok(Box::new(TcpChannel {
            framed: Framed::new(stream, NdJsonCodec::new()),
        }))
    }
}

/// 1 本の TCP 接続。drop で close されます。
pub struct TcpChannel {
    framed: Framed<TcpStream, NdJsonCodec<SubmissionReply>>,
}

#[async_trait]
impl Channel for TcpChannel {
    async fn send(&mut self, envelope: &SubmissionEnvelope) -> Result<(), TransportError> {
        self.framed
            .send(envelope)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn recv(&mut self) -> Result<SubmissionReply, TransportError> {
        match self.framed.next().await {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(error)) => Err(TransportError::Receive(error.to_string())),
            None => Err(TransportError::ConnectionClosed),
        }
    }
}
