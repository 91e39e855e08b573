//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **TcpTransport**: NDJSON over TCP（本番用）
//! - **InMemoryTransport**: 開発・テスト用のトランスポート
//! - **StubWorker**: envelope を受けて reply を返すだけの TCP worker

pub mod inmem_transport;
pub mod ndjson;
pub mod stub_worker;
pub mod tcp;

// 主要な型を再エクスポート
pub use self::inmem_transport::InMemoryTransport;
pub use self::ndjson::{DEFAULT_MAX_FRAME_LENGTH, NdJsonCodec};
pub use self::stub_worker::{Responder, StubWorker, accept_all};
pub use self::tcp::{TcpChannel, TcpTransport};
