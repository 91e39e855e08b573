//! courier-core
//!
//! Core building blocks for submitting computation tasks to a worker node.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, param, task_type, task, envelope, reply, state, errors）
//! - **codec**: Parameter Codec（文字列文法, スキーマ, wire レコード）
//! - **ports**: 抽象化レイヤー（Transport, IdGenerator, Clock）
//! - **app**: アプリケーションロジック（TaskBuilder, EnvelopeBuilder, SubmitClient）
//! - **impls**: 実装（TcpTransport, InMemoryTransport, StubWorker）
//! - **config**: ClientConfig（toml + 環境変数）

pub mod app;
pub mod codec;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{EnvelopeBuilder, SequenceRegistry, SubmitClient, TaskBuilder};
pub use config::{ClientConfig, ConfigError};
pub use domain::{
    ClientId, JobId, ParamSet, ParamValue, RetCode, SubmissionEnvelope, SubmissionReply,
    SubmitError, TaskDescriptor, TaskId, WorkerId,
};
