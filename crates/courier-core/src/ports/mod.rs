//! Ports - 抽象化レイヤー
//!
//! 外部の協力者（時刻、ID 生成、RPC トランスポート）への
//! インターフェースを定義し、実装の詳細を隠蔽します。

pub mod clock;
pub mod id_generator;
pub mod transport;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, SequentialIdGenerator, UlidGenerator};
pub use self::transport::{Channel, Endpoint, Transport, TransportError};
