//! NdJsonCodec - 1 行 1 JSON ドキュメントのフレーミング
//!
//! `D` はデコードする型です。エンコードは `Serialize` なら何でも受け付けるので、
//! 同じ codec で「envelope を送って reply を読む」側も
//! 「envelope を読んで reply を返す」側も組めます。
//!
//! 改行が来ないまま上限を超えたフレームは `InvalidData` で打ち切ります。

use bytes::{BufMut, BytesMut};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io;
use std::marker::PhantomData;
use tokio_util::codec::{Decoder, Encoder};

/// 1 フレームの上限。超えたら改行を待たずに `InvalidData` で打ち切る。
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 8 * 1024 * 1024;

#[derive(Debug)]
pub struct NdJsonCodec<D> {
    max_length: usize,
    /// 改行探索を再開する位置（前回までに見た部分は探し直さない）
    next_index: usize,
    marker: PhantomData<D>,
}

impl<D> NdJsonCodec<D> {
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_FRAME_LENGTH)
    }

    /// Frames longer than `max_length` bytes (newline excluded) are rejected.
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
            marker: PhantomData,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    fn too_long(&self) -> io::Error {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame exceeds {} bytes without a newline", self.max_length),
        )
    }
}

impl<D> Default for NdJsonCodec<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, E> Encoder<E> for NdJsonCodec<D>
where
    E: Serialize,
{
    type Error = io::Error;

    fn encode(&mut self, item: E, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_vec(&item)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        dst.reserve(json.len() + 1);
        dst.put_slice(&json);
        dst.put_u8(b'\n');
        Ok(())
    }
}

impl<D> Decoder for NdJsonCodec<D>
where
    D: DeserializeOwned,
{
    type Item = D;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            // 上限 + 改行 1 バイトまでしか見ない
            let window_end = src.len().min(self.max_length.saturating_add(1));
            let newline = src[self.next_index..window_end]
                .iter()
                .position(|byte| *byte == b'\n');

            let Some(offset) = newline else {
                if src.len() > self.max_length {
                    return Err(self.too_long());
                }
                self.next_index = src.len();
                return Ok(None);
            };

            let newline_pos = self.next_index + offset;
            self.next_index = 0;
            let frame = src.split_to(newline_pos + 1);
            let body = frame[..newline_pos].strip_suffix(b"\r").unwrap_or(&frame[..newline_pos]);

            if body.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            return serde_json::from_slice::<D>(body)
                .map(Some)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()));
        }
    }
}
