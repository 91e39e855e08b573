//! SequenceRegistry - client ごとのフロー制御カウンタ
//!
//! # 保証
//! - sequence_number は client ごとに 1 から始まる狭義単調増加
//! - 同じ client から並行に投入しても番号は重複しない
//! - processed_up_to は後退しない（reply を消費した最大番号）
//!
//! 番号の払い出しと processed_up_to の読み取りは同じロックの中で行うので、
//! envelope に載る 2 つの値は常に同じ時点のスナップショットです。

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::domain::ids::ClientId;

#[derive(Debug, Default, Clone, Copy)]
struct ClientSequence {
    last_issued: u64,
    processed_up_to: u64,
}

/// Numbers issued to one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceTicket {
    pub sequence_number: u64,
    pub processed_up_to: u64,
}

#[derive(Debug, Default)]
pub struct SequenceRegistry {
    clients: Mutex<HashMap<ClientId, ClientSequence>>,
}

impl SequenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next sequence number for `client`.
    pub fn next(&self, client: &ClientId) -> SequenceTicket {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = clients.entry(client.clone()).or_default();
        entry.last_issued += 1;
        SequenceTicket {
            sequence_number: entry.last_issued,
            processed_up_to: entry.processed_up_to,
        }
    }

    /// Record that the reply to `sequence_number` has been consumed.
    pub fn mark_processed(&self, client: &ClientId, sequence_number: u64) {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = clients.entry(client.clone()).or_default();
        entry.processed_up_to = entry.processed_up_to.max(sequence_number);
    }

    pub fn last_issued(&self, client: &ClientId) -> u64 {
        self.read(client).last_issued
    }

    pub fn processed_up_to(&self, client: &ClientId) -> u64 {
        self.read(client).processed_up_to
    }

    fn read(&self, client: &ClientId) -> ClientSequence {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(client)
            .copied()
            .unwrap_or_default()
    }
}
