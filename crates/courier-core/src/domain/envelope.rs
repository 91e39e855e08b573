//! SubmissionEnvelope - 1 回の投入に付くルーティング・フロー制御情報
//!
//! # フィールド
//! - intended_worker_id: 宛先 worker（未解決なら sentinel "1"）
//! - task: TaskDescriptor
//! - sequence_number: client ごとの単調増加カウンタ
//! - client_processed_up_to: client が消費済みの最大 reply 番号
//! - submit_client_id: 投入元 client

use serde::{Deserialize, Serialize};

use super::ids::{ClientId, WorkerId};
use super::task::TaskDescriptor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionEnvelope {
    intended_worker_id: WorkerId,
    task: TaskDescriptor,
    sequence_number: u64,
    client_processed_up_to: u64,
    submit_client_id: ClientId,
}

impl SubmissionEnvelope {
    pub(crate) fn new(
        intended_worker_id: WorkerId,
        task: TaskDescriptor,
        sequence_number: u64,
        client_processed_up_to: u64,
        submit_client_id: ClientId,
    ) -> Self {
        Self {
            intended_worker_id,
            task,
            sequence_number,
            client_processed_up_to,
            submit_client_id,
        }
    }

    pub fn intended_worker_id(&self) -> &WorkerId {
        &self.intended_worker_id
    }

    pub fn task(&self) -> &TaskDescriptor {
        &self.task
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn client_processed_up_to(&self) -> u64 {
        self.client_processed_up_to
    }

    pub fn submit_client_id(&self) -> &ClientId {
        &self.submit_client_id
    }

    pub fn into_task(self) -> TaskDescriptor {
        self.task
    }
}
