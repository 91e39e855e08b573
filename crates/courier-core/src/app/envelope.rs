//! EnvelopeBuilder - TaskDescriptor を SubmissionEnvelope で包む
//!
//! sequence_number / client_processed_up_to は SequenceRegistry から払い出します。
//! 宛先 worker が決まっていなければ sentinel (`WorkerId::UNASSIGNED`) を入れます。

use std::sync::Arc;

use super::sequence::SequenceRegistry;
use crate::domain::envelope::SubmissionEnvelope;
use crate::domain::ids::{ClientId, WorkerId};
use crate::domain::task::TaskDescriptor;

#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    sequences: Arc<SequenceRegistry>,
}

impl EnvelopeBuilder {
    pub fn new(sequences: Arc<SequenceRegistry>) -> Self {
        Self { sequences }
    }

    pub fn sequences(&self) -> &Arc<SequenceRegistry> {
        &self.sequences
    }

    pub fn build(
        &self,
        task: TaskDescriptor,
        intended_worker: Option<WorkerId>,
        client: &ClientId,
    ) -> SubmissionEnvelope {
        let ticket = self.sequences.next(client);
        let worker = intended_worker.unwrap_or_default();

        tracing::trace!(
            client_id = %client,
            seq = ticket.sequence_number,
            processed_up_to = ticket.processed_up_to,
            worker_id = %worker,
            "envelope built"
        );

        SubmissionEnvelope::new(
            worker,
            task,
            ticket.sequence_number,
            ticket.processed_up_to,
            client.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::builder::TaskBuilder;
    use crate::domain::task_type::TaskTypeRegistry;
    use crate::ports::SequentialIdGenerator;

    fn task() -> TaskDescriptor {
        TaskBuilder::new(2, "pir")
            .build(&TaskTypeRegistry::builtin(), &SequentialIdGenerator::new("t"))
            .unwrap()
    }

    #[test]
    fn missing_worker_uses_sentinel() {
        let builder = EnvelopeBuilder::new(Arc::new(SequenceRegistry::new()));
        let envelope = builder.build(task(), None, &ClientId::new("c"));
        assert!(envelope.intended_worker_id().is_unassigned());
        assert_eq!(envelope.sequence_number(), 1);
        assert_eq!(envelope.client_processed_up_to(), 0);
    }

    #[test]
    fn explicit_worker_is_kept() {
        let builder = EnvelopeBuilder::new(Arc::new(SequenceRegistry::new()));
        let envelope = builder.build(task(), Some(WorkerId::new("node-7")), &ClientId::new("c"));
        assert_eq!(envelope.intended_worker_id().as_str(), "node-7");
    }

    #[test]
    fn successive_envelopes_advance_the_sequence() {
        let builder = EnvelopeBuilder::new(Arc::new(SequenceRegistry::new()));
        let client = ClientId::new("c");

        let first = builder.build(task(), None, &client);
        builder.sequences().mark_processed(&client, first.sequence_number());
        let second = builder.build(task(), None, &client);

        assert!(second.sequence_number() > first.sequence_number());
        assert_eq!(second.client_processed_up_to(), first.sequence_number());
        assert_eq!(second.submit_client_id(), &client);
    }

    #[test]
    fn envelope_serializes_with_wire_field_names() {
        let builder = EnvelopeBuilder::new(Arc::new(SequenceRegistry::new()));
        let envelope = builder.build(task(), None, &ClientId::new("client-1"));
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["intended_worker_id"], "1");
        assert_eq!(json["sequence_number"], 1);
        assert_eq!(json["client_processed_up_to"], 0);
        assert_eq!(json["submit_client_id"], "client-1");
        assert_eq!(json["task"]["type"], 2);
    }
}
