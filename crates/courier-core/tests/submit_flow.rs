//! End-to-end submission flow: build → envelope → submit → reply.

use std::sync::Arc;
use std::time::Duration;

use courier_core::codec::{ParamSchema, parse_params};
use courier_core::domain::{ErrorKind, RetCode, SubmissionEnvelope, TaskTypeRegistry};
use courier_core::impls::{InMemoryTransport, StubWorker, TcpTransport, accept_all};
use courier_core::ports::{Endpoint, SequentialIdGenerator, Transport};
use courier_core::{
    ClientId, ParamValue, SequenceRegistry, SubmissionReply, SubmitClient, SubmitError,
    TaskBuilder, TaskDescriptor,
};
use serde_json::json;

fn pir_task(ids: &SequentialIdGenerator) -> TaskDescriptor {
    let params =
        parse_params("pirType:INT32:0:1,outputFullFilename:STRING:0:/data/result/kw_pir_result.csv")
            .unwrap();
    TaskBuilder::new(2, "keyword pir task")
        .language(3)
        .params(params)
        .input_datasets(["serverData"])
        .build(&TaskTypeRegistry::builtin(), ids)
        .unwrap()
}

fn inmem_client(transport: &InMemoryTransport, timeout: Duration) -> SubmitClient {
    SubmitClient::new(
        Arc::new(transport.clone()),
        Endpoint::insecure("inmem:0"),
        ClientId::new("client-1"),
    )
    .with_request_timeout(timeout)
}

#[tokio::test]
async fn keyword_pir_submission_round_trips_in_memory() {
    let transport = InMemoryTransport::accepting();
    let client = inmem_client(&transport, Duration::from_secs(1));
    let ids = SequentialIdGenerator::new("it");

    let task = pir_task(&ids);
    let reply = client.submit_task(task.clone()).await.unwrap();

    assert_eq!(reply.ret_code, RetCode::SUCCESS);
    assert_eq!(reply.job_id, task.job_id().as_str());

    let received = transport.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].task(), &task);
    assert_eq!(received[0].sequence_number(), 1);
    assert_eq!(received[0].client_processed_up_to(), 0);
    assert!(received[0].intended_worker_id().is_unassigned());
    assert_eq!(transport.open_channels(), 0);
}

#[tokio::test]
async fn sequence_numbers_increase_and_acknowledge_previous_replies() {
    let transport = InMemoryTransport::accepting();
    let client = inmem_client(&transport, Duration::from_secs(1));
    let ids = SequentialIdGenerator::new("it");

    for _ in 0..3 {
        client.submit_task(pir_task(&ids)).await.unwrap();
    }

    let received = transport.received();
    let seqs: Vec<u64> = received.iter().map(SubmissionEnvelope::sequence_number).collect();
    let acked: Vec<u64> = received
        .iter()
        .map(SubmissionEnvelope::client_processed_up_to)
        .collect();
    assert_eq!(seqs, vec![1, 2, 3]);
    assert_eq!(acked, vec![0, 1, 2]);
}

#[tokio::test]
async fn clients_sharing_a_registry_never_reuse_numbers() {
    let transport = InMemoryTransport::accepting();
    let sequences = Arc::new(SequenceRegistry::new());
    let a = inmem_client(&transport, Duration::from_secs(1)).with_sequences(Arc::clone(&sequences));
    let b = inmem_client(&transport, Duration::from_secs(1)).with_sequences(Arc::clone(&sequences));
    let ids = SequentialIdGenerator::new("it");

    let (ra, rb) = tokio::join!(a.submit_task(pir_task(&ids)), b.submit_task(pir_task(&ids)));
    ra.unwrap();
    rb.unwrap();

    let mut seqs: Vec<u64> = transport
        .received()
        .iter()
        .map(SubmissionEnvelope::sequence_number)
        .collect();
    seqs.sort_unstable();
    assert_eq!(seqs, vec![1, 2]);
    assert_eq!(sequences.last_issued(&ClientId::new("client-1")), 2);
}

#[tokio::test]
async fn timed_out_submission_can_be_resubmitted_with_the_same_task_id() {
    let transport = InMemoryTransport::accepting();
    transport.stall_replies(1);
    let client = inmem_client(&transport, Duration::from_millis(100));
    let task = pir_task(&SequentialIdGenerator::new("it"));

    let err = client.submit_task(task.clone()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Indeterminate);
    let SubmitError::IndeterminateOutcome { task_id, .. } = &err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(task_id, task.task_id());
    assert_eq!(transport.open_channels(), 0);

    let reply = client.submit_task(task.clone()).await.unwrap();
    assert!(reply.ret_code.is_success());

    let received = transport.received();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].task().task_id(), received[1].task().task_id());
    assert!(received[1].sequence_number() > received[0].sequence_number());
}

#[tokio::test]
async fn rejection_is_passed_through_untouched() {
    let transport = InMemoryTransport::new(Arc::new(|_: &SubmissionEnvelope| SubmissionReply {
        ret_code: RetCode(7),
        job_id: String::new(),
    }));
    let client = inmem_client(&transport, Duration::from_secs(1));

    let reply = client
        .submit_task(pir_task(&SequentialIdGenerator::new("it")))
        .await
        .unwrap();
    assert_eq!(reply.ret_code, RetCode(7));
    assert!(reply.job_id.is_empty());
}

#[tokio::test]
async fn psi_mapping_submission_over_tcp() {
    let worker = StubWorker::bind("127.0.0.1:0", accept_all()).await.unwrap();
    let addr = worker.local_addr().unwrap();
    let server = tokio::spawn(worker.serve());

    let values = json!({
        "clientData": "psi_client_data",
        "serverData": "psi_server_data",
        "clientIndex": 0,
        "serverIndex": 1,
        "psiType": 0,
        "psiTag": 0,
        "outputFullFilename": "/data/result/psi_result.csv",
    });
    let params = ParamSchema::psi()
        .encode(values.as_object().unwrap())
        .unwrap();
    assert_eq!(params.get("clientData"), Some(&ParamValue::string("psi_client_data")));

    let task = TaskBuilder::new(3, "psi task")
        .language(3)
        .params(params)
        .input_datasets(["clientData", "serverData"])
        .build(&TaskTypeRegistry::builtin(), &SequentialIdGenerator::new("tcp"))
        .unwrap();

    let transport: Arc<dyn Transport> = Arc::new(TcpTransport::default());
    let client = SubmitClient::new(transport, Endpoint::insecure(addr.to_string()), ClientId::new("tcp-client"))
        .with_request_timeout(Duration::from_secs(5));

    let first = client.submit_task(task.clone()).await.unwrap();
    let second = client.submit_task(task.clone()).await.unwrap();

    assert_eq!(first.ret_code, RetCode::SUCCESS);
    assert_eq!(first.job_id, "tcp-job-1");
    assert_eq!(second.job_id, "tcp-job-1");
    assert_eq!(client.sequences().processed_up_to(client.client_id()), 2);

    server.abort();
}

#[tokio::test]
async fn unreachable_worker_is_a_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let client = SubmitClient::new(
        Arc::new(TcpTransport::new(Duration::from_secs(2))),
        Endpoint::insecure(addr.to_string()),
        ClientId::new("tcp-client"),
    );

    let err = client
        .submit_task(pir_task(&SequentialIdGenerator::new("it")))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::Transport(_)));
    assert_eq!(err.kind(), ErrorKind::Transient);
}

#[tokio::test]
async fn tls_endpoint_is_refused_by_the_tcp_transport() {
    let client = SubmitClient::new(
        Arc::new(TcpTransport::default()),
        Endpoint {
            address: "127.0.0.1:1".to_string(),
            cert: Some("/etc/courier/ca.pem".into()),
        },
        ClientId::new("tls-client"),
    );

    let err = client
        .submit_task(pir_task(&SequentialIdGenerator::new("it")))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("TLS"));
}
