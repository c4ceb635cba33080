use chrono::{TimeZone, Utc};
use pipeline::stubs::{FixedClock, InMemoryDeliveryStream, InMemoryMetricSink};
use pipeline::{ProducerConfig, METRICS_NAMESPACE};
use pipeline_producer::{EventGenerator, EventRecord, Producer, BATCH_SIZE};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::sync::Arc;

type TestProducer = Producer<StdRng, FixedClock>;

fn producer(seed: u64) -> (Arc<InMemoryDeliveryStream>, Arc<InMemoryMetricSink>, TestProducer) {
  let stream = Arc::new(InMemoryDeliveryStream::new());
  let metrics = Arc::new(InMemoryMetricSink::new());
  let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
  let generator = EventGenerator::new(StdRng::seed_from_u64(seed), clock);
  let producer = Producer::new(stream.clone(),
                               metrics.clone(),
                               ProducerConfig { delivery_stream_name: "events".into() },
                               generator);
  (stream, metrics, producer)
}

#[tokio::test]
async fn sends_one_batch_of_five_serialized_events() {
  let (stream, metrics, mut producer) = producer(1);
  let resp = producer.invoke().await;

  assert_eq!(resp.status_code, 200);
  assert_eq!(resp.body_json().unwrap(), json!({"message": "Successfully sent 5 records", "failed_count": 0}));
  assert_eq!(stream.batch_sizes(), vec![BATCH_SIZE]);

  let accepted = stream.accepted();
  assert_eq!(accepted.len(), 5);
  for (name, payload) in &accepted {
    assert_eq!(name, "events");
    let rec: EventRecord = serde_json::from_slice(payload).expect("payload is an event record");
    assert!(rec.id.starts_with("record-"));
    let raw: Value = serde_json::from_slice(payload).unwrap();
    for key in ["id", "timestamp", "user_id", "action", "status", "value", "source"] {
      assert!(raw.get(key).is_some(), "missing {}", key);
    }
  }

  let submissions = metrics.submissions();
  assert_eq!(submissions.len(), 1);
  assert_eq!(submissions[0].0, METRICS_NAMESPACE);
  assert_eq!(metrics.values("RecordsProduced"), vec![5.0]);
}

#[tokio::test]
async fn scenario_e_partial_rejection_is_still_success() {
  let (stream, metrics, mut producer) = producer(2);
  stream.reject_indices(&[0, 4]);

  let resp = producer.invoke().await;
  assert!(resp.is_success());
  assert_eq!(resp.body_json().unwrap(), json!({"message": "Successfully sent 3 records", "failed_count": 2}));
  assert_eq!(metrics.values("RecordsProduced"), vec![3.0]);
  assert_eq!(stream.accepted().len(), 3);
}

#[tokio::test]
async fn total_failure_returns_error_response_without_metric() {
  let (stream, metrics, mut producer) = producer(3);
  stream.fail_with("ResourceNotFoundException");

  let resp = producer.invoke().await;
  assert_eq!(resp.status_code, 500);
  let body = resp.body_json().unwrap();
  assert!(body["error"].as_str().unwrap().contains("ResourceNotFoundException"));
  assert!(metrics.submissions().is_empty());
}

#[tokio::test]
async fn metric_failure_does_not_change_response() {
  let (_stream, metrics, mut producer) = producer(4);
  metrics.fail_with("throttled");
  let resp = producer.invoke().await;
  assert_eq!(resp.status_code, 200);
}

#[tokio::test]
async fn seeded_producers_emit_identical_payloads() {
  let (a, _, mut pa) = producer(99);
  let (b, _, mut pb) = producer(99);
  pa.invoke().await;
  pb.invoke().await;
  assert_eq!(a.accepted(), b.accepted());
}
