use pipeline::{DeliveryStream, MetricDatum, MetricSink, NotificationSink, ObjectStore, PipelineError};
use pipeline_local::{FileNotificationSink, FsObjectStore, JsonlDeliveryStream, LocalBackends, LocalConfig,
                     LogMetricSink};
use tempfile::TempDir;

#[tokio::test]
async fn object_store_reads_bucket_relative_keys() {
  let dir = TempDir::new().unwrap();
  std::fs::create_dir_all(dir.path().join("raw/2024/05")).unwrap();
  std::fs::write(dir.path().join("raw/2024/05/batch 1.json"), b"{}\n").unwrap();

  let store = FsObjectStore::new(dir.path());
  assert_eq!(store.get_object("raw", "2024/05/batch 1.json").await.unwrap(), b"{}\n".to_vec());

  let missing = store.get_object("raw", "nope.json").await;
  assert!(matches!(missing, Err(PipelineError::NotFound(_))));
  let escape = store.get_object("raw", "../../secret").await;
  assert!(matches!(escape, Err(PipelineError::AccessDenied(_))));
}

#[tokio::test]
async fn delivery_stream_appends_one_line_per_payload() {
  let dir = TempDir::new().unwrap();
  let stream = JsonlDeliveryStream::new(dir.path());

  let outcome = stream.put_record_batch("events", vec![b"{\"a\":1}".to_vec(), b"{\"a\":2}".to_vec()])
                      .await
                      .unwrap();
  assert_eq!(outcome.failed_put_count, 0);
  assert_eq!(outcome.records.len(), 2);
  stream.put_record("events", b"{\"a\":3}\n".to_vec()).await.unwrap();

  let text = std::fs::read_to_string(stream.stream_path("events")).unwrap();
  assert_eq!(text, "{\"a\":1}\n{\"a\":2}\n{\"a\":3}\n");
}

#[tokio::test]
async fn notifications_are_appended_per_topic() {
  let dir = TempDir::new().unwrap();
  let sink = FileNotificationSink::new(dir.path());
  sink.publish("arn:aws:sns:eu-west-1:1:status", "Firehose Pipeline Status: SUCCESS", "{\n  \"x\": 1\n}")
      .await
      .unwrap();
  sink.publish("arn:aws:sns:eu-west-1:1:status", "Firehose Pipeline Status: FAILED", "{}")
      .await
      .unwrap();

  let text = std::fs::read_to_string(sink.topic_path("arn:aws:sns:eu-west-1:1:status")).unwrap();
  let lines: Vec<serde_json::Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
  assert_eq!(lines.len(), 2);
  assert_eq!(lines[0]["subject"], "Firehose Pipeline Status: SUCCESS");
  assert_eq!(lines[0]["message"], "{\n  \"x\": 1\n}");
  assert_eq!(lines[1]["subject"], "Firehose Pipeline Status: FAILED");
}

#[tokio::test]
async fn log_metric_sink_accepts_everything() {
  let sink = LogMetricSink;
  sink.put_metric_data("KinesisFirehose/Pipeline", vec![MetricDatum::count("RecordsConsumed", 3)])
      .await
      .unwrap();
}

#[tokio::test]
async fn backends_share_the_data_dir() {
  let dir = TempDir::new().unwrap();
  let root = dir.path().to_path_buf();
  let backends = LocalBackends::new(LocalConfig { data_dir: root.clone() });
  backends.stream.put_record("logs", b"x".to_vec()).await.unwrap();
  std::fs::create_dir_all(root.join("bucket")).unwrap();
  std::fs::write(root.join("bucket/k"), b"v").unwrap();
  assert_eq!(backends.objects.get_object("bucket", "k").await.unwrap(), b"v".to_vec());
  assert!(root.join("streams/logs.jsonl").exists());
}
