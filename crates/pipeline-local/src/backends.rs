// Archivo: backends.rs
// Propósito: backends de ficheros para los traits del pipeline.
//
// Disposición bajo el directorio raíz:
//   <root>/<bucket>/<key>           objetos
//   <root>/streams/<stream>.jsonl   un payload por línea
//   <root>/topics/<topic>.log       una notificación JSON por línea
use async_trait::async_trait;
use log::info;
use pipeline::{BatchWriteOutcome, DeliveryStream, MetricDatum, MetricSink, NotificationSink, ObjectStore,
               PipelineError, RecordOutcome, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Traduce errores de E/S a la taxonomía del pipeline.
fn map_io(err: std::io::Error, what: &str) -> PipelineError {
  match err.kind() {
    ErrorKind::NotFound => PipelineError::NotFound(what.to_string()),
    ErrorKind::PermissionDenied => PipelineError::AccessDenied(what.to_string()),
    _ => {
      log::warn!("E/S en {}: {}", what, err);
      PipelineError::Io(err)
    }
  }
}

/// Une `rel` a `root` rechazando rutas absolutas o con `..`.
fn confined(root: &Path, rel: &str) -> Result<PathBuf> {
  let rel_path = Path::new(rel);
  if rel.is_empty() || rel_path.components().any(|c| !matches!(c, Component::Normal(_))) {
    return Err(PipelineError::AccessDenied(format!("ruta fuera del directorio de datos: {}", rel)));
  }
  Ok(root.join(rel_path))
}

/// Nombre de fichero seguro para un stream o topic (los ARN llevan `:`).
fn file_stem(name: &str) -> String {
  name.chars()
      .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
      .collect()
}

async fn append(path: &Path, bytes: &[u8]) -> Result<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).await.map_err(|e| map_io(e, &parent.display().to_string()))?;
  }
  let what = path.display().to_string();
  let mut file = OpenOptions::new().create(true)
                                   .append(true)
                                   .open(path)
                                   .await
                                   .map_err(|e| map_io(e, &what))?;
  file.write_all(bytes).await.map_err(|e| map_io(e, &what))?;
  file.flush().await.map_err(|e| map_io(e, &what))
}

/// Object store sobre directorios: el bucket es un subdirectorio de la raíz y
/// la clave una ruta relativa dentro de él.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
  root: PathBuf,
}

impl FsObjectStore {
  pub fn new(root: impl AsRef<Path>) -> Self {
    Self { root: root.as_ref().to_path_buf() }
  }

  pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
    let bucket_dir = confined(&self.root, bucket)?;
    confined(&bucket_dir, key)
  }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
  async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
    let path = self.object_path(bucket, key)?;
    fs::read(&path).await.map_err(|e| map_io(e, &format!("{}/{}", bucket, key)))
  }
}

/// Delivery stream que agrega cada payload como una línea de
/// `<root>/streams/<stream>.jsonl`. Nunca rechaza registros individuales.
#[derive(Debug)]
pub struct JsonlDeliveryStream {
  root: PathBuf,
  write_lock: Mutex<()>,
}

impl JsonlDeliveryStream {
  pub fn new(root: impl AsRef<Path>) -> Self {
    Self { root: root.as_ref().to_path_buf(),
           write_lock: Mutex::new(()) }
  }

  pub fn stream_path(&self, stream_name: &str) -> PathBuf {
    self.root.join("streams").join(format!("{}.jsonl", file_stem(stream_name)))
  }
}

fn as_line(mut payload: Vec<u8>) -> Vec<u8> {
  if payload.last() != Some(&b'\n') {
    payload.push(b'\n');
  }
  payload
}

#[async_trait]
impl DeliveryStream for JsonlDeliveryStream {
  async fn put_record_batch(&self, stream_name: &str, payloads: Vec<Vec<u8>>) -> Result<BatchWriteOutcome> {
    let _guard = self.write_lock.lock().await;
    let path = self.stream_path(stream_name);
    let count = payloads.len();
    let buf: Vec<u8> = payloads.into_iter().flat_map(as_line).collect();
    append(&path, &buf).await?;
    let records = (1..=count).map(|n| RecordOutcome::Accepted { record_id: format!("{}-{}", stream_name, n) })
                             .collect();
    Ok(BatchWriteOutcome::from_records(records))
  }

  async fn put_record(&self, stream_name: &str, payload: Vec<u8>) -> Result<()> {
    let _guard = self.write_lock.lock().await;
    append(&self.stream_path(stream_name), &as_line(payload)).await
  }
}

/// Sink de métricas que sólo escribe cada punto en el log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMetricSink;

#[async_trait]
impl MetricSink for LogMetricSink {
  async fn put_metric_data(&self, namespace: &str, data: Vec<MetricDatum>) -> Result<()> {
    for datum in &data {
      info!("metric {}/{} = {} ({:?})", namespace, datum.metric_name, datum.value, datum.unit);
    }
    Ok(())
  }
}

/// Sink de notificaciones que agrega cada publicación como una línea JSON
/// (`{"subject", "message"}`) en `<root>/topics/<topic>.log`.
#[derive(Debug)]
pub struct FileNotificationSink {
  root: PathBuf,
  write_lock: Mutex<()>,
}

impl FileNotificationSink {
  pub fn new(root: impl AsRef<Path>) -> Self {
    Self { root: root.as_ref().to_path_buf(),
           write_lock: Mutex::new(()) }
  }

  pub fn topic_path(&self, topic: &str) -> PathBuf {
    self.root.join("topics").join(format!("{}.log", file_stem(topic)))
  }
}

#[async_trait]
impl NotificationSink for FileNotificationSink {
  async fn publish(&self, topic: &str, subject: &str, message: &str) -> Result<()> {
    let line = serde_json::json!({ "subject": subject, "message": message });
    let mut bytes = serde_json::to_vec(&line)?;
    bytes.push(b'\n');
    let _guard = self.write_lock.lock().await;
    append(&self.topic_path(topic), &bytes).await.map_err(|e| PipelineError::Publish(e.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn confined_rejects_escapes() {
    let root = Path::new("/data");
    assert_eq!(confined(root, "logs/2024/a.gz").unwrap(), PathBuf::from("/data/logs/2024/a.gz"));
    assert!(matches!(confined(root, "../etc/passwd"), Err(PipelineError::AccessDenied(_))));
    assert!(matches!(confined(root, "/etc/passwd"), Err(PipelineError::AccessDenied(_))));
    assert!(matches!(confined(root, ""), Err(PipelineError::AccessDenied(_))));
  }

  #[test]
  fn io_errors_map_to_pipeline_taxonomy() {
    let not_found = map_io(std::io::Error::from(ErrorKind::NotFound), "b/k");
    assert!(matches!(not_found, PipelineError::NotFound(ref w) if w == "b/k"));
    let denied = map_io(std::io::Error::from(ErrorKind::PermissionDenied), "b/k");
    assert!(matches!(denied, PipelineError::AccessDenied(_)));
    let other = map_io(std::io::Error::new(ErrorKind::InvalidData, "disco roto"), "b/k");
    match other {
      PipelineError::Io(e) => assert_eq!(e.kind(), ErrorKind::InvalidData),
      e => panic!("se esperaba Io, llegó {:?}", e),
    }
  }

  #[test]
  fn topic_names_become_safe_file_stems() {
    assert_eq!(file_stem("arn:aws:sns:us-east-1:123:status"), "arn_aws_sns_us-east-1_123_status");
  }
}
