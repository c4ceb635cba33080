// Archivo: event.rs
// Propósito: decodificar la notificación de escritura en storage
// (`{"Records": [{"s3": {"bucket": {"name"}, "object": {"key"}}}]}`) y
// exponer las referencias de objeto ya des-escapadas.
use crate::decode::decode_key;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageNotification {
  #[serde(rename = "Records", default)]
  pub records: Vec<StorageEventRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEventRecord {
  pub s3: S3Entity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Entity {
  pub bucket: BucketEntity,
  pub object: ObjectEntity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketEntity {
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntity {
  /// Key tal como llega: escapada estilo URL.
  pub key: String,
}

/// Referencia a un objeto con la key ya des-escapada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
  pub bucket: String,
  pub key: String,
}

impl StorageNotification {
  /// Construye una notificación a partir de pares `(bucket, key escapada)`.
  pub fn from_refs(refs: &[(&str, &str)]) -> Self {
    let records = refs.iter()
                      .map(|(bucket, key)| StorageEventRecord { s3: S3Entity { bucket: BucketEntity { name: bucket.to_string() },
                                                                               object: ObjectEntity { key: key.to_string() } } })
                      .collect();
    Self { records }
  }

  pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(raw)
  }

  /// Referencias en el mismo orden que la notificación.
  pub fn objects(&self) -> Vec<ObjectRef> {
    self.records
        .iter()
        .map(|r| ObjectRef { bucket: r.s3.bucket.name.clone(),
                             key: decode_key(&r.s3.object.key) })
        .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_native_shape_and_ignores_extra_fields() {
    let raw = r#"{"Records":[{"eventName":"ObjectCreated:Put","s3":{"bucket":{"name":"b","arn":"x"},"object":{"key":"dir/a+b%21.gz","size":10}}}]}"#;
    let n = StorageNotification::from_json(raw).unwrap();
    assert_eq!(n.objects(), vec![ObjectRef { bucket: "b".into(), key: "dir/a b!.gz".into() }]);
  }

  #[test]
  fn missing_records_is_empty() {
    assert!(StorageNotification::from_json("{}").unwrap().objects().is_empty());
  }
}
