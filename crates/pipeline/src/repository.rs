// Archivo: repository.rs
// Propósito: definir los contratos de los colaboradores externos del
// pipeline (`ObjectStore`, `DeliveryStream`, `MetricSink`,
// `NotificationSink`) y la fuente de tiempo `Clock`. Los motores reciben
// estas capacidades inyectadas; las implementaciones concretas (S3, disco,
// memoria) viven fuera de los motores.
use crate::domain::{BatchWriteOutcome, MetricDatum};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Lectura del object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Devuelve los bytes crudos del objeto `key` en `bucket`.
    ///
    /// Retorna `PipelineError::NotFound` si el objeto no existe y
    /// `PipelineError::AccessDenied` si no hay permiso de lectura.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}

/// Escritura en el delivery stream.
#[async_trait]
pub trait DeliveryStream: Send + Sync {
    /// Envía un lote de payloads opacos. Un `Err` significa que la llamada
    /// completa falló; los rechazos parciales llegan en `BatchWriteOutcome`.
    async fn put_record_batch(&self, stream_name: &str, payloads: Vec<Vec<u8>>) -> Result<BatchWriteOutcome>;

    /// Envía un único payload.
    async fn put_record(&self, stream_name: &str, payload: Vec<u8>) -> Result<()>;
}

/// Ingesta de métricas (fire-and-forget: quien llama sólo registra el fallo).
#[async_trait]
pub trait MetricSink: Send + Sync {
    async fn put_metric_data(&self, namespace: &str, data: Vec<MetricDatum>) -> Result<()>;
}

/// Publicación de notificaciones (fire-and-forget).
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, topic: &str, subject: &str, message: &str) -> Result<()>;
}

/// Fuente de tiempo inyectable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reloj del sistema.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
