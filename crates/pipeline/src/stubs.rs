// Archivo: stubs.rs
// Propósito: implementaciones en memoria de los colaboradores para pruebas y
// wiring rápido.
//
// Cada stub registra las llamadas recibidas y permite programar fallos
// (objetos denegados, rechazos parciales, publicación caída). No son durables.
use crate::domain::{BatchWriteOutcome, MetricDatum, RecordOutcome};
use crate::errors::{PipelineError, Result};
use crate::repository::{Clock, DeliveryStream, MetricSink, NotificationSink, ObjectStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Mapea `Mutex::lock()` en un `Result` con `PipelineError::Storage`.
fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    m.lock().map_err(|e| PipelineError::Storage(format!("mutex poisoned: {:?}", e)))
}

/// Object storage en memoria indexado por `(bucket, key)`.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    denied: Mutex<HashSet<(String, String)>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guarda (o reemplaza) un objeto.
    pub fn put_object(&self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((bucket.to_string(), key.to_string()), data.into());
    }

    /// Marca un objeto como no legible: `get_object` devolverá `AccessDenied`.
    pub fn deny(&self, bucket: &str, key: &str) {
        self.denied
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((bucket.to_string(), key.to_string()));
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let id = (bucket.to_string(), key.to_string());
        if lock(&self.denied)?.contains(&id) {
            return Err(PipelineError::AccessDenied(format!("s3://{}/{}", bucket, key)));
        }
        lock(&self.objects)?.get(&id)
                            .cloned()
                            .ok_or_else(|| PipelineError::NotFound(format!("s3://{}/{}", bucket, key)))
    }
}

/// Delivery stream en memoria. Los payloads aceptados quedan registrados por
/// stream; se pueden programar rechazos por índice dentro del lote o un fallo
/// total de la llamada.
#[derive(Debug, Default)]
pub struct InMemoryDeliveryStream {
    accepted: Mutex<Vec<(String, Vec<u8>)>>,
    batch_sizes: Mutex<Vec<usize>>,
    rejected_indices: Mutex<HashSet<usize>>,
    failure: Mutex<Option<String>>,
}

impl InMemoryDeliveryStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Los registros en estas posiciones de cada lote serán rechazados.
    pub fn reject_indices(&self, indices: &[usize]) {
        let mut set = self.rejected_indices.lock().unwrap_or_else(|e| e.into_inner());
        set.extend(indices.iter().copied());
    }

    /// Todas las llamadas siguientes fallarán con este mensaje.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.to_string());
    }

    /// Payloads aceptados, en orden de llegada.
    pub fn accepted(&self) -> Vec<(String, Vec<u8>)> {
        self.accepted.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Tamaño de cada lote recibido por `put_record_batch`.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn check_failure(&self) -> Result<()> {
        match lock(&self.failure)?.as_ref() {
            Some(msg) => Err(PipelineError::Delivery(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DeliveryStream for InMemoryDeliveryStream {
    async fn put_record_batch(&self, stream_name: &str, payloads: Vec<Vec<u8>>) -> Result<BatchWriteOutcome> {
        self.check_failure()?;
        lock(&self.batch_sizes)?.push(payloads.len());
        let rejected = lock(&self.rejected_indices)?.clone();
        let mut accepted = lock(&self.accepted)?;
        let mut records = Vec::with_capacity(payloads.len());
        for (idx, payload) in payloads.into_iter().enumerate() {
            if rejected.contains(&idx) {
                records.push(RecordOutcome::Rejected { error_code: "ServiceUnavailableException".into(),
                                                       error_message: format!("record {} rejected", idx) });
            } else {
                accepted.push((stream_name.to_string(), payload));
                records.push(RecordOutcome::Accepted { record_id: format!("{}-{}", stream_name, accepted.len()) });
            }
        }
        Ok(BatchWriteOutcome::from_records(records))
    }

    async fn put_record(&self, stream_name: &str, payload: Vec<u8>) -> Result<()> {
        self.check_failure()?;
        lock(&self.accepted)?.push((stream_name.to_string(), payload));
        Ok(())
    }
}

/// Sink de métricas en memoria.
#[derive(Debug, Default)]
pub struct InMemoryMetricSink {
    submissions: Mutex<Vec<(String, Vec<MetricDatum>)>>,
    failure: Mutex<Option<String>>,
}

impl InMemoryMetricSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.to_string());
    }

    /// Cada llamada a `put_metric_data` como `(namespace, datos)`.
    pub fn submissions(&self) -> Vec<(String, Vec<MetricDatum>)> {
        self.submissions.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Todos los puntos recibidos con el nombre dado, en orden.
    pub fn values(&self, metric_name: &str) -> Vec<f64> {
        self.submissions()
            .into_iter()
            .flat_map(|(_, data)| data)
            .filter(|d| d.metric_name == metric_name)
            .map(|d| d.value)
            .collect()
    }
}

#[async_trait]
impl MetricSink for InMemoryMetricSink {
    async fn put_metric_data(&self, namespace: &str, data: Vec<MetricDatum>) -> Result<()> {
        if let Some(msg) = lock(&self.failure)?.as_ref() {
            return Err(PipelineError::Metrics(msg.clone()));
        }
        lock(&self.submissions)?.push((namespace.to_string(), data));
        Ok(())
    }
}

/// Notificación capturada por `InMemoryNotificationSink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedNotification {
    pub topic: String,
    pub subject: String,
    pub message: String,
}

/// Sink de notificaciones en memoria.
#[derive(Debug, Default)]
pub struct InMemoryNotificationSink {
    published: Mutex<Vec<PublishedNotification>>,
    failure: Mutex<Option<String>>,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.to_string());
    }

    pub fn published(&self) -> Vec<PublishedNotification> {
        self.published.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn publish(&self, topic: &str, subject: &str, message: &str) -> Result<()> {
        if let Some(msg) = lock(&self.failure)?.as_ref() {
            return Err(PipelineError::Publish(msg.clone()));
        }
        lock(&self.published)?.push(PublishedNotification { topic: topic.to_string(),
                                                            subject: subject.to_string(),
                                                            message: message.to_string() });
        Ok(())
    }
}

/// Reloj fijo para salidas reproducibles.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
