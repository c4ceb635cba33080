// Archivo: engine.rs
// Propósito: motor de validación y agregación del consumer.
//
// Procesa los objetos de una notificación uno a uno y en orden. Cada objeto
// queda aislado: cualquier fallo de lectura o decodificación se convierte en
// una entrada `{file, error}` y se continúa con el siguiente. Al final se
// agrega el resumen, se publica una notificación y se responde con los
// conteos, aunque la publicación falle.
use crate::decode::{decode_object, tally_lines, ObjectCounts};
use crate::errors::ObjectError;
use crate::event::{ObjectRef, StorageNotification};
use crate::summary::{ObjectFailure, ObjectReport, ObjectResult, RunSummary, StatusNotification};
use log::{error, info, warn};
use pipeline::{ConsumerConfig, InvocationContext, InvocationResponse, MetricDatum, MetricSink, NotificationSink,
               ObjectStore, METRICS_NAMESPACE};
use serde_json::json;
use std::sync::Arc;

pub const RECORDS_CONSUMED_METRIC: &str = "RecordsConsumed";
pub const DATA_QUALITY_METRIC: &str = "DataQuality";

/// Motor del consumer con sus colaboradores inyectados.
pub struct ConsumerEngine {
  store: Arc<dyn ObjectStore>,
  metrics: Arc<dyn MetricSink>,
  notifier: Arc<dyn NotificationSink>,
  config: ConsumerConfig,
}

impl ConsumerEngine {
  pub fn new(store: Arc<dyn ObjectStore>,
             metrics: Arc<dyn MetricSink>,
             notifier: Arc<dyn NotificationSink>,
             config: ConsumerConfig)
             -> Self {
    Self { store, metrics, notifier, config }
  }

  /// Punto de entrada con la notificación en JSON crudo. Un JSON que no
  /// tiene la forma esperada responde 400 sin tocar ningún colaborador.
  pub async fn handle_json(&self, raw: &str, ctx: &InvocationContext) -> InvocationResponse {
    match StorageNotification::from_json(raw) {
      Ok(notification) => self.handle(&notification, ctx).await,
      Err(e) => {
        error!("Consumer: notificación inválida: {}", e);
        InvocationResponse::with_status(400, json!({ "error": format!("notificación inválida: {}", e) }))
      }
    }
  }

  /// Procesa la notificación completa, publica el estado y responde con los
  /// conteos agregados.
  pub async fn handle(&self, notification: &StorageNotification, ctx: &InvocationContext) -> InvocationResponse {
    let summary = self.run(notification).await;
    self.publish_summary(&summary, ctx).await;
    InvocationResponse::ok(json!({
      "processed_files": summary.files_processed,
      "total_valid_records": summary.total_valid_records,
    }))
  }

  /// Valida todos los objetos en orden y agrega el resultado. Nunca falla:
  /// cada objeto produce exactamente una entrada.
  pub async fn run(&self, notification: &StorageNotification) -> RunSummary {
    let objects = notification.objects();
    let mut results = Vec::with_capacity(objects.len());
    for object in &objects {
      results.push(self.process_object(object).await);
    }
    RunSummary::from_results(results)
  }

  /// Procesa un objeto y emite sus métricas si se pudo contar.
  pub async fn process_object(&self, object: &ObjectRef) -> ObjectResult {
    info!("Consumer: procesando s3://{}/{}", object.bucket, object.key);
    match self.validate_object(object).await {
      Ok(counts) => {
        let report = ObjectReport::from_counts(&object.key, counts);
        info!("Consumer: {} - {}/{} registros válidos ({:.1}%)",
              report.file, report.valid_records, report.total_records, report.success_rate);
        self.report_metrics(&report).await;
        ObjectResult::Counted(report)
      }
      Err(e) => {
        error!("Consumer: error procesando {}: {}", object.key, e);
        ObjectResult::Failed(ObjectFailure { file: object.key.clone(),
                                             error: e.to_string() })
      }
    }
  }

  async fn validate_object(&self, object: &ObjectRef) -> Result<ObjectCounts, ObjectError> {
    let raw = self.store.get_object(&object.bucket, &object.key).await?;
    let text = decode_object(&object.key, raw)?;
    Ok(tally_lines(&text))
  }

  async fn report_metrics(&self, report: &ObjectReport) {
    let data = vec![MetricDatum::count(RECORDS_CONSUMED_METRIC, report.valid_records),
                    MetricDatum::percent(DATA_QUALITY_METRIC, report.success_rate)];
    if let Err(e) = self.metrics.put_metric_data(METRICS_NAMESPACE, data).await {
      warn!("Consumer: no se pudieron enviar métricas de {}: {}", report.file, e);
    }
  }

  async fn publish_summary(&self, summary: &RunSummary, ctx: &InvocationContext) {
    let notification = StatusNotification::new(summary, &ctx.request_id);
    let message = match notification.to_message() {
      Ok(m) => m,
      Err(e) => {
        error!("Consumer: no se pudo serializar la notificación: {}", e);
        return;
      }
    };
    match self.notifier.publish(&self.config.notification_topic, &notification.subject(), &message).await {
      Ok(()) => info!("Consumer: notificación enviada - {} registros de {} archivos",
                      summary.total_valid_records, summary.files_processed),
      Err(e) => error!("Consumer: fallo al enviar la notificación: {}", e),
    }
  }
}
