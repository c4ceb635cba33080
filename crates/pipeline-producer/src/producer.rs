// Archivo: producer.rs
// Propósito: una invocación del producer: generar el lote, enviarlo en una
// sola escritura al delivery stream y reportar cuántos registros se
// aceptaron. Un único intento; el scheduler externo se encarga del siguiente.
use crate::errors::ProducerError;
use crate::event::EventRecord;
use crate::generator::EventGenerator;
use log::{error, info, warn};
use pipeline::{BatchWriteOutcome, Clock, DeliveryStream, InvocationResponse, MetricDatum, MetricSink, ProducerConfig,
               METRICS_NAMESPACE};
use rand::Rng;
use serde_json::json;
use std::sync::Arc;

/// Registros por invocación.
pub const BATCH_SIZE: usize = 5;

pub const RECORDS_PRODUCED_METRIC: &str = "RecordsProduced";

pub struct Producer<R, C> {
  stream: Arc<dyn DeliveryStream>,
  metrics: Arc<dyn MetricSink>,
  config: ProducerConfig,
  generator: EventGenerator<R, C>,
}

impl<R, C> Producer<R, C>
  where R: Rng,
        C: Clock
{
  pub fn new(stream: Arc<dyn DeliveryStream>,
             metrics: Arc<dyn MetricSink>,
             config: ProducerConfig,
             generator: EventGenerator<R, C>)
             -> Self {
    Self { stream, metrics, config, generator }
  }

  /// Ejecuta un tick. Los rechazos parciales no son un error: se reporta lo
  /// aceptado y se responde 200. Sólo el fallo de la llamada completa
  /// responde 500.
  pub async fn invoke(&mut self) -> InvocationResponse {
    let records = self.generator.batch(BATCH_SIZE);
    match self.send_batch(&records).await {
      Ok(outcome) => {
        let sent = records.len();
        let success_count = sent.saturating_sub(outcome.failed_put_count);
        info!("Producer: enviados {}/{} registros a {}",
              success_count, sent, self.config.delivery_stream_name);
        self.report_produced(success_count).await;
        InvocationResponse::ok(json!({
          "message": format!("Successfully sent {} records", success_count),
          "failed_count": outcome.failed_put_count,
        }))
      }
      Err(e) => {
        error!("Producer: error enviando el lote: {}", e);
        InvocationResponse::failure(&e.to_string())
      }
    }
  }

  async fn send_batch(&self, records: &[EventRecord]) -> Result<BatchWriteOutcome, ProducerError> {
    let payloads = records.iter().map(serde_json::to_vec).collect::<Result<Vec<_>, _>>()?;
    Ok(self.stream.put_record_batch(&self.config.delivery_stream_name, payloads).await?)
  }

  async fn report_produced(&self, count: usize) {
    let data = vec![MetricDatum::count(RECORDS_PRODUCED_METRIC, count)];
    if let Err(e) = self.metrics.put_metric_data(METRICS_NAMESPACE, data).await {
      warn!("Producer: no se pudo enviar la métrica {}: {}", RECORDS_PRODUCED_METRIC, e);
    }
  }
}
