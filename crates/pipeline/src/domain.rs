// Archivo: domain.rs
// Propósito: tipos de intercambio con los colaboradores externos (métricas,
// resultados de escritura en lote) y el contrato de respuesta de cada
// invocación.
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Namespace fijo bajo el que se publican todas las métricas del pipeline.
pub const METRICS_NAMESPACE: &str = "KinesisFirehose/Pipeline";

/// Unidad de una métrica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricUnit {
    Count,
    Percent,
}

/// Un punto de métrica tal como se entrega al `MetricSink`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDatum {
    pub metric_name: String,
    pub value: f64,
    pub unit: MetricUnit,
}

impl MetricDatum {
    /// Métrica de conteo (registros producidos, consumidos...).
    pub fn count(name: &str, value: usize) -> Self {
        Self { metric_name: name.to_string(),
               value: value as f64,
               unit: MetricUnit::Count }
    }

    /// Métrica porcentual (calidad de datos).
    pub fn percent(name: &str, value: f64) -> Self {
        Self { metric_name: name.to_string(),
               value,
               unit: MetricUnit::Percent }
    }
}

/// Resultado individual de un registro dentro de una escritura en lote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordOutcome {
    Accepted { record_id: String },
    Rejected { error_code: String, error_message: String },
}

impl RecordOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, RecordOutcome::Rejected { .. })
    }
}

/// Respuesta del delivery stream a un `put_record_batch`.
///
/// `failed_put_count` es la cifra que reporta el destino; `records` conserva el
/// orden de los payloads enviados.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchWriteOutcome {
    pub failed_put_count: usize,
    pub records: Vec<RecordOutcome>,
}

impl BatchWriteOutcome {
    /// Construye el resultado a partir de los resultados por registro,
    /// derivando `failed_put_count`.
    pub fn from_records(records: Vec<RecordOutcome>) -> Self {
        let failed_put_count = records.iter().filter(|r| r.is_rejected()).count();
        Self { failed_put_count, records }
    }
}

/// Contexto de una invocación (producer o consumer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationContext {
    /// Identificador de la invocación; se publica en la notificación de estado.
    pub request_id: String,
}

impl InvocationContext {
    /// Contexto con un identificador aleatorio.
    pub fn new() -> Self {
        Self { request_id: Uuid::new_v4().to_string() }
    }

    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self { request_id: request_id.into() }
    }
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Respuesta estructurada de una invocación: código de estado y un cuerpo JSON
/// serializado como string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn ok(body: JsonValue) -> Self {
        Self { status_code: 200,
               body: body.to_string() }
    }

    pub fn with_status(status_code: u16, body: JsonValue) -> Self {
        Self { status_code,
               body: body.to_string() }
    }

    pub fn failure(message: &str) -> Self {
        Self::with_status(500, serde_json::json!({ "error": message }))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Decodifica el cuerpo de vuelta a JSON.
    pub fn body_json(&self) -> crate::errors::Result<JsonValue> {
        Ok(serde_json::from_str(&self.body)?)
    }
}
