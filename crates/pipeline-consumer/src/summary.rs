// Archivo: summary.rs
// Propósito: resultados por objeto, resumen de la invocación y formato de la
// notificación de estado que se publica al final.
use crate::decode::ObjectCounts;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conteo de un objeto que se pudo leer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectReport {
  pub file: String,
  pub total_records: usize,
  pub valid_records: usize,
  pub invalid_records: usize,
  pub success_rate: f64,
}

impl ObjectReport {
  pub fn from_counts(file: &str, counts: ObjectCounts) -> Self {
    Self { file: file.to_string(),
           total_records: counts.total(),
           valid_records: counts.valid,
           invalid_records: counts.invalid,
           success_rate: counts.success_rate() }
  }
}

/// Objeto que no se pudo leer o decodificar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectFailure {
  pub file: String,
  pub error: String,
}

/// Resultado de un objeto: conteo o error. Se serializa sin etiqueta, como
/// `{file, total_records, ...}` o `{file, error}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectResult {
  Counted(ObjectReport),
  Failed(ObjectFailure),
}

impl ObjectResult {
  pub fn file(&self) -> &str {
    match self {
      ObjectResult::Counted(r) => &r.file,
      ObjectResult::Failed(f) => &f.file,
    }
  }

  /// Registros válidos; un objeto fallido aporta 0.
  pub fn valid_records(&self) -> usize {
    match self {
      ObjectResult::Counted(r) => r.valid_records,
      ObjectResult::Failed(_) => 0,
    }
  }

  pub fn is_failure(&self) -> bool {
    matches!(self, ObjectResult::Failed(_))
  }
}

/// Estado global del lote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PipelineStatus {
  Success,
  Failed,
}

impl fmt::Display for PipelineStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      PipelineStatus::Success => "SUCCESS",
      PipelineStatus::Failed => "FAILED",
    };
    write!(f, "{}", s)
  }
}

/// Agregado de todos los resultados de una invocación, en el orden de la
/// notificación de entrada.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
  pub files_processed: usize,
  pub total_valid_records: usize,
  pub results: Vec<ObjectResult>,
}

impl RunSummary {
  pub fn from_results(results: Vec<ObjectResult>) -> Self {
    let total_valid_records = results.iter().map(ObjectResult::valid_records).sum();
    Self { files_processed: results.len(),
           total_valid_records,
           results }
  }

  /// `SUCCESS` si hubo al menos un registro válido en todo el lote.
  pub fn pipeline_status(&self) -> PipelineStatus {
    if self.total_valid_records > 0 {
      PipelineStatus::Success
    } else {
      PipelineStatus::Failed
    }
  }
}

/// Cuerpo de la notificación de estado. `timestamp` lleva el identificador de
/// la invocación (nombre de campo heredado del formato publicado).
#[derive(Debug, Serialize)]
pub struct StatusNotification<'a> {
  pub pipeline_status: PipelineStatus,
  #[serde(rename = "timestamp")]
  pub invocation_id: &'a str,
  pub summary: &'a RunSummary,
}

impl<'a> StatusNotification<'a> {
  pub fn new(summary: &'a RunSummary, invocation_id: &'a str) -> Self {
    Self { pipeline_status: summary.pipeline_status(),
           invocation_id,
           summary }
  }

  pub fn subject(&self) -> String {
    format!("Firehose Pipeline Status: {}", self.pipeline_status)
  }

  /// JSON indentado con dos espacios.
  pub fn to_message(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn counted(file: &str, valid: usize, invalid: usize) -> ObjectResult {
    ObjectResult::Counted(ObjectReport::from_counts(file, ObjectCounts { valid, invalid }))
  }

  #[test]
  fn failed_entries_contribute_zero() {
    let summary = RunSummary::from_results(vec![counted("a", 2, 1),
                                                ObjectResult::Failed(ObjectFailure { file: "b".into(),
                                                                                     error: "boom".into() }),
                                                counted("c", 0, 4)]);
    assert_eq!(summary.files_processed, 3);
    assert_eq!(summary.total_valid_records, 2);
    assert_eq!(summary.pipeline_status(), PipelineStatus::Success);
  }

  #[test]
  fn empty_run_is_failed() {
    let summary = RunSummary::from_results(vec![]);
    assert_eq!(summary.pipeline_status(), PipelineStatus::Failed);
    assert_eq!(StatusNotification::new(&summary, "req").subject(), "Firehose Pipeline Status: FAILED");
  }

  #[test]
  fn results_serialize_without_tags() {
    let ok = serde_json::to_value(counted("a.gz", 1, 1)).unwrap();
    assert_eq!(ok["file"], "a.gz");
    assert_eq!(ok["success_rate"], 50.0);
    let failed = serde_json::to_value(ObjectResult::Failed(ObjectFailure { file: "b".into(),
                                                                          error: "e".into() })).unwrap();
    assert_eq!(failed, serde_json::json!({"file": "b", "error": "e"}));
  }

  #[test]
  fn notification_message_layout() {
    let summary = RunSummary::from_results(vec![counted("a", 1, 0)]);
    let msg = StatusNotification::new(&summary, "req-1").to_message().unwrap();
    let v: serde_json::Value = serde_json::from_str(&msg).unwrap();
    assert_eq!(v["pipeline_status"], "SUCCESS");
    assert_eq!(v["timestamp"], "req-1");
    assert_eq!(v["summary"]["files_processed"], 1);
    assert_eq!(v["summary"]["results"][0]["valid_records"], 1);
    assert!(msg.contains("\n  \"pipeline_status\""));
  }
}
