// Archivo: record.rs
// Propósito: clasificar cada línea de un objeto en un registro envuelto
// válido (`ParsedEnvelope`) o en una línea rechazada (`Malformed`).
//
// El contrato es sólo de presencia de claves: `original_data` y
// `processed_at` en el nivel superior, y `id`, `timestamp`, `user_id`,
// `action` dentro de `original_data`. No se validan tipos ni vocabularios.
use crate::errors::LineRejection;
use serde_json::{Map, Value as JsonValue};

/// Claves requeridas en el nivel superior del envelope.
pub const ENVELOPE_FIELDS: [&str; 2] = ["original_data", "processed_at"];

/// Claves requeridas dentro de `original_data`.
pub const ORIGINAL_DATA_FIELDS: [&str; 4] = ["id", "timestamp", "user_id", "action"];

/// Registro envuelto que pasó la validación de esquema. Los valores se
/// conservan tal cual llegaron.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEnvelope {
  pub id: JsonValue,
  pub timestamp: JsonValue,
  pub user_id: JsonValue,
  pub action: JsonValue,
  pub processed_at: JsonValue,
}

/// Resultado de clasificar una línea.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
  Envelope(ParsedEnvelope),
  Malformed { line: String, reason: LineRejection },
}

impl ParsedLine {
  /// Parsea y valida una línea no vacía.
  pub fn parse(line: &str) -> Self {
    match parse_envelope(line) {
      Ok(envelope) => ParsedLine::Envelope(envelope),
      Err(reason) => ParsedLine::Malformed { line: line.to_string(), reason },
    }
  }

  pub fn is_valid(&self) -> bool {
    matches!(self, ParsedLine::Envelope(_))
  }
}

/// Parsea una línea JSON y comprueba el esquema del envelope.
pub fn parse_envelope(line: &str) -> Result<ParsedEnvelope, LineRejection> {
  let value: JsonValue = serde_json::from_str(line).map_err(|e| LineRejection::Unparseable(e.to_string()))?;
  let mut top = match value {
    JsonValue::Object(map) => map,
    _ => return Err(LineRejection::NotAnObject("el registro")),
  };
  require_fields(&top, &ENVELOPE_FIELDS)?;

  let processed_at = top.remove("processed_at").unwrap_or(JsonValue::Null);
  let mut original = match top.remove("original_data") {
    Some(JsonValue::Object(map)) => map,
    _ => return Err(LineRejection::NotAnObject("original_data")),
  };
  require_fields(&original, &ORIGINAL_DATA_FIELDS)?;

  let mut take = |k: &str| original.remove(k).unwrap_or(JsonValue::Null);
  Ok(ParsedEnvelope { id: take("id"),
                      timestamp: take("timestamp"),
                      user_id: take("user_id"),
                      action: take("action"),
                      processed_at })
}

fn require_fields(map: &Map<String, JsonValue>, fields: &[&'static str]) -> Result<(), LineRejection> {
  match fields.iter().find(|f| !map.contains_key(**f)) {
    Some(missing) => Err(LineRejection::MissingField(*missing)),
    None => Ok(()),
  }
}
