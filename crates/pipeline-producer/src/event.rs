// Archivo: event.rs
// Propósito: el evento sintético que emite el producer y sus vocabularios
// fijos.
use serde::{Deserialize, Serialize};

/// Valor constante del campo `source`.
pub const EVENT_SOURCE: &str = "producer-lambda";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
  Login,
  Logout,
  ViewPage,
  Purchase,
  Search,
}

impl Action {
  pub const ALL: [Action; 5] = [Action::Login, Action::Logout, Action::ViewPage, Action::Purchase, Action::Search];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
  Success,
  Error,
  Pending,
}

impl EventStatus {
  pub const ALL: [EventStatus; 3] = [EventStatus::Success, EventStatus::Error, EventStatus::Pending];
}

/// Evento generado por el producer. El orden de los campos es el orden de
/// serialización.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
  pub id: String,
  /// Instante ISO-8601 UTC con microsegundos y sufijo `Z`.
  pub timestamp: String,
  pub user_id: String,
  pub action: Action,
  pub status: EventStatus,
  pub value: u32,
  pub source: String,
}
