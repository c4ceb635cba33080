//! pipeline-producer: generación de eventos hacia el delivery stream
//!
//! Dos productores: el de eventos sintéticos (`Producer`, un lote fijo por
//! tick del scheduler) y el de logs de acceso (`AccessLogHandler`, una
//! entrada por petición HTTP atendida).

pub mod access_log;
pub mod errors;
pub mod event;
pub mod generator;
pub mod producer;

pub use access_log::{AccessLogConfig, AccessLogEntry, AccessLogHandler, HttpRequest, HttpResponse};
pub use errors::ProducerError;
pub use event::{Action, EventRecord, EventStatus};
pub use generator::EventGenerator;
pub use producer::{Producer, BATCH_SIZE};
