//! pipeline-consumer: validación y agregación de objetos del pipeline
//!
//! Reacciona a una notificación de escritura en storage: lee cada objeto,
//! lo descomprime si hace falta, valida cada línea contra el esquema del
//! envelope, calcula métricas de calidad por objeto y publica un resumen
//! único del lote.

pub mod decode;
pub mod engine;
pub mod errors;
pub mod event;
pub mod record;
pub mod summary;

pub use decode::{decode_key, tally_lines, ObjectCounts};
pub use engine::ConsumerEngine;
pub use errors::{LineRejection, ObjectError};
pub use event::{ObjectRef, StorageNotification};
pub use record::{ParsedEnvelope, ParsedLine};
pub use summary::{ObjectFailure, ObjectReport, ObjectResult, PipelineStatus, RunSummary, StatusNotification};
