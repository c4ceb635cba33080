//! Crate `pipeline`: tipos y contratos compartidos del pipeline de registros
//!
//! Define los contratos de los colaboradores externos (`ObjectStore`,
//! `DeliveryStream`, `MetricSink`, `NotificationSink`, `Clock`), los tipos de
//! intercambio (`MetricDatum`, `BatchWriteOutcome`, `InvocationResponse`), la
//! configuración por entorno y stubs en memoria para pruebas.
//!
//! Los motores (`pipeline-producer`, `pipeline-consumer`) reciben estas
//! capacidades inyectadas; ninguna invocación comparte estado con otra.
//!
//! Ejemplo rápido:
//! ```rust
//! use pipeline::stubs::InMemoryObjectStore;
//! use pipeline::ObjectStore;
//! let store = InMemoryObjectStore::new();
//! store.put_object("bucket", "a.json", b"{}".to_vec());
//! ```
pub mod config;
pub mod domain;
pub mod errors;
pub mod repository;
pub mod stubs;

pub use config::{ConsumerConfig, ProducerConfig};
pub use domain::*;
pub use errors::*;
pub use repository::*;
