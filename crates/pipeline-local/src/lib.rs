//! Implementación local, sobre el sistema de ficheros, de los colaboradores
//! del pipeline. Sirve para ejecutar productor y consumidor fuera de la nube:
//! los buckets son directorios bajo un directorio raíz, cada delivery stream
//! es un fichero JSONL y cada topic un fichero de log.
//!
//! La configuración sale de `PIPELINE_DATA_DIR` (ver `new_from_env`).

mod backends;
mod config;

pub use backends::{FileNotificationSink, FsObjectStore, JsonlDeliveryStream, LogMetricSink};
pub use config::{new_from_env, LocalBackends, LocalConfig, DEFAULT_DATA_DIR};
