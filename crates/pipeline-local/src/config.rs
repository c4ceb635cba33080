// Archivo: config.rs
// Propósito: construir los backends locales a partir del entorno.
use crate::backends::{FileNotificationSink, FsObjectStore, JsonlDeliveryStream, LogMetricSink};
use pipeline::config::{env_lookup, first_var};
use pipeline::{DeliveryStream, MetricSink, NotificationSink, ObjectStore};
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_DATA_DIR: &str = "./pipeline-data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalConfig {
  pub data_dir: PathBuf,
}

impl LocalConfig {
  pub fn from_env() -> Self {
    Self::from_lookup(env_lookup())
  }

  pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String>
  {
    let dir = first_var(&lookup, &["PIPELINE_DATA_DIR"]).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
    Self { data_dir: PathBuf::from(dir) }
  }
}

/// Los cuatro colaboradores compartiendo el mismo directorio raíz.
#[derive(Clone)]
pub struct LocalBackends {
  pub config: LocalConfig,
  pub objects: Arc<dyn ObjectStore>,
  pub stream: Arc<dyn DeliveryStream>,
  pub metrics: Arc<dyn MetricSink>,
  pub notifier: Arc<dyn NotificationSink>,
}

impl LocalBackends {
  pub fn new(config: LocalConfig) -> Self {
    let root = config.data_dir.clone();
    Self { objects: Arc::new(FsObjectStore::new(&root)),
           stream: Arc::new(JsonlDeliveryStream::new(&root)),
           metrics: Arc::new(LogMetricSink),
           notifier: Arc::new(FileNotificationSink::new(&root)),
           config }
  }
}

/// Carga `.env` y construye los backends desde `PIPELINE_DATA_DIR`.
pub fn new_from_env() -> LocalBackends {
  let config = LocalConfig::from_env();
  log::info!("pipeline-local: usando el directorio de datos {}", config.data_dir.display());
  LocalBackends::new(config)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn data_dir_defaults_when_unset_or_blank() {
    assert_eq!(LocalConfig::from_lookup(|_: &str| None).data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    assert_eq!(LocalConfig::from_lookup(|_: &str| Some("  ".to_string())).data_dir,
               PathBuf::from(DEFAULT_DATA_DIR));
    let cfg = LocalConfig::from_lookup(|k: &str| (k == "PIPELINE_DATA_DIR").then(|| "/tmp/pipe".to_string()));
    assert_eq!(cfg.data_dir, PathBuf::from("/tmp/pipe"));
  }
}
