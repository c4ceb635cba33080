// Archivo: config.rs
// Propósito: configuración por entorno de las invocaciones. Se carga `.env`
// (si existe) antes de leer las variables, igual que los constructores
// `new_from_env` de las persistencias.
use crate::errors::{PipelineError, Result};

/// Carga `.env` del directorio actual si existe. Idempotente.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Primer valor no vacío entre `names`, consultando `lookup` en orden.
pub fn first_var<F>(lookup: &F, names: &[&str]) -> Option<String>
    where F: Fn(&str) -> Option<String>
{
    names.iter()
         .filter_map(|n| lookup(n))
         .map(|v| v.trim().to_string())
         .find(|v| !v.is_empty())
}

/// Igual que `first_var` pero falla con `PipelineError::Config` si ninguna
/// variable está definida.
pub fn require_var<F>(lookup: &F, names: &[&str]) -> Result<String>
    where F: Fn(&str) -> Option<String>
{
    first_var(lookup, names).ok_or_else(|| PipelineError::Config(format!("falta la variable de entorno {}", names.join(" o "))))
}

pub(crate) fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Configuración del producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerConfig {
    pub delivery_stream_name: String,
}

impl ProducerConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
        where F: Fn(&str) -> Option<String>
    {
        Ok(Self { delivery_stream_name: require_var(&lookup, &["DELIVERY_STREAM_NAME"])? })
    }
}

/// Configuración del consumer. `NOTIFICATION_TOPIC` tiene prioridad sobre
/// `SNS_TOPIC_ARN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerConfig {
    pub notification_topic: String,
}

impl ConsumerConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
        where F: Fn(&str) -> Option<String>
    {
        Ok(Self { notification_topic: require_var(&lookup, &["NOTIFICATION_TOPIC", "SNS_TOPIC_ARN"])? })
    }
}

/// Lookup sobre el entorno del proceso, tras cargar `.env`.
pub fn env_lookup() -> impl Fn(&str) -> Option<String> {
    load_dotenv();
    process_env
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn consumer_topic_prefers_notification_topic() {
        let cfg = ConsumerConfig::from_lookup(lookup_from(&[("SNS_TOPIC_ARN", "arn:b"), ("NOTIFICATION_TOPIC", "a")])).unwrap();
        assert_eq!(cfg.notification_topic, "a");
        let cfg = ConsumerConfig::from_lookup(lookup_from(&[("SNS_TOPIC_ARN", "arn:b")])).unwrap();
        assert_eq!(cfg.notification_topic, "arn:b");
    }

    #[test]
    fn missing_stream_name_is_config_error() {
        let err = ProducerConfig::from_lookup(lookup_from(&[("DELIVERY_STREAM_NAME", "  ")])).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
