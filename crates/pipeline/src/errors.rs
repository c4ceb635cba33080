// Archivo: errors.rs
// Propósito: definir los errores compartidos por los colaboradores externos
// (almacenamiento, stream de entrega, métricas, notificaciones) y el alias
// Result<T> usado por las APIs del crate.
use thiserror::Error;

/// Errores comunes de los colaboradores del pipeline.
///
/// - `NotFound` / `AccessDenied`: fallos de lectura del object storage.
/// - `Storage`, `Delivery`, `Publish`, `Metrics`: fallos de transporte de cada
///   colaborador.
/// - `Config`: variable de entorno ausente o inválida.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Objeto inexistente en el bucket.
    #[error("No encontrado: {0}")]
    NotFound(String),
    /// Permiso denegado al leer el objeto.
    #[error("Acceso denegado: {0}")]
    AccessDenied(String),
    /// Error genérico de almacenamiento (S3, disco, etc.).
    #[error("Error de almacenamiento: {0}")]
    Storage(String),
    /// Fallo al escribir en el delivery stream.
    #[error("Error de entrega: {0}")]
    Delivery(String),
    /// Fallo al publicar una notificación.
    #[error("Error de publicación: {0}")]
    Publish(String),
    /// Fallo al enviar métricas.
    #[error("Error de métricas: {0}")]
    Metrics(String),
    /// Configuración ausente o inválida.
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error de serialización: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Error de E/S: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, PipelineError>;
