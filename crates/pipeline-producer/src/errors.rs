use thiserror::Error;

// Errores del producer. Sólo se usan dentro de la invocación: hacia fuera se
// convierten en una respuesta 500.
#[derive(Error, Debug)]
pub enum ProducerError {
  /// La llamada al delivery stream falló por completo.
  #[error("{0}")]
  Delivery(#[from] pipeline::PipelineError),

  /// Un registro no se pudo serializar.
  #[error("Error de serialización: {0}")]
  Serialization(#[from] serde_json::Error),
}
