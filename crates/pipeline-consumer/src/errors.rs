use thiserror::Error;

// Errores del consumer.
//
// Dos niveles: `ObjectError` invalida un objeto completo (se convierte en una
// entrada `{file, error}` del resumen) y `LineRejection` invalida una sola
// línea (sólo suma a `invalid_records`).
#[derive(Error, Debug)]
pub enum ObjectError {
  /// El object storage no devolvió el objeto (no existe, sin permiso, ...).
  #[error("{0}")]
  Fetch(#[from] pipeline::PipelineError),

  /// El objeto está marcado como gzip pero no se pudo descomprimir.
  #[error("Error de descompresión: {0}")]
  Decompress(#[source] std::io::Error),

  /// El contenido no es UTF-8 válido.
  #[error("Error de codificación: {0}")]
  Encoding(#[from] std::string::FromUtf8Error),
}

/// Motivo por el que una línea no cuenta como registro válido.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineRejection {
  /// La línea no es JSON.
  #[error("JSON inválido: {0}")]
  Unparseable(String),

  /// JSON válido pero no es un objeto (o `original_data` no lo es).
  #[error("se esperaba un objeto en {0}")]
  NotAnObject(&'static str),

  /// Falta una clave requerida.
  #[error("falta el campo requerido {0}")]
  MissingField(&'static str),
}
