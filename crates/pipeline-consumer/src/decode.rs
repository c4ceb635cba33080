// Archivo: decode.rs
// Propósito: pasar de los bytes de un objeto a texto y de ahí al conteo de
// líneas válidas/inválidas. También resuelve el escapado de las keys que
// llegan en la notificación.
use crate::errors::{LineRejection, ObjectError};
use crate::record::ParsedLine;
use flate2::read::MultiGzDecoder;
use log::debug;
use percent_encoding::percent_decode_str;
use std::io::Read;

/// Sufijo que marca un objeto como comprimido con gzip.
pub const GZIP_SUFFIX: &str = ".gz";

/// Deshace el escapado de una key de notificación: `+` pasa a espacio y luego
/// se decodifican las secuencias `%XX`. Secuencias UTF-8 inválidas se
/// reemplazan por U+FFFD.
pub fn decode_key(raw: &str) -> String {
  let spaced = raw.replace('+', " ");
  percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

pub fn is_compressed(key: &str) -> bool {
  key.ends_with(GZIP_SUFFIX)
}

/// Descomprime (si la key lo indica) y decodifica el contenido como UTF-8.
pub fn decode_object(key: &str, raw: Vec<u8>) -> Result<String, ObjectError> {
  let bytes = if is_compressed(key) { gunzip(&raw)? } else { raw };
  Ok(String::from_utf8(bytes)?)
}

fn gunzip(raw: &[u8]) -> Result<Vec<u8>, ObjectError> {
  if raw.is_empty() {
    return Ok(Vec::new());
  }
  let mut out = Vec::new();
  MultiGzDecoder::new(raw).read_to_end(&mut out).map_err(ObjectError::Decompress)?;
  Ok(out)
}

/// Conteo de líneas de un objeto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectCounts {
  pub valid: usize,
  pub invalid: usize,
}

impl ObjectCounts {
  pub fn total(&self) -> usize {
    self.valid + self.invalid
  }

  /// Porcentaje de líneas válidas; 0 cuando no hubo líneas.
  pub fn success_rate(&self) -> f64 {
    let total = self.total();
    if total == 0 {
      return 0.0;
    }
    self.valid as f64 / total as f64 * 100.0
  }

  fn record(&mut self, line: &ParsedLine) {
    match line {
      ParsedLine::Envelope(_) => self.valid += 1,
      ParsedLine::Malformed { reason, .. } => {
        if let LineRejection::Unparseable(msg) = reason {
          debug!("línea descartada: {}", msg);
        }
        self.invalid += 1;
      }
    }
  }
}

/// Separa el texto en líneas y clasifica cada una. Las líneas en blanco se
/// ignoran; una línea inválida nunca interrumpe el resto.
pub fn tally_lines(text: &str) -> ObjectCounts {
  let mut counts = ObjectCounts::default();
  for line in text.trim().split('\n') {
    if line.trim().is_empty() {
      continue;
    }
    counts.record(&ParsedLine::parse(line));
  }
  counts
}

#[cfg(test)]
mod tests {
  use super::*;
  use flate2::write::GzEncoder;
  use flate2::Compression;
  use std::io::Write;

  #[test]
  fn decode_key_handles_plus_and_percent() {
    assert_eq!(decode_key("2024/01/my+file%3A1.gz"), "2024/01/my file:1.gz");
    assert_eq!(decode_key("a%2Bb"), "a+b");
    assert_eq!(decode_key("caf%C3%A9"), "café");
    assert_eq!(decode_key("bad%FF"), "bad\u{FFFD}");
  }

  #[test]
  fn success_rate_never_divides_by_zero() {
    assert_eq!(ObjectCounts::default().success_rate(), 0.0);
    assert_eq!(ObjectCounts { valid: 3, invalid: 0 }.success_rate(), 100.0);
    assert_eq!(ObjectCounts { valid: 1, invalid: 3 }.success_rate(), 25.0);
    let third = ObjectCounts { valid: 1, invalid: 2 }.success_rate();
    assert!((third - 100.0 / 3.0).abs() < 1e-9, "rate = {}", third);
  }

  #[test]
  fn blank_lines_are_skipped() {
    let line = r#"{"original_data":{"id":1,"timestamp":1,"user_id":1,"action":1},"processed_at":1}"#;
    let text = format!("\n\n{line}\r\n   \n{line}\n\n");
    assert_eq!(tally_lines(&text), ObjectCounts { valid: 2, invalid: 0 });
    assert_eq!(tally_lines(""), ObjectCounts::default());
  }

  #[test]
  fn gzip_objects_are_inflated_and_plain_ones_untouched() {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(b"hola\n").unwrap();
    let gz = enc.finish().unwrap();
    assert_eq!(decode_object("x.gz", gz.clone()).unwrap(), "hola\n");
    // without the suffix the gzip bytes are not valid UTF-8
    assert!(matches!(decode_object("x.json", gz), Err(ObjectError::Encoding(_))));
    assert!(matches!(decode_object("x.gz", b"not gzip".to_vec()), Err(ObjectError::Decompress(_))));
  }
}
