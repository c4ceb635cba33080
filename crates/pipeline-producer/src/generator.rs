// Archivo: generator.rs
// Propósito: generar eventos sintéticos a partir de una fuente de
// aleatoriedad y un reloj inyectados, para que la salida sea reproducible en
// pruebas (semilla fija + `FixedClock`).
use crate::event::{Action, EventRecord, EventStatus, EVENT_SOURCE};
use chrono::SecondsFormat;
use pipeline::Clock;
use rand::Rng;
use std::ops::RangeInclusive;

/// Rango del número que forma `record-NNNN`.
pub const RECORD_ID_RANGE: RangeInclusive<u32> = 1000..=9999;
/// Rango del número que forma `user-NNN`.
pub const USER_ID_RANGE: RangeInclusive<u32> = 100..=999;
/// Rango de `value`.
pub const VALUE_RANGE: RangeInclusive<u32> = 1..=1000;

pub struct EventGenerator<R, C> {
  rng: R,
  clock: C,
}

impl<R, C> EventGenerator<R, C>
  where R: Rng,
        C: Clock
{
  pub fn new(rng: R, clock: C) -> Self {
    Self { rng, clock }
  }

  /// Genera un evento. Los ids pueden repetirse: sólo se busca que sean
  /// aproximadamente distintos.
  pub fn next_record(&mut self) -> EventRecord {
    let timestamp = self.clock.now().to_rfc3339_opts(SecondsFormat::Micros, true);
    EventRecord { id: format!("record-{}", self.rng.random_range(RECORD_ID_RANGE)),
                  timestamp,
                  user_id: format!("user-{}", self.rng.random_range(USER_ID_RANGE)),
                  action: Action::ALL[self.rng.random_range(0..Action::ALL.len())],
                  status: EventStatus::ALL[self.rng.random_range(0..EventStatus::ALL.len())],
                  value: self.rng.random_range(VALUE_RANGE),
                  source: EVENT_SOURCE.to_string() }
  }

  pub fn batch(&mut self, size: usize) -> Vec<EventRecord> {
    (0..size).map(|_| self.next_record()).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{TimeZone, Utc};
  use pipeline::stubs::FixedClock;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn generator(seed: u64) -> EventGenerator<StdRng, FixedClock> {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
    EventGenerator::new(StdRng::seed_from_u64(seed), clock)
  }

  #[test]
  fn same_seed_same_batch() {
    assert_eq!(generator(7).batch(5), generator(7).batch(5));
  }

  #[test]
  fn fields_stay_in_range() {
    let mut g = generator(42);
    for rec in g.batch(200) {
      let id: u32 = rec.id.strip_prefix("record-").unwrap().parse().unwrap();
      let user: u32 = rec.user_id.strip_prefix("user-").unwrap().parse().unwrap();
      assert!(RECORD_ID_RANGE.contains(&id));
      assert!(USER_ID_RANGE.contains(&user));
      assert!(VALUE_RANGE.contains(&rec.value));
      assert_eq!(rec.source, "producer-lambda");
      assert_eq!(rec.timestamp, "2024-05-01T10:00:00.000000Z");
    }
  }
}
