//! Decrypted payload -> named meter readings.
//!
//! [`HistoryByteExtractor`] is a stand-in: it treats each of the first 15 plaintext bytes as a
//! history slot in hundredths of a cubic metre. A real OMS/W-MBus data-record decoder plugs in
//! behind the same [`ReadingExtractor`] trait without touching hex, cipher or report code.
use std::collections::BTreeMap;

use tracing::debug;

/// Reading name -> value. Iterates (and serializes) in lexicographic key order.
pub type ReadingMap = BTreeMap<String, f64>;

/// Maps decrypted telegram bytes to named numeric readings.
pub trait ReadingExtractor {
    fn extract(&self, plaintext: &[u8]) -> ReadingMap;
}

/// Number of leading plaintext bytes turned into history readings.
pub const HISTORY_SLOTS: usize = 15;

/// Scale applied to each history byte (raw unit: 0.01 m3).
pub const HISTORY_SCALE: f64 = 0.01;

/// Placeholder extractor: byte `i` becomes `consumption_at_history_<i+1>_m3 = byte * 0.01`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryByteExtractor;

pub fn history_key(slot: usize) -> String {
    format!("consumption_at_history_{}_m3", slot)
}

impl ReadingExtractor for HistoryByteExtractor {
    fn extract(&self, plaintext: &[u8]) -> ReadingMap {
        let readings: ReadingMap = plaintext
            .iter()
            .take(HISTORY_SLOTS)
            .enumerate()
            .map(|(i, &b)| (history_key(i + 1), f64::from(b) * HISTORY_SCALE))
            .collect();
        debug!(pt_len = plaintext.len(), readings = readings.len(), "extract: history readings");
        readings
    }
}
