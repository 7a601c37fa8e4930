//! Linear decode pipeline: hex(key) -> hex(telegram) -> AES-CTR -> extract -> report.
//!
//! Every stage runs to completion before the next starts; the first error aborts the run and
//! no partial report is produced.
use tracing::{debug, info};

use crate::error::DecodeError;
use crate::readings::{HistoryByteExtractor, ReadingExtractor};
use crate::report::{format_report, Clock, ReportDefaults, SystemClock};
use crate::wmbus_codec::{decode_hex, decrypt_ctr, IvPolicy};

/// Usage line printed for a wrong argument count; `{program}` is filled in by the caller.
pub const USAGE: &str = "<AES-128 key HEX> <W-MBus telegram HEX>";

pub fn usage(program: &str) -> String {
    format!("Usage: {} {}", program, USAGE)
}

/// Split CLI arguments (program name already removed) into `(key_hex, telegram_hex)`.
pub fn parse_args(args: &[String]) -> Result<(&str, &str), DecodeError> {
    match args {
        [key, telegram] => Ok((key.as_str(), telegram.as_str())),
        other => Err(DecodeError::Usage(other.len())),
    }
}

pub struct Pipeline {
    extractor: Box<dyn ReadingExtractor>,
    clock: Box<dyn Clock>,
    defaults: ReportDefaults,
    iv: IvPolicy,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Box::new(HistoryByteExtractor), Box::new(SystemClock), ReportDefaults::default(), IvPolicy::Zero)
    }
}

impl Pipeline {
    pub fn new(extractor: Box<dyn ReadingExtractor>, clock: Box<dyn Clock>, defaults: ReportDefaults, iv: IvPolicy) -> Self {
        Self { extractor, clock, defaults, iv }
    }

    /// Decode one telegram and return the formatted report text.
    pub fn decode_telegram(&self, key_hex: &str, telegram_hex: &str) -> Result<String, DecodeError> {
        let key = decode_hex(key_hex).map_err(|fault| DecodeError::InvalidEncoding { field: "key", fault })?;
        let telegram = decode_hex(telegram_hex).map_err(|fault| DecodeError::InvalidEncoding { field: "telegram", fault })?;
        debug!(key_len = key.len(), telegram_len = telegram.len(), "decode_telegram: inputs decoded");

        let plaintext = decrypt_ctr(&key, &telegram, &self.iv)?;
        let readings = self.extractor.extract(&plaintext);
        let timestamp = self.clock.now();
        let report = format_report(&readings, &timestamp, &self.defaults)?;
        info!(telegram_len = telegram.len(), readings = readings.len(), "decode_telegram: ok");
        Ok(report)
    }
}
