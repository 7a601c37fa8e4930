//! Decrypt a single W-MBus telegram (AES-128-CTR) and turn its payload into a JSON meter report.
pub mod error;
pub mod pipeline;
pub mod readings;
pub mod report;
pub mod wmbus_codec;

pub use error::{DecodeError, HexFault};
pub use pipeline::Pipeline;
