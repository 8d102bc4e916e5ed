//! High-level message pipeline.
//!
//! - `Parser`: CAN frames in, decoded `Packet`s out (Fast Packet sequences
//!   reassembled on the way).
//! - `Encoder`: field values in, payload and CAN frames out.
mod encoder;
mod packet;
mod parser;

pub use encoder::{EncodedMessage, Encoder, OutgoingMessage};
pub use packet::{Packet, SequenceInfo};
pub use parser::{Parsed, Parser};

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
