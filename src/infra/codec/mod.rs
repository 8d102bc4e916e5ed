//! Payload codec, from the bit cursor up to whole messages.
//!
//! - `bits`: LSB-first bit reader and writer.
//! - `numbers`: integer extraction with null sentinels and decimal resolution.
//! - `text`: fixed and variable-length NMEA 2000 strings.
//! - `engine`: walks a `MessageSchema` to extract or inject every field.
pub mod bits;
pub mod engine;
pub mod numbers;
pub mod text;
pub mod traits;
