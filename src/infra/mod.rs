//! Infrastructure layer: everything that touches raw payload bytes.
pub mod codec;
