//! Creation and extraction of the 29-bit CAN identifiers used by
//! NMEA 2000 (derived from the SAE J1939 specification).
//!
//! | bits  | 28..26   | 25       | 24        | 23..16 | 15..8 | 7..0   |
//! |-------|----------|----------|-----------|--------|-------|--------|
//! | field | priority | reserved | data page | PF     | PS    | source |
//!
//! PF below 240 is PDU1: PS is the destination address. Otherwise PDU2:
//! PS extends the PGN and the destination is implicitly global (0xFF).
use crate::conf::{DEFAULT_CAN_PRIORITY, GLOBAL_ADDRESS};
use std::num::ParseIntError;
use std::str::FromStr;

const PDU2_THRESHOLD: u32 = 240;

//==================================================================================CAN_ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Encapsulates an extended CAN identifier (29 bits) and exposes accessors
/// for priority, PGN, destination, and source.
pub struct CanId(pub u32);

/// Decomposed identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanIdParts {
    pub priority: u8,
    pub pgn: u32,
    pub source: u8,
    /// 0xFF for PDU2 (broadcast) PGNs.
    pub destination: u8,
}

/// PDU1 PGNs (PF below 240) carry an explicit destination.
pub fn is_addressable(pgn: u32) -> bool {
    ((pgn >> 8) & 0xFF) < PDU2_THRESHOLD
}

impl CanId {
    /// Creates a pre-configured `CanIdBuilder` for a PGN and source address.
    pub fn builder(pgn: u32, source_address: u8) -> CanIdBuilder {
        CanIdBuilder::new(pgn, source_address)
    }

    /// Encode decomposed parts. The priority is clamped to 7 and the
    /// destination is dropped for PDU2 PGNs.
    pub fn encode(parts: &CanIdParts) -> Self {
        let priority = parts.priority.min(7) as u32;
        let pgn = parts.pgn & 0x1FFFF;
        let id = (priority << 26) | (pgn << 8) | parts.source as u32;
        if is_addressable(pgn) {
            CanId((id & !0xFF00) | ((parts.destination as u32) << 8))
        } else {
            CanId(id)
        }
    }

    /// Returns the priority (3 bits, value 0-7) encoded in the CAN ID.
    pub fn priority(&self) -> u8 {
        ((self.0 >> 26) & 0x07) as u8
    }

    /// Data page bit (bit 24).
    pub fn data_page(&self) -> u8 {
        ((self.0 >> 24) & 0x01) as u8
    }

    /// PDU format byte (PF).
    pub fn pdu_format(&self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    /// PDU specific byte (PS): destination for PDU1, group extension for PDU2.
    pub fn pdu_specific(&self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    fn is_pdu2(&self) -> bool {
        self.pdu_format() as u32 >= PDU2_THRESHOLD
    }

    /// Extracts the PGN, handling the PDU1/PDU2 distinction.
    pub fn pgn(&self) -> u32 {
        let dp = self.data_page() as u32;
        let pf = self.pdu_format() as u32;
        let ps = self.pdu_specific() as u32;

        if self.is_pdu2() {
            (dp << 16) | (pf << 8) | ps
        } else {
            (dp << 16) | (pf << 8)
        }
    }

    /// Destination address; 0xFF (global) for PDU2 identifiers.
    pub fn destination(&self) -> u8 {
        if self.is_pdu2() {
            GLOBAL_ADDRESS
        } else {
            self.pdu_specific()
        }
    }

    /// Eight-bit source address (logical node identifier on the N2K network).
    pub fn source_address(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Alias of [`CanId::source_address`].
    pub fn source(&self) -> u8 {
        self.source_address()
    }

    pub fn decode(raw: u32) -> CanIdParts {
        CanId(raw & 0x1FFF_FFFF).parts()
    }

    pub fn parts(&self) -> CanIdParts {
        CanIdParts {
            priority: self.priority(),
            pgn: self.pgn(),
            source: self.source_address(),
            destination: self.destination(),
        }
    }
}

impl From<CanIdParts> for CanId {
    fn from(parts: CanIdParts) -> Self {
        CanId::encode(&parts)
    }
}

impl FromStr for CanId {
    type Err = ParseIntError;

    /// Accepts hexadecimal with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits);
        u32::from_str_radix(digits, 16).map(CanId)
    }
}

impl std::fmt::Display for CanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}
//==================================================================================CAN_ID_BUILDER
#[derive(Debug, Clone)]
/// Fluent builder over `CanIdParts`.
pub struct CanIdBuilder {
    parts: CanIdParts,
}

impl CanIdBuilder {
    /// Initializes the builder for a given PGN and source address,
    /// with priority 6 and a global destination.
    pub fn new(pgn: u32, source_address: u8) -> Self {
        Self {
            parts: CanIdParts {
                priority: DEFAULT_CAN_PRIORITY,
                pgn,
                source: source_address,
                destination: GLOBAL_ADDRESS,
            },
        }
    }

    /// Sets the priority; values above 7 are clamped.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.parts.priority = priority.min(7);
        self
    }

    /// Assigns a destination address. Ignored for PDU2 PGNs.
    pub fn to_destination(mut self, destination_address: u8) -> Self {
        self.parts.destination = destination_address;
        self
    }

    pub fn build(self) -> CanId {
        CanId::encode(&self.parts)
    }
}
//==================================================================================TESTS
#[cfg(test)]
#[path = "tests.rs"]
mod tests;
