//! Decoded message: identifier parts, payload, resolved schema and values.
use crate::core::{FieldKind, FieldMap, FieldSchema, FieldValue, MessageSchema, SchemaEntry};
use crate::infra::codec::engine::{self, Extraction};
use crate::infra::codec::traits::FieldAccess;
use crate::protocol::transport::can_id::CanId;
use std::fmt::Write;
use std::sync::Arc;

/// Where a reassembled payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceInfo {
    pub sequence_id: u8,
    pub total_frames: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub id: CanId,
    pub pgn: u32,
    pub payload: Vec<u8>,
    /// Schema the payload was decoded with (an option, a fallback, or the
    /// single catalog schema).
    pub schema: Arc<MessageSchema>,
    /// Fields positioned for this payload, `unknownData` included.
    pub layout: Vec<FieldSchema>,
    /// One value per `layout` entry.
    pub values: Vec<FieldValue>,
    /// Set when the payload was reassembled from Fast Packet frames.
    pub sequence: Option<SequenceInfo>,
    pub timestamp: Option<String>,
}

impl Packet {
    /// Resolve `entry` against `payload` and extract every field.
    pub fn decode(id: CanId, payload: Vec<u8>, entry: &SchemaEntry) -> Self {
        let (schema, Extraction { layout, values }) = engine::resolve(&payload, entry);
        Self {
            id,
            pgn: id.pgn(),
            payload,
            schema,
            layout,
            values,
            sequence: None,
            timestamp: None,
        }
    }

    pub fn priority(&self) -> u8 {
        self.id.priority()
    }

    pub fn source(&self) -> u8 {
        self.id.source_address()
    }

    pub fn destination(&self) -> u8 {
        self.id.destination()
    }

    /// Catalog id of the schema the payload resolved to.
    pub fn schema_id(&self) -> &str {
        &self.schema.id
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.layout.iter().position(|field| field.id == id)
    }

    /// Raw value of field `id`.
    pub fn field(&self, id: &str) -> Option<&FieldValue> {
        self.position(id).and_then(|index| self.values.get(index))
    }

    /// `(id, value)` pairs in payload order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.layout
            .iter()
            .map(|field| field.id.as_str())
            .zip(self.values.iter())
    }

    /// Every value keyed by field id.
    pub fn fields(&self) -> FieldMap {
        self.entries()
            .map(|(id, value)| (id.to_string(), value.clone()))
            .collect()
    }

    /// Lookup label of field `id`, when it is an enumeration with an entry
    /// for the decoded value.
    pub fn label(&self, id: &str) -> Option<&str> {
        let index = self.position(id)?;
        match &self.layout[index].kind {
            FieldKind::Lookup(table) => table.label(self.values.get(index)?.as_u64()?),
            _ => None,
        }
    }

    /// Identity of the message stream: the CAN id in hex followed by the
    /// value of every differentiator field (`ff` when unavailable).
    pub fn message_key(&self) -> String {
        let mut key = format!("{:08x}", self.id.0);
        for field in self.schema.differentiators() {
            // Writing to a String cannot fail.
            let _ = match self.field(&field.id) {
                Some(FieldValue::U64(v)) => write!(key, "{v:02x}"),
                Some(FieldValue::I64(v)) => write!(key, "{v:02x}"),
                Some(FieldValue::Null) | None => write!(key, "ff"),
                Some(other) => write!(key, "{other}"),
            };
        }
        key
    }
}

impl FieldAccess for Packet {
    fn field(&self, id: &str) -> Option<&FieldValue> {
        Packet::field(self, id)
    }
}
