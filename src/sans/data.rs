//! States processing data records, and on-demand decoding of their fields.

use alloc::{sync::Arc, vec::Vec};

use chrono::{DateTime, Utc};

use super::{
    codec::{self, Integer},
    definition::{BaseType, FieldDefinition, MessageDefinition},
    header::RecordHeader,
};

/// Global message number of `file_id` messages.
pub const MESSAGE_FILE_ID: u16 = 0;
/// Global message number of `record` messages, holding periodic samples.
pub const MESSAGE_RECORD: u16 = 20;
/// Field number of the `timestamp` field shared by most messages.
pub const FIELD_TIMESTAMP: u8 = 253;

/// Seconds between the Unix epoch and the protocol epoch,
/// 1989-12-31T00:00:00Z.
pub const FIT_EPOCH_OFFSET: i64 = 631_065_600;

/// Timestamps below this value count seconds since device power-on, not
/// since the protocol epoch.
pub const SYSTEM_TIME_THRESHOLD: u32 = 0x1000_0000;

/// State token to decode a data record.
#[derive(Debug)]
pub struct Data(pub(super) ());

impl Data {
    /// Transition to another state by taking the payload of a data record.
    ///
    /// The payload must hold [`MessageDefinition::size`] bytes of the active
    /// definition for the record's local message.
    ///
    /// Returns the record, and a successor state token.
    pub fn advance(
        self,
        definition: Arc<MessageDefinition>,
        payload: Vec<u8>,
    ) -> (Record, RecordHeader) {
        debug_assert_eq!(payload.len(), definition.size());

        (
            Record {
                definition,
                payload,
            },
            RecordHeader(()),
        )
    }
}

/// A decoded field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    SInt8(i8),
    UInt8(u8),
    SInt16(i16),
    UInt16(u16),
    SInt32(i32),
    UInt32(u32),
}

impl FieldValue {
    /// Widen to an `i64`, which holds every variant exactly.
    pub fn as_i64(&self) -> i64 {
        match *self {
            Self::SInt8(x) => x.into(),
            Self::UInt8(x) => x.into(),
            Self::SInt16(x) => x.into(),
            Self::UInt16(x) => x.into(),
            Self::SInt32(x) => x.into(),
            Self::UInt32(x) => x.into(),
        }
    }
}

/// A data record, holding its payload and the definition that shaped it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    definition: Arc<MessageDefinition>,
    payload: Vec<u8>,
}

impl Record {
    /// The global message number.
    pub fn global(&self) -> u16 {
        self.definition.global()
    }

    /// The definition active for this record's local message when it was read.
    pub fn definition(&self) -> &MessageDefinition {
        &self.definition
    }

    /// The undecoded payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Decode a field by number.
    ///
    /// Returns `None` if the definition lacks the field, the field holds the
    /// zero marker of a `z`-suffixed type, or the field's base type is not an
    /// integer of at most 32 bits. Array fields yield their first element.
    pub fn get(&self, field: u8) -> Option<FieldValue> {
        self.definition
            .field(field)
            .and_then(|f| self.decode(f))
    }

    /// Decode a `uint32` field by number as an absolute time.
    ///
    /// Returns `None` if the definition lacks the field, the field is of
    /// another base type, or the value is a system time (relative to device
    /// power-on, below [`SYSTEM_TIME_THRESHOLD`]).
    pub fn get_as_timestamp(&self, field: u8) -> Option<DateTime<Utc>> {
        let f = self.definition.field(field)?;
        if f.base_type != BaseType::UInt32 {
            return None;
        }

        let raw: u32 = self.read(f)?;
        if raw < SYSTEM_TIME_THRESHOLD {
            return None;
        }

        DateTime::from_timestamp(i64::from(raw) + FIT_EPOCH_OFFSET, 0)
    }

    /// Every declared field with its decoded value, in payload order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDefinition, Option<FieldValue>)> {
        self.definition
            .fields()
            .iter()
            .map(|f| (f, self.decode(f)))
    }

    fn decode(&self, f: &FieldDefinition) -> Option<FieldValue> {
        match f.base_type {
            BaseType::SInt8 => self.read(f).map(FieldValue::SInt8),
            BaseType::UInt8 => self.read(f).map(FieldValue::UInt8),
            BaseType::SInt16 => self.read(f).map(FieldValue::SInt16),
            BaseType::UInt16 => self.read(f).map(FieldValue::UInt16),
            BaseType::SInt32 => self.read(f).map(FieldValue::SInt32),
            BaseType::UInt32 => self.read(f).map(FieldValue::UInt32),

            BaseType::UInt8z => self.read_nonzero(f).map(FieldValue::UInt8),
            BaseType::UInt16z => self.read_nonzero(f).map(FieldValue::UInt16),
            BaseType::UInt32z => self.read_nonzero(f).map(FieldValue::UInt32),

            BaseType::Enum
            | BaseType::String
            | BaseType::Float32
            | BaseType::Float64
            | BaseType::Byte
            | BaseType::SInt64
            | BaseType::UInt64
            | BaseType::UInt64z
            | BaseType::Unrecognized(_) => None,
        }
    }

    /// Read the first element of a field, bounded by the field's own bytes.
    fn read<T: Integer>(&self, f: &FieldDefinition) -> Option<T> {
        let end = f.offset + f.size as usize;
        let bytes = self.payload.get(f.offset..end)?;

        codec::read(bytes, &mut 0).ok()
    }

    fn read_nonzero<T: Integer>(&self, f: &FieldDefinition) -> Option<T> {
        self.read(f).filter(|x: &T| !x.is_zero())
    }
}
