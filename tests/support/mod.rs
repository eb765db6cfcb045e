#![allow(dead_code)]

use cadence::sans::check::compute_crc;

/// Builder for documents assembled record by record.
pub struct Document {
    header_size: u8,
    data_size: Option<u32>,
    records: Vec<u8>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            header_size: 12,
            data_size: None,
            records: vec![],
        }
    }

    pub fn extended() -> Self {
        Self::with_header_size(14)
    }

    /// A header of 14 or more bytes, padded with `0xEE` after its check value.
    pub fn with_header_size(header_size: u8) -> Self {
        Self {
            header_size,
            ..Self::new()
        }
    }

    /// Declare a data size other than the length of the records added.
    pub fn data_size(mut self, size: u32) -> Self {
        self.data_size = Some(size);
        self
    }

    pub fn definition(self, local: u8, global: u16, fields: &[(u8, u8, u8)]) -> Self {
        self.definition_with_architecture(local, 0, global, fields)
    }

    pub fn definition_with_architecture(
        mut self,
        local: u8,
        architecture: u8,
        global: u16,
        fields: &[(u8, u8, u8)],
    ) -> Self {
        self.records.push(0x40 | local);
        self.records.push(0);
        self.records.push(architecture);
        self.records.extend_from_slice(&global.to_le_bytes());
        self.records.push(fields.len() as u8);

        for &(field, size, base_type) in fields {
            self.records.extend_from_slice(&[field, size, base_type]);
        }

        self
    }

    pub fn data(mut self, local: u8, payload: &[u8]) -> Self {
        self.records.push(local);
        self.records.extend_from_slice(payload);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.records.extend_from_slice(bytes);
        self
    }

    pub fn record_len(&self) -> usize {
        self.records.len()
    }

    /// Header, records, and a correct trailing check value.
    pub fn build(&self) -> Vec<u8> {
        let data_size = self.data_size.unwrap_or(self.records.len() as u32);

        let mut bytes = vec![self.header_size, 0x20];
        bytes.extend_from_slice(&2132u16.to_le_bytes());
        bytes.extend_from_slice(&data_size.to_le_bytes());
        bytes.extend_from_slice(b".FIT");

        if self.header_size > 12 {
            let crc = compute_crc(0, &bytes);
            bytes.extend_from_slice(&crc.to_le_bytes());
            bytes.resize(self.header_size as usize, 0xEE);
        }

        bytes.extend_from_slice(&self.records);

        let crc = compute_crc(0, &bytes);
        bytes.extend_from_slice(&crc.to_le_bytes());

        bytes
    }
}

// Base type numbers.
pub const ENUM: u8 = 0x00;
pub const SINT8: u8 = 0x01;
pub const UINT8: u8 = 0x02;
pub const SINT16: u8 = 0x83;
pub const UINT16: u8 = 0x84;
pub const SINT32: u8 = 0x85;
pub const UINT32: u8 = 0x86;
pub const STRING: u8 = 0x07;
pub const FLOAT32: u8 = 0x88;
pub const UINT8Z: u8 = 0x0A;
pub const UINT16Z: u8 = 0x8B;
pub const UINT32Z: u8 = 0x8C;
