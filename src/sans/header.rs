//! States processing document and record headers.

use either::Either::{self, Left, Right};
use tartan_bitfield::bitfield;
use thiserror::Error;
use zerocopy::FromBytes;

use super::{data::Data, definition::Definition};

/// An error advancing over a document header.
#[derive(Debug, Error)]
pub enum FileHeaderError {
    /// Incorrect filetype marker.
    #[error("Incorrect file type marker.")]
    NotFitData,
    /// Unknown header length.
    #[error("Unknown header length ({0}).")]
    UnknownHeaderLength(u8),
}

/// The leading header of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Length of the header in bytes, 12 or at least 14.
    pub size: u8,
    pub protocol_version: u8,
    pub profile_version: u16,
    /// Number of record bytes between the header and the trailing check.
    pub data_size: u32,
    /// Check over the first 12 header bytes, present in headers longer than
    /// 12 bytes.
    pub crc: Option<u16>,
}

/// State token to decode a document header.
#[derive(Debug)]
pub struct DocumentHeader;

impl DocumentHeader {
    /// Transition to another state by decoding a document header.
    ///
    /// Returns the header, and a successor state token.
    pub fn advance(
        r: [u8; 12],
    ) -> Result<(FileHeader, Either<ExtendedDocumentHeader, RecordHeader>), FileHeaderError> {
        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct RawFileHeader {
            header_size: u8,
            protocol_version: u8,
            profile_version: [u8; 2],
            data_size: [u8; 4],
            data_type: [u8; 4],
        }

        let RawFileHeader {
            header_size,
            protocol_version,
            profile_version,
            data_size,
            data_type,
        } = zerocopy::transmute!(r);

        if &data_type != b".FIT" {
            Err(FileHeaderError::NotFitData)?;
        }

        let header = FileHeader {
            size: header_size,
            protocol_version,
            profile_version: u16::from_le_bytes(profile_version),
            data_size: u32::from_le_bytes(data_size),
            crc: None,
        };

        let successor = match header_size {
            12 => Right(RecordHeader(())),
            14.. => Left(ExtendedDocumentHeader {
                padding: header_size - 14,
            }),
            _ => Err(FileHeaderError::UnknownHeaderLength(header_size))?,
        };

        Ok((header, successor))
    }
}

/// State token to decode additional bytes of an extended document header.
#[derive(Debug)]
pub struct ExtendedDocumentHeader {
    padding: u8,
}

impl ExtendedDocumentHeader {
    /// Transition to another state by decoding the header check value of an
    /// extended document header.
    ///
    /// Returns the header check value, and a successor state token. Headers
    /// longer than 14 bytes continue with padding.
    pub fn advance(self, r: [u8; 2]) -> (u16, Either<HeaderPadding, RecordHeader>) {
        let successor = if self.padding != 0 {
            Left(HeaderPadding { len: self.padding })
        } else {
            Right(RecordHeader(()))
        };

        (u16::from_le_bytes(r), successor)
    }
}

/// State token to skip header bytes following the header check value.
#[derive(Debug)]
pub struct HeaderPadding {
    len: u8,
}

impl HeaderPadding {
    /// Number of bytes expected by [`Self::advance`].
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Transition to another state by skipping the remaining header bytes.
    pub fn advance(self, r: &[u8]) -> RecordHeader {
        debug_assert_eq!(r.len(), self.len());

        RecordHeader(())
    }
}

/// An error advancing over a record header.
#[derive(Debug, Error)]
pub enum RecordHeaderError {
    /// Found a compressed timestamp header (not supported).
    #[error("Found a compressed timestamp header.")]
    CompressedTimestamp,
    /// Found developer data (not supported).
    #[error("Found developer data.")]
    DeveloperData,
}

/// State token to decode a record header.
#[derive(Debug)]
pub struct RecordHeader(pub(super) ());

impl RecordHeader {
    /// Transition to another state by decoding a record header.
    ///
    /// Returns the local message number, and a successor state token.
    pub fn advance(
        self,
        r: [u8; 1],
    ) -> Result<(u8, Either<Definition, Data>), RecordHeaderError> {
        bitfield! {
            struct NormalHeader(u8) {
                [0..4] local_message: u8,
                [5] is_developer,
                [6] is_definition,
                [7] is_compressed,
            }
        }

        let header = NormalHeader(r[0]);

        if header.is_compressed() {
            Err(RecordHeaderError::CompressedTimestamp)?;
        }
        if header.is_developer() {
            Err(RecordHeaderError::DeveloperData)?;
        }

        let successor = if header.is_definition() {
            Left(Definition(()))
        } else {
            Right(Data(()))
        };

        Ok((header.local_message(), successor))
    }
}
