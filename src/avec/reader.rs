//! Reader-based decoder implementation.
//!
//! _Requires Cargo feature `std`._

use std::{
    fs::File,
    io::{BufReader, Read},
    iter::FusedIterator,
    path::Path,
    vec,
    vec::Vec,
};

use alloc::sync::Arc;
use either::Either::{Left, Right};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::sans::{
    Decoder,
    check::Crc,
    data::{Data, Record},
    definition::{Definition, DefinitionTable, UndefinedLocalMessage},
    header::{FileHeader, FileHeaderError, RecordHeader, RecordHeaderError},
};

/// Errors occurring while decoding from a reader.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader, including a document ending early.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Incorrect file header.
    #[error("Incorrect file header: {0}")]
    Header(#[from] FileHeaderError),
    /// Found an unsupported compressed timestamp header.
    #[error("Found an unsupported compressed timestamp header.")]
    CompressedTimestamp,
    /// Found unsupported developer data.
    #[error("Found unsupported developer data.")]
    Developer,
    /// A data record referenced a local message with no definition.
    #[error(transparent)]
    UndefinedLocalMessage(#[from] UndefinedLocalMessage),
    /// A record extends past the end of the data section.
    #[error("A record extends past the end of the data section ({data_size} bytes).")]
    Overrun { data_size: u32 },
}

impl From<RecordHeaderError> for Error {
    fn from(err: RecordHeaderError) -> Self {
        match err {
            RecordHeaderError::CompressedTimestamp => Self::CompressedTimestamp,
            RecordHeaderError::DeveloperData => Self::Developer,
        }
    }
}

/// Outcome of a cyclic redundancy check over a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrity {
    /// Calculated and found values match.
    Valid,
    /// Calculated and found values do not match.
    Mismatch { found: u16, calculated: u16 },
}

impl Integrity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Open a document on disk, and decode its header.
///
/// The file is closed when the returned iterator is dropped.
pub fn open(path: impl AsRef<Path>, validate_crc: bool) -> Result<Records<BufReader<File>>, Error> {
    let file = File::open(path)?;
    parse(BufReader::new(file), validate_crc)
}

/// Decode the header of a document from a reader, returning an iterator over
/// its data records.
///
/// If `validate_crc` is set, a check value is accumulated while reading, and
/// compared against the document's trailing check value once the last record
/// has been read. See [`Records::integrity`].
pub fn parse<R: Read>(mut r: R, validate_crc: bool) -> Result<Records<R>, Error> {
    let mut crc = validate_crc.then(Crc::new);
    let (header, state) = decode_header(&mut r, crc.as_mut())?;

    debug!(
        size = header.size,
        protocol_version = header.protocol_version,
        profile_version = header.profile_version,
        data_size = header.data_size,
        "Decoded file header"
    );

    Ok(Records {
        r,
        header,
        state: Some(state),
        definitions: DefinitionTable::new(),
        consumed: 0,
        records: 0,
        crc,
        integrity: None,
    })
}

/// Decode only the header of a document from a reader.
pub fn read_file_header(r: &mut impl Read) -> Result<FileHeader, Error> {
    Ok(decode_header(r, None)?.0)
}

fn decode_header(
    r: &mut impl Read,
    mut c: Option<&mut Crc>,
) -> Result<(FileHeader, RecordHeader), Error> {
    let (mut header, successor) = Decoder::advance(take(r, c.as_deref_mut())?)?;

    let state = match successor {
        Left(state) => {
            let (crc, successor) = state.advance(take(r, c.as_deref_mut())?);
            header.crc = Some(crc);

            match successor {
                Left(state) => {
                    let bytes = take_vec(r, state.len(), c)?;
                    state.advance(&bytes)
                }
                Right(state) => state,
            }
        }
        Right(state) => state,
    };

    Ok((header, state))
}

/// An iterator over the data records of a document.
///
/// Records are read one at a time as the iterator is advanced. After an error
/// or the last record, the iterator yields nothing further.
#[derive(Debug)]
pub struct Records<R> {
    r: R,
    header: FileHeader,
    /// Present until decoding ends or fails.
    state: Option<RecordHeader>,
    definitions: DefinitionTable,
    /// Bytes of the data section claimed so far.
    consumed: u64,
    records: usize,
    crc: Option<Crc>,
    integrity: Option<Integrity>,
}

impl<R: Read> Records<R> {
    /// The document header.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Bytes of the data section read so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Result of the cyclic redundancy check.
    ///
    /// Available once every record has been read, and only if validation was
    /// requested.
    pub fn integrity(&self) -> Option<Integrity> {
        self.integrity
    }

    /// Stop decoding and recover the reader.
    pub fn into_inner(self) -> R {
        self.r
    }

    fn step(&mut self, mut state: RecordHeader) -> Result<Option<(Record, RecordHeader)>, Error> {
        let end = u64::from(self.header.data_size);

        while self.consumed < end {
            self.claim(1)?;
            let (local, successor) = state.advance(take(&mut self.r, self.crc.as_mut())?)?;

            state = match successor {
                Left(definition) => self.decode_definition(local, definition)?,
                Right(data) => return self.decode_data(local, data).map(Some),
            };
        }

        self.finish()?;

        Ok(None)
    }

    fn decode_definition(&mut self, local: u8, state: Definition) -> Result<RecordHeader, Error> {
        self.claim(5)?;
        let state = state.advance(take(&mut self.r, self.crc.as_mut())?);

        self.claim(state.len())?;
        let bytes = take_vec(&mut self.r, state.len(), self.crc.as_mut())?;
        let (definition, state) = state.advance(&bytes);

        let global = definition.global();
        trace!(local, global, fields = definition.fields().len(), "Definition record");

        if let Some(previous) = self.definitions.insert(local, definition) {
            if previous.global() != global {
                debug!(local, from = previous.global(), to = global, "Redefined local message");
            }
        }

        Ok(state)
    }

    fn decode_data(&mut self, local: u8, state: Data) -> Result<(Record, RecordHeader), Error> {
        let definition = Arc::clone(self.definitions.get(local)?);

        self.claim(definition.size())?;
        let payload = take_vec(&mut self.r, definition.size(), self.crc.as_mut())?;

        trace!(local, global = definition.global(), size = payload.len(), "Data record");
        self.records += 1;

        Ok(state.advance(definition, payload))
    }

    /// Account for bytes about to be read from the data section.
    fn claim(&mut self, n: usize) -> Result<(), Error> {
        let consumed = self.consumed + n as u64;

        if consumed > u64::from(self.header.data_size) {
            Err(Error::Overrun {
                data_size: self.header.data_size,
            })?;
        }

        self.consumed = consumed;

        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        debug!(consumed = self.consumed, records = self.records, "Reached end of data section");

        if let Some(crc) = self.crc {
            let calculated = crc.value();
            let found = u16::from_le_bytes(take(&mut self.r, None)?);

            self.integrity = Some(if found == calculated {
                debug!(crc = found, "Cyclic redundancy check passed");
                Integrity::Valid
            } else {
                warn!(found, calculated, "Cyclic redundancy check failed");
                Integrity::Mismatch { found, calculated }
            });
        }

        Ok(())
    }
}

impl<R: Read> Iterator for Records<R> {
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let state = self.state.take()?;

        match self.step(state) {
            Ok(Some((record, state))) => {
                self.state = Some(state);
                Some(Ok(record))
            }
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl<R: Read> FusedIterator for Records<R> {}

/// Take an exact number of bytes from a reader, optionally accumulating a CRC
/// value.
fn take<const N: usize>(r: &mut impl Read, c: Option<&mut Crc>) -> Result<[u8; N], Error> {
    let mut buf = [0; N];
    r.read_exact(&mut buf)?;

    if let Some(c) = c {
        c.update(&buf);
    }

    Ok(buf)
}

/// As [`take`], for a length known only at runtime.
fn take_vec(r: &mut impl Read, n: usize, c: Option<&mut Crc>) -> Result<Vec<u8>, Error> {
    let mut buf = vec![0; n];
    r.read_exact(&mut buf)?;

    if let Some(c) = c {
        c.update(&buf);
    }

    Ok(buf)
}
