//! Convenience interfaces for decoding documents from readers and files.
//!
//! [`open`] and [`parse`] produce a [`Records`] iterator, which yields each
//! data record of a document in turn. Iteration is lazy: bytes are only read
//! as records are requested, and dropping the iterator early is always safe.
//!
//! ```
//! let records = cadence::avec::parse(std::io::Cursor::new(bytes), false)?;
//!
//! let heart_rates: Vec<_> = records
//!     .filter_map(Result::ok)
//!     .filter(|r| r.global() == cadence::sans::data::MESSAGE_RECORD)
//!     .map(|r| r.get(3).map(|v| v.as_i64()))
//!     .collect();
//! ```
//!
//! _Requires Cargo feature `std`._

#[cfg(feature = "std")]
pub mod reader;

#[cfg(feature = "std")]
pub use reader::{Error, Integrity, Records, open, parse, read_file_header};
