#![no_std]

//! A streaming, pull-based decoder for Garmin's Flexible and Interoperable
//! Data Transfer protocol.
//!
//! Cadence reads a document one record at a time, keeping only the table of
//! active definition records between steps. Each data record is handed to the
//! caller as a [`Record`](sans::data::Record), from which fields are decoded
//! on request by field number.
//!
//! Most users should begin with [`avec::open`] or [`avec::parse`], which
//! produce an iterator of records. The pieces the iterator is built from are
//! exposed in the [`sans`] module for applications that bring their own I/O.
//!
//! ```
//! let mut records = cadence::avec::open("ride.fit", true)?;
//!
//! for record in &mut records {
//!     let record = record?;
//!     if record.global() == cadence::sans::data::MESSAGE_RECORD {
//!         let time = record.get_as_timestamp(cadence::sans::data::FIELD_TIMESTAMP);
//!         let heart_rate = record.get(3);
//!         println!("{time:?} {heart_rate:?}");
//!     }
//! }
//!
//! assert!(records.integrity().is_some_and(|i| i.is_valid()));
//! ```
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `std`: enable reader-based decoder (default).

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod avec;
pub mod sans;
