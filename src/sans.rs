//! Building blocks for implementing decoders without a particular source of
//! bytes.
//!
//! Nothing in this module performs I/O. See [`crate::avec`] for the
//! reader-based decoder built from these pieces.
//!
//! # Architecture
//!
//! Record framing is represented by zero-size, non-copy state tokens. Once
//! enough bytes are ready, transition to another state by calling the token's
//! `advance` method. This will return a successor state token, along with any
//! extracted data.
//!
//! ```text
//! DocumentHeader ──▶ ExtendedDocumentHeader ──▶ RecordHeader ◀──────────┐
//!        └──────────────────────────────────────▶    │                  │
//!                                      ┌─────────────┴────────┐         │
//!                                      ▼                      ▼         │
//!                                 Definition                Data ───────┤
//!                                      ▼                                │
//!                              DefinitionFields ────────────────────────┘
//! ```
//!
//! Only the initial state, re-exported for convenience as [`Decoder`], can be
//! constructed. Some parts of decoding are not represented in the state
//! machine and must be carefully written by the driver:
//!
//! - Reading bytes from the correct place in the document.
//!
//! - Keeping the [`definition::DefinitionTable`] up to date, and looking up
//! the active definition for each data record.
//!
//! - Ending decoding once the specified number of document bytes have been
//! read.
//!
//! - Applying cyclic redundancy checks. Helpers are provided in the [`check`]
//! module.

pub mod check;
pub mod codec;
pub mod data;
pub mod definition;
pub mod header;

/// Entrypoint to the finite-state machine.
pub type Decoder = header::DocumentHeader;
