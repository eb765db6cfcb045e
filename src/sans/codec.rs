//! Fixed-width integer decoding from a byte cursor.
//!
//! Every integer is read little-endian. The architecture byte of a definition
//! record is recorded but never consulted here.

use thiserror::Error;

/// Fewer bytes remained than a read required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unexpectedly reached the end of the input.")]
pub struct EndOfInput;

/// An integer primitive with a fixed little-endian encoding.
pub trait Integer: Copy {
    /// Width of the encoding in bytes.
    const SIZE: usize;

    /// Decode from exactly [`Self::SIZE`] bytes.
    fn from_le_slice(r: &[u8]) -> Self;

    /// Whether this is the zero value, used for `z`-suffixed base types.
    fn is_zero(&self) -> bool;
}

macro_rules! integer {
    ($($t:ident),*) => {$(
        impl Integer for $t {
            const SIZE: usize = size_of::<$t>();

            fn from_le_slice(r: &[u8]) -> Self {
                let mut bytes = [0; size_of::<$t>()];
                bytes.copy_from_slice(r);
                $t::from_le_bytes(bytes)
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }
        }
    )*};
}

integer!(u8, i8, u16, i16, u32, i32);

/// Read an integer at an offset in a slice, advancing the offset.
pub fn read<T: Integer>(r: &[u8], i: &mut usize) -> Result<T, EndOfInput> {
    let s = *i;
    let e = s.checked_add(T::SIZE).ok_or(EndOfInput)?;
    let value = T::from_le_slice(r.get(s..e).ok_or(EndOfInput)?);
    *i = e;

    Ok(value)
}
