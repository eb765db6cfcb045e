//! Helpers for computing cyclic redundancy checks.

/// Accumulate a slice of bytes into a cyclic redundancy check value.
pub fn compute_crc(init: u16, r: &[u8]) -> u16 {
    r.iter().fold(init, |acc, b| crc_byte(acc, *b))
}

/// Compute the cyclic redundancy check of the next `count` bytes of a reader.
///
/// Exactly `count` bytes are consumed, unless the reader ends first.
///
/// _Requires Cargo feature `std`._
#[cfg(feature = "std")]
pub fn compute(r: &mut impl std::io::Read, count: u64) -> std::io::Result<u16> {
    let mut crc = Crc::new();
    let mut buf = [0; 512];
    let mut remaining = count;

    while remaining != 0 {
        let n = remaining.min(buf.len() as u64) as usize;
        r.read_exact(&mut buf[..n])?;
        crc.update(&buf[..n]);
        remaining -= n as u64;
    }

    Ok(crc.value())
}

/// Running cyclic redundancy check over bytes seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc(u16);

impl Crc {
    /// A check over no bytes.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Accumulate more bytes.
    pub fn update(&mut self, r: &[u8]) {
        self.0 = compute_crc(self.0, r);
    }

    /// The check value of every byte accumulated so far.
    pub const fn value(&self) -> u16 {
        self.0
    }
}

/// Accumulate a single byte into a cyclic redundancy check value.
fn crc_byte(mut crc: u16, b: u8) -> u16 {
    const CRC_TABLE: [u16; 16] = [
        0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
        0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
    ];

    for nibble in [b & 0xF, (b >> 4) & 0xF] {
        let tmp = CRC_TABLE[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc = crc ^ tmp ^ CRC_TABLE[nibble as usize];
    }

    crc
}
