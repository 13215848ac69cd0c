//! Reed-Solomon error correction over GF(929).

use super::tables::*;
use crate::{Error, Result};

/// Highest error correction level.
pub const MAX_LEVEL: u8 = 8;

/// Number of error correction codewords added at `level`.
pub const fn ecc_count(level: u8) -> usize {
    assert!(level <= MAX_LEVEL, "ECC level must be between 0 and 8 inclusive");
    1 << (level as usize + 1)
}

const fn factors(level: u8) -> &'static [u16] {
    match level {
        0 => &ECC_L0,
        1 => &ECC_L1,
        2 => &ECC_L2,
        3 => &ECC_L3,
        4 => &ECC_L4,
        5 => &ECC_L5,
        6 => &ECC_L6,
        7 => &ECC_L7,
        _ => &ECC_L8,
    }
}

/// Error correction level recommended for `count` data codewords, or
/// `None` when the data is too large for any level.
pub const fn recommended_level(count: usize) -> Option<u8> {
    match count {
        0..=40 => Some(2),
        41..=160 => Some(3),
        161..=320 => Some(4),
        321..=863 => Some(5),
        _ => None,
    }
}

/// Computes the `2^(level + 1)` error correction codewords of `data`.
pub fn generate_error_correction(data: &[u16], level: u8) -> Result<Vec<u16>> {
    if level > MAX_LEVEL {
        return Err(Error::config(format!("PDF417 error correction level must be between 0 and 8, got {level}")));
    }
    if let Some(cw) = data.iter().find(|&&cw| cw > 928) {
        return Err(Error::message(format!("codeword {cw} is out of range")));
    }

    let mut codewords = Vec::with_capacity(data.len() + ecc_count(level));
    codewords.extend_from_slice(data);
    codewords.resize(data.len() + ecc_count(level), 0);
    generate_ecc(&mut codewords, level);
    Ok(codewords.split_off(data.len()))
}

/// Fills the last `ecc_count(level)` slots of `codewords` with the error
/// correction of the codewords before them.
pub(crate) fn generate_ecc(codewords: &mut [u16], level: u8) {
    let factors = factors(level);

    assert!(codewords.len() >= factors.len());
    let (data, ecc) = codewords.split_at_mut(codewords.len() - factors.len());
    ecc.fill(0);

    for cw in data {
        let t = (*cw + ecc[0]) % 929;

        for i in (0..factors.len()).rev() {
            let factor = ((t as usize * factors[i] as usize) % 929) as u16;
            let d = if i > 0 { ecc[factors.len() - i] } else { 0 };
            ecc[factors.len() - 1 - i] = (d + 929 - factor) % 929;
        }
    }

    for e in ecc {
        if *e != 0 {
            *e = 929 - *e;
        }
    }
}
