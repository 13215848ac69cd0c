//! Reed-Solomon error correction over GF(256), primitive polynomial 0x12D.

use super::symbol::SymbolInfo;
use crate::{Error, Result};

const PRIMITIVE: u16 = 0x12D;

const fn build_tables() -> ([u8; 256], [u8; 255]) {
    let mut log = [0u8; 256];
    let mut alog = [0u8; 255];
    let mut p: u16 = 1;
    let mut i = 0;
    while i < 255 {
        alog[i] = p as u8;
        log[p as usize] = i as u8;
        p <<= 1;
        if p >= 256 {
            p ^= PRIMITIVE;
        }
        i += 1;
    }
    (log, alog)
}

const TABLES: ([u8; 256], [u8; 255]) = build_tables();
const LOG: [u8; 256] = TABLES.0;
const ALOG: [u8; 255] = TABLES.1;

#[inline]
fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        0
    } else {
        ALOG[(LOG[a as usize] as usize + LOG[b as usize] as usize) % 255]
    }
}

/// Coefficients x^0..x^(n-1) of the monic polynomial (x + a^1)...(x + a^n).
fn generator(n: usize) -> Vec<u8> {
    let mut poly = vec![1u8];
    for i in 1..=n {
        let root = ALOG[i % 255];
        let mut next = vec![0u8; poly.len() + 1];
        for (j, &c) in poly.iter().enumerate() {
            next[j] ^= mul(c, root);
            next[j + 1] ^= c;
        }
        poly = next;
    }
    poly.truncate(n);
    poly
}

/// `n` error correction codewords for one block of data.
pub fn create_ecc_block(data: &[u8], n: usize) -> Vec<u8> {
    let poly = generator(n);
    let mut ecc = vec![0u8; n];
    for &d in data {
        let m = ecc[n - 1] ^ d;
        for k in (1..n).rev() {
            ecc[k] = ecc[k - 1] ^ mul(m, poly[k]);
        }
        ecc[0] = mul(m, poly[0]);
    }
    ecc.reverse();
    ecc
}

/// Appends the interleaved error correction to exactly `data_capacity`
/// data codewords.
pub fn encode_ecc200(codewords: &[u8], symbol: &SymbolInfo) -> Result<Vec<u8>> {
    if codewords.len() != symbol.data_capacity {
        return Err(Error::message(format!(
            "{} data codewords do not fill a symbol of capacity {}", codewords.len(), symbol.data_capacity)));
    }

    let mut out = Vec::with_capacity(symbol.codeword_count());
    out.extend_from_slice(codewords);
    out.resize(symbol.codeword_count(), 0);

    let blocks = symbol.interleaved_block_count();
    if blocks == 1 {
        let ecc = create_ecc_block(codewords, symbol.error_codewords);
        out[symbol.data_capacity..].copy_from_slice(&ecc);
        return Ok(out);
    }

    for block in 0..blocks {
        let data: Vec<u8> = codewords.iter().skip(block).step_by(blocks).copied().collect();
        debug_assert_eq!(data.len(), symbol.data_length_for_block(block + 1));
        let ecc = create_ecc_block(&data, symbol.error_length_for_block(block + 1));
        for (k, e) in ecc.into_iter().enumerate() {
            out[symbol.data_capacity + block + k * blocks] = e;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamatrix::symbol::PRODUCTION_SYMBOLS;

    #[test]
    fn test_generator() {
        assert_eq!(generator(5), [228, 48, 15, 111, 62]);
    }

    #[test]
    fn test_single_block() {
        let out = encode_ecc200(&[142, 164, 186], &PRODUCTION_SYMBOLS[0]).unwrap();
        assert_eq!(out, [142, 164, 186, 114, 25, 5, 88, 102]);
    }

    #[test]
    fn test_interleaved_layout() {
        let symbol = PRODUCTION_SYMBOLS[20];
        let data: Vec<u8> = (0..symbol.data_capacity).map(|i| (i % 251) as u8).collect();
        let out = encode_ecc200(&data, &symbol).unwrap();
        assert_eq!(out.len(), 288);

        let even: Vec<u8> = data.iter().step_by(2).copied().collect();
        let ecc = create_ecc_block(&even, 42);
        let placed: Vec<u8> = out[204..].iter().step_by(2).copied().collect();
        assert_eq!(placed, ecc);
    }

    #[test]
    fn test_wrong_length() {
        assert!(encode_ecc200(&[1, 2], &PRODUCTION_SYMBOLS[0]).is_err());
    }
}
