//! One dimensional symbologies.
//!
//! Every generator follows the same shape: a configuration struct
//! implementing [BarcodeParams](crate::params::BarcodeParams), a generator
//! built from it with `new`, and `calc_dimensions`, `events` and
//! `generate_barcode` taking the message. Validation happens in `events`
//! before the first event is produced.

pub mod codabar;
pub mod code39;
pub mod interleaved;
pub mod postal;
pub mod postnet;
pub mod royal_mail;
pub mod upcean;
pub mod usps4cb;

use crate::{checksum, params::ChecksumMode, Error, Result};

/// Widths of a two-width pattern of `elements` elements, most significant
/// bit first: a set bit is a wide element (weight 2), a clear bit a narrow
/// one (weight 1).
pub(crate) fn two_width(pattern: u16, elements: u8) -> impl Iterator<Item = u8> {
    (0..elements).rev().map(move |i| if pattern & (1 << i) != 0 { 2 } else { 1 })
}

/// Physical width of a narrow/wide weight.
pub(crate) fn two_width_bar(weight: u8, module_width: f64, wide_factor: f64) -> f64 {
    match weight {
        2 => module_width * wide_factor,
        w => w as f64 * module_width,
    }
}

/// Number of wide elements in a two-width pattern.
pub(crate) const fn wide_count(pattern: u16) -> u32 {
    pattern.count_ones()
}

/// Checks that `msg` is a non-empty string of digits.
pub(crate) fn require_digits(msg: &str, what: &str) -> Result<()> {
    match msg.chars().find(|c| !c.is_ascii_digit()) {
        Some(c) => Err(Error::message(format!("{what} only accepts digits, found '{c}'"))),
        None if msg.is_empty() => Err(Error::message(format!("{what} message is empty"))),
        None => Ok(()),
    }
}

/// Brings a message to `full_len` digits by handling its check digit.
pub(crate) fn fixed_length_checksum(body: &str, full_len: usize, mode: ChecksumMode, name: &str) -> Result<String> {
    let has_check = match body.len() {
        l if l == full_len => true,
        l if l + 1 == full_len => false,
        l => return Err(Error::message(format!("{name} needs {} or {full_len} digits, got {l}", full_len - 1))),
    };

    match (mode, has_check) {
        (ChecksumMode::Ignore, true) => Ok(body.to_owned()),
        (ChecksumMode::Ignore | ChecksumMode::Check, false) => {
            Err(Error::message(format!("{name} message has no check digit")))
        }
        (ChecksumMode::Add, true) => Err(Error::message(format!("{name} message already has {full_len} digits"))),
        (ChecksumMode::Add | ChecksumMode::AutoIgnoreIfAbsent, false) => {
            Ok(format!("{body}{}", checksum::mod10_char(body)))
        }
        (ChecksumMode::Check | ChecksumMode::AutoIgnoreIfAbsent, true) if checksum::validate_mod10(body) => {
            Ok(body.to_owned())
        }
        (ChecksumMode::Check | ChecksumMode::AutoIgnoreIfAbsent, true) => {
            Err(Error::message(format!("wrong {name} check digit in '{body}'")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_width() {
        let widths: Vec<u8> = two_width(0b0000011, 7).collect();
        assert_eq!(widths, [1, 1, 1, 1, 1, 2, 2]);
        assert_eq!(wide_count(0b0000011), 2);
    }

    #[test]
    fn test_require_digits() {
        assert!(require_digits("0123", "test").is_ok());
        assert!(require_digits("01a3", "test").is_err());
        assert!(require_digits("", "test").is_err());
    }

    #[test]
    fn test_checksum_modes() {
        assert_eq!(fixed_length_checksum("400638133393", 13, ChecksumMode::AutoIgnoreIfAbsent, "EAN-13").unwrap(), "4006381333931");
        assert!(fixed_length_checksum("4006381333931", 13, ChecksumMode::Check, "EAN-13").is_ok());
        assert!(fixed_length_checksum("4006381333932", 13, ChecksumMode::Check, "EAN-13").is_err());
        assert!(fixed_length_checksum("4006381333932", 13, ChecksumMode::Ignore, "EAN-13").is_ok());
        assert!(fixed_length_checksum("4006381333931", 13, ChecksumMode::Add, "EAN-13").is_err());
        assert!(fixed_length_checksum("400638133393", 13, ChecksumMode::Check, "EAN-13").is_err());
        assert!(fixed_length_checksum("40063813", 13, ChecksumMode::Add, "EAN-13").is_err());
    }
}
