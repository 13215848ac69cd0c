//! Check character algorithms.

/// GS1 mod-10 check digit: digits are weighted 3, 1, 3, ... starting from
/// the rightmost one. Non-digit characters must have been rejected by the
/// caller.
pub fn mod10(digits: &str) -> u8 {
    let sum: u32 = digits.bytes()
        .rev()
        .enumerate()
        .map(|(i, d)| (d - b'0') as u32 * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

pub fn mod10_char(digits: &str) -> char {
    (b'0' + mod10(digits)) as char
}

/// Returns whether the last digit of `digits` is its mod-10 check digit.
pub fn validate_mod10(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let (body, check) = digits.split_at(digits.len() - 1);
    mod10(body) == check.as_bytes()[0] - b'0'
}

/// Sum of the symbol values modulo 43.
pub fn mod43<I: IntoIterator<Item = usize>>(values: I) -> usize {
    values.into_iter().sum::<usize>() % 43
}

/// Code 128 check value: start value plus each symbol value weighted by
/// its position (starting at 1), modulo 103.
pub fn mod103(start: u8, values: &[u8]) -> u8 {
    let sum = values.iter()
        .enumerate()
        .fold(start as u32, |acc, (i, &v)| acc + (i as u32 + 1) * v as u32);
    (sum % 103) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mod10() {
        assert_eq!(mod10("400638133393"), 1);
        assert_eq!(mod10("03600029145"), 2);
        assert_eq!(mod10("9638507"), 4);
        assert!(validate_mod10("4006381333931"));
        assert!(!validate_mod10("4006381333932"));
        assert!(!validate_mod10(""));
    }

    #[test]
    fn test_mod103() {
        // StartB, '1', '2', '3'
        assert_eq!(mod103(104, &[17, 18, 19]), 8);
    }

    #[test]
    fn test_mod43() {
        // "CODE39": 12 + 24 + 13 + 14 + 3 + 9
        assert_eq!(mod43([12, 24, 13, 14, 3, 9]), 32);
    }
}
