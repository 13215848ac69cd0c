//! Code set selection.
//!
//! Turns a message into symbol values (start code included, check and stop
//! excluded). Code set C packs two digits per symbol and is used when a
//! digit run is long enough to pay for the switches around it; otherwise A
//! or B is chosen by looking at the first character that only one of them
//! can encode.

use log::trace;

use crate::{Error, Result};

/// Function characters as written in messages.
pub const FNC1: char = '\u{f1}';
pub const FNC2: char = '\u{f2}';
pub const FNC3: char = '\u{f3}';
pub const FNC4: char = '\u{f4}';

pub const FNC1_VALUE: u8 = 102;
pub const FNC2_VALUE: u8 = 97;
pub const FNC3_VALUE: u8 = 96;
pub const SHIFT: u8 = 98;
pub const CODE_C: u8 = 99;
/// Switches to code set B, or FNC4 in code set B.
pub const CODE_B: u8 = 100;
/// Switches to code set A, or FNC4 in code set A.
pub const CODE_A: u8 = 101;
pub const START_A: u8 = 103;
pub const START_B: u8 = 104;
pub const START_C: u8 = 105;
pub const STOP: u8 = 106;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeSet {
    A,
    B,
    C,
}

impl CodeSet {
    pub const fn start(&self) -> u8 {
        match self {
            Self::A => START_A,
            Self::B => START_B,
            Self::C => START_C,
        }
    }

    /// Value switching to this set from another one.
    pub const fn latch(&self) -> u8 {
        match self {
            Self::A => CODE_A,
            Self::B => CODE_B,
            Self::C => CODE_C,
        }
    }

    const fn other(&self) -> Self {
        match self {
            Self::A => Self::B,
            _ => Self::A,
        }
    }

    const fn fnc4(&self) -> Option<u8> {
        match self {
            Self::A => Some(CODE_A),
            Self::B => Some(CODE_B),
            Self::C => None,
        }
    }
}

const fn is_function(c: char) -> bool {
    matches!(c, FNC1 | FNC2 | FNC3 | FNC4)
}

/// Value of a single character in code set A or B. FNC1 is the only
/// character code set C takes on its own.
fn value_in(set: CodeSet, c: char) -> Option<u8> {
    let code = u32::from(c);
    match (set, c) {
        (_, FNC1) => Some(FNC1_VALUE),
        (CodeSet::C, _) => None,
        (_, FNC2) => Some(FNC2_VALUE),
        (_, FNC3) => Some(FNC3_VALUE),
        (_, FNC4) => set.fnc4(),
        (CodeSet::A, _) if code < 32 => Some(code as u8 + 64),
        (CodeSet::A, _) if code < 96 => Some(code as u8 - 32),
        (CodeSet::B, _) if (32..128).contains(&code) => Some(code as u8 - 32),
        _ => None,
    }
}

/// The character without its high bit, for U+0080 to U+00FF.
fn extended_base(c: char) -> Option<char> {
    let code = u32::from(c);
    if (128..256).contains(&code) && !is_function(c) {
        char::from_u32(code - 128)
    } else {
        None
    }
}

fn encodable(set: CodeSet, c: char) -> bool {
    value_in(set, c).is_some() || extended_base(c).is_some_and(|base| value_in(set, base).is_some())
}

/// The set a character requires, if only one of A and B can encode it.
fn forced_set(c: char) -> Option<CodeSet> {
    let base = extended_base(c).unwrap_or(c);
    match u32::from(base) {
        _ if is_function(base) => None,
        0..=31 => Some(CodeSet::A),
        96..=127 => Some(CodeSet::B),
        _ => None,
    }
}

/// Pairs of digits starting at `start`, FNC1s in between included, and
/// the position after them.
fn digit_run(chars: &[char], start: usize) -> (usize, usize) {
    let (mut pairs, mut end) = (0, start);
    loop {
        match chars.get(end..end + 2) {
            Some([a, b]) if a.is_ascii_digit() && b.is_ascii_digit() => {
                pairs += 1;
                end += 2;
            }
            _ if chars.get(end) == Some(&FNC1) => end += 1,
            _ => break,
        }
    }
    (pairs, end)
}

/// Whether the digit run at `pos` is worth encoding in code set C.
fn prefer_c(chars: &[char], pos: usize, current: Option<CodeSet>) -> bool {
    let (pairs, end) = digit_run(chars, pos);
    if pairs == 0 {
        return false;
    }
    let reaches_end = end == chars.len();
    let switch_in = usize::from(current.is_some());
    let switch_out = usize::from(!reaches_end);
    let saved = pairs as isize - (switch_in + switch_out) as isize;
    saved >= 2 || (reaches_end && saved >= 1)
}

/// A or B: the set required by the first character that needs one,
/// otherwise the current set, otherwise B.
fn choose_a_or_b(chars: &[char], current: Option<CodeSet>) -> CodeSet {
    chars.iter()
        .find_map(|&c| forced_set(c))
        .or(current.filter(|&set| set != CodeSet::C))
        .unwrap_or(CodeSet::B)
}

fn push_char(values: &mut Vec<u8>, set: CodeSet, c: char) {
    match (value_in(set, c), extended_base(c)) {
        (Some(v), _) => values.push(v),
        (None, Some(base)) => {
            values.extend(set.fnc4());
            values.extend(value_in(set, base));
        }
        (None, None) => (),
    }
}

/// Symbol values of `msg`, start code first.
pub fn encode(msg: &str) -> Result<Vec<u8>> {
    let chars: Vec<char> = msg.chars().collect();
    if chars.is_empty() {
        return Err(Error::message("Code 128 message is empty"));
    }
    if let Some(c) = chars.iter().find(|&&c| u32::from(c) > 0xFF) {
        return Err(Error::message(format!("'{c}' cannot be encoded in Code 128")));
    }

    let mut values = Vec::with_capacity(chars.len() + 1);
    let mut set: Option<CodeSet> = None;
    let mut pos = 0;
    while pos < chars.len() {
        let c = chars[pos];

        let stay_in_c = set == Some(CodeSet::C) && digit_run(&chars, pos).1 > pos;
        if stay_in_c || (set != Some(CodeSet::C) && prefer_c(&chars, pos, set)) {
            if set != Some(CodeSet::C) {
                trace!("Code 128: code set C at {pos}");
                values.push(set.map_or(START_C, |_| CODE_C));
                set = Some(CodeSet::C);
            }
            let (_, end) = digit_run(&chars, pos);
            while pos < end {
                if chars[pos] == FNC1 {
                    values.push(FNC1_VALUE);
                    pos += 1;
                } else {
                    let pair = (chars[pos] as u8 - b'0') * 10 + (chars[pos + 1] as u8 - b'0');
                    values.push(pair);
                    pos += 2;
                }
            }
            continue;
        }

        match set {
            Some(current @ (CodeSet::A | CodeSet::B)) if encodable(current, c) => push_char(&mut values, current, c),
            Some(current @ (CodeSet::A | CodeSet::B))
                if extended_base(c).is_none()
                    && value_in(current.other(), c).is_some()
                    && chars.get(pos + 1).map_or(true, |&next| encodable(current, next)) =>
            {
                trace!("Code 128: shift to {:?} at {pos}", current.other());
                values.push(SHIFT);
                push_char(&mut values, current.other(), c);
            }
            _ => {
                let next = choose_a_or_b(&chars[pos..], set);
                trace!("Code 128: code set {next:?} at {pos}");
                values.push(if set.is_none() { next.start() } else { next.latch() });
                set = Some(next);
                push_char(&mut values, next, c);
            }
        }
        pos += 1;
    }
    Ok(values)
}

/// Human-readable form of a message: function characters are dropped.
pub fn printable(msg: &str) -> String {
    msg.chars().filter(|&c| !is_function(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_in_b_when_c_does_not_pay() {
        assert_eq!(encode("123").unwrap(), [START_B, 17, 18, 19]);
        assert_eq!(encode("A1").unwrap(), [START_B, 33, 17]);
    }

    #[test]
    fn test_code_c() {
        assert_eq!(encode("12").unwrap(), [START_C, 12]);
        assert_eq!(encode("1234").unwrap(), [START_C, 12, 34]);
        assert_eq!(encode("12345").unwrap(), [START_B, 17, CODE_C, 23, 45]);
        // four pairs pay for both switches
        assert_eq!(encode("X12345678Y").unwrap(), [START_B, 56, CODE_C, 12, 34, 56, 78, CODE_B, 57]);
        // two pairs in the middle do not
        assert_eq!(encode("X1234Y").unwrap(), [START_B, 56, 17, 18, 19, 20, 57]);
        // a run reaching the end only has to pay for the switch in
        assert_eq!(encode("X1234").unwrap(), [START_B, 56, CODE_C, 12, 34]);
    }

    #[test]
    fn test_fnc1_inside_code_c() {
        assert_eq!(encode("\u{f1}0112\u{f1}34").unwrap(), [START_C, FNC1_VALUE, 1, 12, FNC1_VALUE, 34]);
    }

    #[test]
    fn test_code_a_and_shift() {
        assert_eq!(encode("AB\u{1}\u{2}").unwrap(), [START_A, 33, 34, 65, 66]);
        // a single lower case letter in A is shifted
        assert_eq!(encode("\u{1}a\u{2}").unwrap(), [START_A, 65, SHIFT, 65, 66]);
        // two of them latch
        assert_eq!(encode("\u{1}ab").unwrap(), [START_A, 65, CODE_B, 65, 66]);
    }

    #[test]
    fn test_extended_latin1() {
        assert_eq!(encode("é").unwrap(), [START_B, CODE_B, 73]);
        assert_eq!(encode("\u{81}").unwrap(), [START_A, CODE_A, 65]);
        assert!(encode("€").is_err());
        assert!(encode("").is_err());
    }

    #[test]
    fn test_printable() {
        assert_eq!(printable("\u{f1}0112\u{f1}34"), "011234");
    }
}
