//! User data to high level encoding conversion functions

use awint_core::{InlAwi, Bits};
use log::trace;

use crate::{Error, Result};

type U160 = InlAwi<160, { Bits::unstable_raw_digits(160) }>;

/// Codeword used to latch to text mode
pub const M_LATCH_TEXT: u16 = 900;
/// Codeword used to latch to byte mode (if length is multiple of 6 use
/// M_LATCH_BYTE_M6).
pub const M_LATCH_BYTE: u16 = 901;
/// Codeword used to latch to numeric mode
pub const M_LATCH_NUMERIC: u16 = 902;

// 903 to 912: reserved for future use

/// Codeword used to switch to byte mode for next codedword (usable only if
/// the current mode is text).
pub const M_SHIFT_BYTE: u16 = 913;

// 914 to 920: reserved for future use
// 921: reader initialization
// 922 to 923: Macro PDF417

/// Codeword used to latch to byte mode when the byte count is a multiple of 6.
pub const M_LATCH_BYTE_M6: u16 = 924;
/// Codeword used as padding at the end of the data section
pub const CW_PADDING: u16 = M_LATCH_TEXT;

/// Digit runs at least this long use numeric compaction.
const MIN_NUMERIC_RUN: usize = 13;
/// Text runs at least this long use text compaction.
const MIN_TEXT_RUN: usize = 5;
/// Digits converted at once by numeric compaction.
const NUMERIC_GROUP: usize = 44;

const MIXED_CHAR_SET: [u8; 15] = [
    b'&', b'\r', b'\t', b',', b':', b'#', b'-', b'.', b'$', b'/', b'+', b'%', b'*', b'=', b'^'
];
const PUNC_CHAR_SET: [u8; 29] = [
    b';', b'<', b'>', b'@', b'[', b'\\', b']', b'_', b'`', b'~', b'!', b'\r', b'\t',
    b',', b':', b'\n', b'-', b'.', b'$', b'/', b'"', b'|', b'*', b'(', b')', b'?',
    b'{', b'}', b'\''
];

const NONE: u8 = 0xFF;

/// ASCII to mixed sub-mode value.
const MIXED: [u8; 128] = {
    let mut table = [NONE; 128];
    let mut i = 0;
    while i < 10 {
        table[b'0' as usize + i] = i as u8;
        i += 1;
    }
    let mut i = 0;
    while i < MIXED_CHAR_SET.len() {
        table[MIXED_CHAR_SET[i] as usize] = i as u8 + 10;
        i += 1;
    }
    table[b' ' as usize] = 26;
    table
};

/// ASCII to punctuation sub-mode value.
const PUNC: [u8; 128] = {
    let mut table = [NONE; 128];
    let mut i = 0;
    while i < PUNC_CHAR_SET.len() {
        table[PUNC_CHAR_SET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

// Text sub-mode switches
const LL: u8 = 27;
const AS: u8 = 27;
const ML: u8 = 28;
const AL: u8 = 28;
const PS: u8 = 29;
const PL: u8 = 25;
const PAL: u8 = 29;

/// Text compaction sub-modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubMode {
    Alpha,
    Lower,
    Mixed,
    Punctuation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compaction {
    Text,
    Byte,
    Numeric,
}

#[inline]
const fn is_alpha_upper(c: u8) -> bool {
    c == b' ' || c.is_ascii_uppercase()
}

#[inline]
const fn is_alpha_lower(c: u8) -> bool {
    c == b' ' || c.is_ascii_lowercase()
}

#[inline]
const fn is_mixed(c: u8) -> bool {
    c < 128 && MIXED[c as usize] != NONE
}

#[inline]
const fn is_punctuation(c: u8) -> bool {
    c < 128 && PUNC[c as usize] != NONE
}

/// Characters text compaction can represent.
#[inline]
pub const fn is_text(c: u8) -> bool {
    c == b'\t' || c == b'\n' || c == b'\r' || (c >= 32 && c <= 126)
}

macro_rules! push {
    ($out:ident, $half:ident, $($cw:expr),+; $post:ident = $new:expr) => {{
        push!($out, $half, $($cw),+);
        $post = $new;
    }};
    ($out:ident, $half:ident, $head:expr, $($cw:expr),+) => {
        push!($out, $half, $head);
        push!($out, $half, $($cw),+);
    };
    ($out:ident, $half:ident, $cw:expr) => {{
        let cw = $cw as u16;
        match $half.take() {
            Some(h) => $out.push(h * 30 + cw),
            None => $half = Some(cw),
        }
    }};
}

/// Accumulates codewords segment by segment, keeping track of the current
/// compaction mode so that latches are only emitted when needed.
#[derive(Debug)]
pub struct PDF417Encoder {
    storage: Vec<u16>,
    mode: Compaction,
    sub_mode: SubMode,
}

impl Default for PDF417Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PDF417Encoder {
    /// Creates an encoder in text compaction (the mode every symbol starts in).
    pub fn new() -> Self {
        Self { storage: Vec::new(), mode: Compaction::Text, sub_mode: SubMode::Alpha }
    }

    /// Returns the number of codewords already used
    pub fn count(&self) -> usize {
        self.storage.len()
    }

    pub fn codewords(&self) -> &[u16] {
        &self.storage
    }

    pub fn into_codewords(self) -> Vec<u16> {
        self.storage
    }

    /// Appends a numeric segment. `digits` must only contain ASCII digits.
    pub fn append_numeric(&mut self, digits: &[u8]) -> &mut Self {
        debug_assert!(digits.iter().all(u8::is_ascii_digit));
        if self.mode != Compaction::Numeric {
            self.storage.push(M_LATCH_NUMERIC);
            self.mode = Compaction::Numeric;
            self.sub_mode = SubMode::Alpha;
        }

        for group in digits.chunks(NUMERIC_GROUP) {
            let digits = group.len();
            let mut b = U160::zero();
            {
                let mut p0 = U160::zero();
                let mut p1 = U160::zero();
                // 44 digits and a leading one always fit in 160 bits
                if b.bytes_radix_(None, group, 10, &mut p0, &mut p1).is_err() {
                    unreachable!("numeric group exceeds 160 bits");
                }

                // Append a leading 1 to the number to do the base 900
                // conversion. We need to calculate and add 10^(digits).
                p1.uone_();
                let _ = p1.shl_(digits);
                for _ in 0..digits {
                    let _ = p0.copy_(&p1);
                    let _ = p0.shl_(2);
                    let _ = p1.add_(&p0);
                }
                let _ = b.add_(&p1);
            }

            let nb = digits / 3 + 1;
            let at = self.storage.len();
            self.storage.resize(at + nb, 0);
            let mut count = 0;
            while !b.is_zero() {
                let r = b.digit_udivide_inplace_(900).unwrap_or(0);
                self.storage[at + nb - count - 1] = r as u16;
                count += 1;
            }
        }
        self
    }

    /// Appends a byte segment. A single byte while in text compaction is
    /// shifted instead of latched.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        if bytes.len() == 1 && self.mode == Compaction::Text {
            self.storage.push(M_SHIFT_BYTE);
        } else {
            self.storage.push(if bytes.len() % 6 == 0 { M_LATCH_BYTE_M6 } else { M_LATCH_BYTE });
            self.mode = Compaction::Byte;
            self.sub_mode = SubMode::Alpha;
        }

        let mut chunks = bytes.chunks_exact(6);
        for chunk in &mut chunks {
            // pack six bytes
            let mut s: u64 = chunk.iter().fold(0, |s, &b| (s << 8) + b as u64);
            // append five codewords
            let at = self.storage.len();
            self.storage.resize(at + 5, 0);
            for n in 0..5 {
                self.storage[at + 4 - n] = (s % 900) as u16;
                s /= 900;
            }
        }

        // remaining
        self.storage.extend(chunks.remainder().iter().map(|&b| b as u16));
        self
    }

    /// Appends a text segment using the alpha, lower, mixed and punctuation
    /// sub-modes. Every byte must satisfy [is_text].
    pub fn append_text(&mut self, s: &[u8]) -> &mut Self {
        debug_assert!(s.iter().all(|&c| is_text(c)));
        if self.mode != Compaction::Text {
            self.storage.push(M_LATCH_TEXT);
            self.mode = Compaction::Text;
            self.sub_mode = SubMode::Alpha;
        }

        let out = &mut self.storage;
        let mut mode = self.sub_mode;
        let mut half: Option<u16> = None;
        let mut k = 0;

        while k < s.len() {
            let c = s[k];
            match mode {
                SubMode::Alpha => {
                    if is_alpha_upper(c) {
                        push!(out, half, if c == b' ' { 26 } else { c - b'A' });
                    } else if is_alpha_lower(c) {
                        push!(out, half, LL; mode = SubMode::Lower);
                        continue;
                    } else if is_mixed(c) {
                        push!(out, half, ML; mode = SubMode::Mixed);
                        continue;
                    } else {
                        push!(out, half, PS, PUNC[c as usize]);
                    }
                },
                SubMode::Lower => {
                    if is_alpha_lower(c) {
                        push!(out, half, if c == b' ' { 26 } else { c - b'a' });
                    } else if is_alpha_upper(c) {
                        push!(out, half, AS, c - b'A');
                    } else if is_mixed(c) {
                        push!(out, half, ML; mode = SubMode::Mixed);
                        continue;
                    } else {
                        push!(out, half, PS, PUNC[c as usize]);
                    }
                },
                SubMode::Mixed => {
                    if is_mixed(c) {
                        push!(out, half, MIXED[c as usize]);
                    } else if is_alpha_upper(c) {
                        push!(out, half, AL; mode = SubMode::Alpha);
                        continue;
                    } else if is_alpha_lower(c) {
                        push!(out, half, LL; mode = SubMode::Lower);
                        continue;
                    } else if k + 1 < s.len() && is_punctuation(s[k + 1]) {
                        push!(out, half, PL; mode = SubMode::Punctuation);
                        continue;
                    } else {
                        push!(out, half, PS, PUNC[c as usize]);
                    }
                },
                SubMode::Punctuation => {
                    if is_punctuation(c) {
                        push!(out, half, PUNC[c as usize]);
                    } else {
                        push!(out, half, PAL; mode = SubMode::Alpha);
                        continue;
                    }
                },
            }
            k += 1;
        }

        if let Some(h) = half {
            out.push(h * 30 + 29);
            // 29 is PAL in punctuation, a shift (PS) everywhere else
            if mode == SubMode::Punctuation {
                mode = SubMode::Alpha;
            }
        }
        self.sub_mode = mode;
        self
    }
}

/// Number of consecutive digits at the start of `s`.
fn digit_count(s: &[u8]) -> usize {
    s.iter().take_while(|c| c.is_ascii_digit()).count()
}

/// Number of characters at the start of `s` worth encoding with text
/// compaction. A digit run long enough for numeric compaction ends it.
fn text_count(s: &[u8]) -> usize {
    let mut idx = 0;
    while idx < s.len() {
        let digits = digit_count(&s[idx..]).min(MIN_NUMERIC_RUN);
        if digits >= MIN_NUMERIC_RUN {
            return idx;
        }
        if digits > 0 {
            idx += digits;
            continue;
        }
        if !is_text(s[idx]) {
            break;
        }
        idx += 1;
    }
    idx
}

/// Number of bytes at the start of `s` to encode with byte compaction: up to
/// the next run of digits or text long enough for its own compaction.
fn binary_count(s: &[u8]) -> usize {
    let mut idx = 0;
    while idx < s.len() {
        if digit_count(&s[idx..]) >= MIN_NUMERIC_RUN {
            return idx;
        }
        if text_count(&s[idx..]) >= MIN_TEXT_RUN {
            return idx;
        }
        idx += 1;
    }
    idx
}

/// Encodes a message into data codewords (without length descriptor,
/// padding or error correction), switching between text, byte and numeric
/// compaction. Only ISO-8859-1 characters can be encoded.
pub fn encode_high_level(message: &str) -> Result<Vec<u16>> {
    let bytes = message.chars()
        .map(|c| u8::try_from(c).map_err(|_| Error::message(format!("character {c:?} is not in ISO-8859-1"))))
        .collect::<Result<Vec<u8>>>()?;

    let mut encoder = PDF417Encoder::new();
    let mut p = 0;
    while p < bytes.len() {
        let rest = &bytes[p..];
        let n = digit_count(rest);
        if n >= MIN_NUMERIC_RUN {
            trace!("numeric compaction for {n} digits at {p}");
            encoder.append_numeric(&rest[..n]);
            p += n;
            continue;
        }

        let t = text_count(rest);
        if t >= MIN_TEXT_RUN || n == bytes.len() {
            trace!("text compaction for {t} characters at {p}");
            encoder.append_text(&rest[..t]);
            p += t;
        } else {
            let b = binary_count(rest).max(1);
            trace!("byte compaction for {b} bytes at {p}");
            encoder.append_bytes(&rest[..b]);
            p += b;
        }
    }

    Ok(encoder.into_codewords())
}
