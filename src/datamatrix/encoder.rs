//! ECC200 high level encoding: turns a message into data codewords using
//! the six encodation schemes.

use log::trace;

use super::symbol::{SizeConstraints, SymbolInfo, SymbolTable};
use crate::{Error, Result};

const PAD: u8 = 129;
const LATCH_TO_C40: u8 = 230;
const LATCH_TO_BASE256: u8 = 231;
const UPPER_SHIFT: u8 = 235;
const MACRO_05: u8 = 236;
const MACRO_06: u8 = 237;
const LATCH_TO_X12: u8 = 238;
const LATCH_TO_TEXT: u8 = 239;
const LATCH_TO_EDIFACT: u8 = 240;
const UNLATCH: u8 = 254;

const MACRO_05_HEADER: &[u8] = b"[)>\x1e05\x1d";
const MACRO_06_HEADER: &[u8] = b"[)>\x1e06\x1d";
const MACRO_TRAILER: &[u8] = b"\x1e\x04";

/// Encodation schemes of ECC200.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encodation {
    Ascii = 0,
    C40 = 1,
    Text = 2,
    X12 = 3,
    Edifact = 4,
    Base256 = 5,
}

impl Encodation {
    const fn latch(self) -> u8 {
        match self {
            Encodation::Ascii => UNLATCH,
            Encodation::C40 => LATCH_TO_C40,
            Encodation::Text => LATCH_TO_TEXT,
            Encodation::X12 => LATCH_TO_X12,
            Encodation::Edifact => LATCH_TO_EDIFACT,
            Encodation::Base256 => LATCH_TO_BASE256,
        }
    }
}

struct EncoderContext<'a> {
    msg: Vec<u8>,
    pos: usize,
    skip_at_end: usize,
    codewords: Vec<u8>,
    new_mode: Option<Encodation>,
    symbol: Option<SymbolInfo>,
    table: &'a SymbolTable,
    constraints: &'a SizeConstraints,
}

impl<'a> EncoderContext<'a> {
    fn current(&self) -> u8 {
        self.msg[self.pos]
    }

    fn has_more_characters(&self) -> bool {
        self.pos + self.skip_at_end < self.msg.len()
    }

    /// Codewords the rest of the message takes in ASCII.
    fn remaining_ascii_cost(&self) -> usize {
        let rest = self.msg.get(self.pos..self.msg.len() - self.skip_at_end).unwrap_or(&[]);
        let mut cost = 0;
        let mut i = 0;
        while i < rest.len() {
            if consecutive_digits(rest, i) >= 2 {
                i += 2;
            } else {
                cost += usize::from(is_extended(rest[i]));
                i += 1;
            }
            cost += 1;
        }
        cost
    }

    /// Makes sure the current symbol holds `len` codewords and returns its
    /// data capacity.
    fn capacity_for(&mut self, len: usize) -> Result<usize> {
        match self.symbol {
            Some(symbol) if len <= symbol.data_capacity => Ok(symbol.data_capacity),
            _ => {
                let symbol = *self.table.lookup(len, self.constraints)?;
                self.symbol = Some(symbol);
                Ok(symbol.data_capacity)
            }
        }
    }

    fn reset_symbol(&mut self) {
        self.symbol = None;
    }

    fn latch(&mut self, mode: Encodation) {
        self.codewords.push(mode.latch());
        self.new_mode = Some(mode);
    }
}

/// Result of [encode_high_level]: the padded data codewords and the symbol
/// they fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub codewords: Vec<u8>,
    pub symbol: SymbolInfo,
}

/// Encodes `msg` into the data codewords of the smallest fitting symbol.
/// Only ISO-8859-1 characters are accepted.
pub fn encode_high_level(msg: &str, table: &SymbolTable, constraints: &SizeConstraints) -> Result<Encoded> {
    let bytes = msg.chars()
        .map(|c| u8::try_from(u32::from(c)).map_err(|_| Error::message(format!("'{c}' is not an ISO-8859-1 character"))))
        .collect::<Result<Vec<u8>>>()?;

    let mut ctx = EncoderContext {
        msg: bytes,
        pos: 0,
        skip_at_end: 0,
        codewords: Vec::new(),
        new_mode: None,
        symbol: None,
        table,
        constraints,
    };

    if ctx.msg.ends_with(MACRO_TRAILER) {
        if ctx.msg.starts_with(MACRO_05_HEADER) {
            ctx.codewords.push(MACRO_05);
        } else if ctx.msg.starts_with(MACRO_06_HEADER) {
            ctx.codewords.push(MACRO_06);
        }
        if !ctx.codewords.is_empty() && ctx.msg.len() >= MACRO_05_HEADER.len() + MACRO_TRAILER.len() {
            ctx.skip_at_end = MACRO_TRAILER.len();
            ctx.pos = MACRO_05_HEADER.len();
        } else {
            ctx.codewords.clear();
        }
    }

    let mut mode = Encodation::Ascii;
    while ctx.has_more_characters() {
        match mode {
            Encodation::Ascii => encode_ascii(&mut ctx)?,
            Encodation::C40 | Encodation::Text => encode_c40(&mut ctx, mode)?,
            Encodation::X12 => encode_x12(&mut ctx)?,
            Encodation::Edifact => encode_edifact(&mut ctx)?,
            Encodation::Base256 => encode_base256(&mut ctx)?,
        }
        if let Some(next) = ctx.new_mode.take() {
            trace!("switching from {mode:?} to {next:?} at {}", ctx.pos);
            mode = next;
        }
    }

    let len = ctx.codewords.len();
    let capacity = ctx.capacity_for(len)?;
    if len < capacity && !matches!(mode, Encodation::Ascii | Encodation::Base256 | Encodation::Edifact) {
        ctx.codewords.push(UNLATCH);
    }
    if ctx.codewords.len() < capacity {
        ctx.codewords.push(PAD);
    }
    while ctx.codewords.len() < capacity {
        let pos = ctx.codewords.len() + 1;
        ctx.codewords.push(randomize_253(PAD, pos));
    }

    let symbol = ctx.symbol.ok_or(Error::CapacityExceeded)?;
    Ok(Encoded { codewords: ctx.codewords, symbol })
}

fn randomize_253(codeword: u8, pos: usize) -> u8 {
    let pseudo_random = ((149 * pos) % 253) + 1;
    let value = codeword as usize + pseudo_random;
    (if value <= 254 { value } else { value - 254 }) as u8
}

fn randomize_255(codeword: u8, pos: usize) -> u8 {
    let pseudo_random = ((149 * pos) % 255) + 1;
    let value = codeword as usize + pseudo_random;
    (if value <= 255 { value } else { value - 256 }) as u8
}

// Character classes

const fn is_extended(c: u8) -> bool {
    c >= 128
}

const fn is_native_c40(c: u8) -> bool {
    c == b' ' || c.is_ascii_digit() || c.is_ascii_uppercase()
}

const fn is_native_text(c: u8) -> bool {
    c == b' ' || c.is_ascii_digit() || c.is_ascii_lowercase()
}

const fn is_x12_terminator(c: u8) -> bool {
    matches!(c, b'\r' | b'*' | b'>')
}

const fn is_native_x12(c: u8) -> bool {
    is_x12_terminator(c) || c == b' ' || c.is_ascii_digit() || c.is_ascii_uppercase()
}

const fn is_native_edifact(c: u8) -> bool {
    c >= b' ' && c <= b'^'
}

fn consecutive_digits(msg: &[u8], start: usize) -> usize {
    msg.get(start..).map_or(0, |rest| rest.iter().take_while(|c| c.is_ascii_digit()).count())
}

// Look-ahead. Costs are kept in twelfths of a codeword so that the C40/Text
// (2/3) and EDIFACT (3/4) fractions stay exact.

const UNIT: u32 = 12;

const fn ceil_units(count: u32) -> u32 {
    count.div_ceil(UNIT) * UNIT
}

/// Whole codeword counts, their minimum and which schemes reach it.
fn find_minimums(counts: &[u32; 6]) -> ([u32; 6], u32, [bool; 6]) {
    let ints = counts.map(|c| c.div_ceil(UNIT));
    let min = ints.iter().copied().min().unwrap_or(0);
    (ints, min, ints.map(|c| c == min))
}

fn look_ahead_intern(msg: &[u8], start: usize, current: Encodation) -> Encodation {
    use Encodation::*;

    if start >= msg.len() {
        return current;
    }

    let mut counts: [u32; 6] = if current == Ascii {
        [0, UNIT, UNIT, UNIT, UNIT, UNIT + 3]
    } else {
        let mut counts = [UNIT, 2 * UNIT, 2 * UNIT, 2 * UNIT, 2 * UNIT, 2 * UNIT + 3];
        counts[current as usize] = 0;
        counts
    };

    let mut processed = 0;
    loop {
        if start + processed == msg.len() {
            let (ints, min, mins) = find_minimums(&counts);
            let min_count = mins.iter().filter(|&&m| m).count();
            if ints[Ascii as usize] == min {
                return Ascii;
            }
            if min_count == 1 {
                if mins[Base256 as usize] {
                    return Base256;
                }
                if mins[Edifact as usize] {
                    return Edifact;
                }
                if mins[Text as usize] {
                    return Text;
                }
                if mins[X12 as usize] {
                    return X12;
                }
            }
            return C40;
        }

        let c = msg[start + processed];
        processed += 1;

        let ascii = &mut counts[Ascii as usize];
        if c.is_ascii_digit() {
            *ascii += UNIT / 2;
        } else if is_extended(c) {
            *ascii = ceil_units(*ascii) + 2 * UNIT;
        } else {
            *ascii = ceil_units(*ascii) + UNIT;
        }

        counts[C40 as usize] += if is_native_c40(c) { 8 } else if is_extended(c) { 32 } else { 16 };
        counts[Text as usize] += if is_native_text(c) { 8 } else if is_extended(c) { 32 } else { 16 };
        counts[X12 as usize] += if is_native_x12(c) { 8 } else if is_extended(c) { 52 } else { 40 };
        counts[Edifact as usize] += if is_native_edifact(c) { 9 } else if is_extended(c) { 51 } else { 39 };
        counts[Base256 as usize] += UNIT;

        if processed >= 4 {
            let (ints, _, mins) = find_minimums(&counts);
            let min_count = mins.iter().filter(|&&m| m).count();
            let [ascii, c40, text, x12, edifact, base256] = ints;

            if ascii < base256 && ascii < c40 && ascii < text && ascii < x12 && ascii < edifact {
                return Ascii;
            }
            let c40_like = [C40, Text, X12, Edifact].iter().filter(|&&m| mins[m as usize]).count();
            if base256 < ascii || c40_like == 0 {
                return Base256;
            }
            if min_count == 1 {
                if mins[Edifact as usize] {
                    return Edifact;
                }
                if mins[Text as usize] {
                    return Text;
                }
                if mins[X12 as usize] {
                    return X12;
                }
            }
            if c40 + 1 < ascii && c40 + 1 < base256 && c40 + 1 < edifact && c40 + 1 < text {
                if c40 < x12 {
                    return C40;
                }
                if c40 == x12 {
                    for &tc in msg.iter().skip(start + processed + 1) {
                        if is_x12_terminator(tc) {
                            return X12;
                        }
                        if !is_native_x12(tc) {
                            break;
                        }
                    }
                    return C40;
                }
            }
        }
    }
}

/// Scheme to continue with at `start` when currently in `current`. X12 and
/// EDIFACT are only chosen when the characters of their next group are all
/// part of their set.
pub fn look_ahead(msg: &[u8], start: usize, current: Encodation) -> Encodation {
    let next = look_ahead_intern(msg, start, current);
    let window = match next {
        Encodation::X12 => Some((3, is_native_x12 as fn(u8) -> bool)),
        Encodation::Edifact => Some((4, is_native_edifact as fn(u8) -> bool)),
        _ => None,
    };
    match window {
        Some((len, native)) if msg.iter().skip(start).take(len).any(|&c| !native(c)) => Encodation::Ascii,
        _ => next,
    }
}

// ASCII

fn encode_ascii(ctx: &mut EncoderContext) -> Result<()> {
    if consecutive_digits(&ctx.msg, ctx.pos) >= 2 {
        let (hi, lo) = (ctx.msg[ctx.pos] - b'0', ctx.msg[ctx.pos + 1] - b'0');
        ctx.codewords.push(hi * 10 + lo + 130);
        ctx.pos += 2;
        return Ok(());
    }

    let c = ctx.current();
    let next = look_ahead(&ctx.msg, ctx.pos, Encodation::Ascii);
    if next != Encodation::Ascii {
        ctx.latch(next);
        return Ok(());
    }

    if is_extended(c) {
        ctx.codewords.push(UPPER_SHIFT);
        ctx.codewords.push(c - 128 + 1);
    } else {
        ctx.codewords.push(c + 1);
    }
    ctx.pos += 1;
    Ok(())
}

// C40 and Text

/// Appends the C40 (or Text) values of `c` and returns how many were added.
fn encode_c40_char(c: u8, text: bool, out: &mut Vec<u8>) -> usize {
    let values: [u8; 2] = match c {
        b' ' => {
            out.push(3);
            return 1;
        }
        b'0'..=b'9' => {
            out.push(c - b'0' + 4);
            return 1;
        }
        b'A'..=b'Z' if !text => {
            out.push(c - b'A' + 14);
            return 1;
        }
        b'a'..=b'z' if text => {
            out.push(c - b'a' + 14);
            return 1;
        }
        0..=31 => [0, c],
        32..=47 => [1, c - 33],
        58..=64 => [1, c - 58 + 15],
        91..=95 => [1, c - 91 + 22],
        96 if text => [2, 0],
        65..=90 => [2, c - 65 + 1],
        123..=127 if text => [2, c - 123 + 27],
        96..=127 => [2, c - 96],
        _ => {
            out.extend_from_slice(&[1, 30]);
            return 2 + encode_c40_char(c - 128, text, out);
        }
    };
    out.extend_from_slice(&values);
    2
}

fn write_triplets(ctx: &mut EncoderContext, buffer: &mut Vec<u8>) {
    while buffer.len() >= 3 {
        let v = 1600 * buffer[0] as u16 + 40 * buffer[1] as u16 + buffer[2] as u16 + 1;
        ctx.codewords.push((v / 256) as u8);
        ctx.codewords.push((v % 256) as u8);
        buffer.drain(..3);
    }
}

/// Drops the last character from the buffer and returns the size of the
/// one now at its end.
fn backtrack(ctx: &mut EncoderContext, buffer: &mut Vec<u8>, last: usize, text: bool) -> usize {
    buffer.truncate(buffer.len().saturating_sub(last));
    ctx.pos = ctx.pos.saturating_sub(1);
    ctx.reset_symbol();
    match ctx.pos.checked_sub(1) {
        Some(prev) => encode_c40_char(ctx.msg[prev], text, &mut Vec::new()),
        None => 0,
    }
}

fn encode_c40(ctx: &mut EncoderContext, mode: Encodation) -> Result<()> {
    let text = mode == Encodation::Text;
    let mut buffer = Vec::new();

    while ctx.has_more_characters() {
        let c = ctx.current();
        ctx.pos += 1;
        let mut last = encode_c40_char(c, text, &mut buffer);

        let current = ctx.codewords.len() + buffer.len() / 3 * 2;
        let available = ctx.capacity_for(current)? - current;

        if !ctx.has_more_characters() {
            if buffer.len() % 3 == 2 && available != 2 {
                last = backtrack(ctx, &mut buffer, last, text);
            }
            while buffer.len() % 3 == 1 && (last > 3 || available != 1) {
                last = backtrack(ctx, &mut buffer, last, text);
            }
            break;
        }

        if buffer.len() % 3 == 0 && look_ahead(&ctx.msg, ctx.pos, mode) != mode {
            ctx.new_mode = Some(Encodation::Ascii);
            break;
        }
    }
    c40_end_of_data(ctx, buffer)
}

fn c40_end_of_data(ctx: &mut EncoderContext, mut buffer: Vec<u8>) -> Result<()> {
    let current = ctx.codewords.len() + buffer.len() / 3 * 2;
    let available = ctx.capacity_for(current)? - current;

    match buffer.len() % 3 {
        2 => {
            buffer.push(0);
            write_triplets(ctx, &mut buffer);
            if ctx.has_more_characters() {
                ctx.codewords.push(UNLATCH);
            }
        }
        1 if available == 1 => {
            write_triplets(ctx, &mut buffer);
            if ctx.has_more_characters() {
                ctx.codewords.push(UNLATCH);
            }
            ctx.pos -= 1;
        }
        0 => {
            write_triplets(ctx, &mut buffer);
            if available > 0 || ctx.has_more_characters() {
                ctx.codewords.push(UNLATCH);
            }
        }
        _ => return Err(Error::message("C40 data cannot be terminated in the available space")),
    }
    ctx.new_mode = Some(Encodation::Ascii);
    Ok(())
}

// X12

fn x12_value(c: u8) -> Result<u8> {
    Ok(match c {
        b'\r' => 0,
        b'*' => 1,
        b'>' => 2,
        b' ' => 3,
        b'0'..=b'9' => c - b'0' + 4,
        b'A'..=b'Z' => c - b'A' + 14,
        _ => return Err(Error::message(format!("character {c:#04x} is not part of X12"))),
    })
}

fn encode_x12(ctx: &mut EncoderContext) -> Result<()> {
    let mut buffer = Vec::new();
    while ctx.has_more_characters() {
        let c = ctx.current();
        if !is_native_x12(c) {
            ctx.new_mode = Some(Encodation::Ascii);
            break;
        }
        ctx.pos += 1;
        buffer.push(x12_value(c)?);

        if buffer.len() % 3 == 0 {
            write_triplets(ctx, &mut buffer);
            if look_ahead(&ctx.msg, ctx.pos, Encodation::X12) != Encodation::X12 {
                ctx.new_mode = Some(Encodation::Ascii);
                break;
            }
        }
    }

    let len = ctx.codewords.len();
    let available = ctx.capacity_for(len)? - len;
    ctx.pos -= buffer.len();
    // a single codeword left at the end of the symbol is read as ASCII
    let cost = ctx.remaining_ascii_cost();
    if cost > 1 || available > 1 || cost != available {
        ctx.codewords.push(UNLATCH);
    }
    if ctx.new_mode.is_none() {
        ctx.new_mode = Some(Encodation::Ascii);
    }
    Ok(())
}

// EDIFACT

fn edifact_value(c: u8) -> Result<u8> {
    match c {
        32..=63 => Ok(c),
        64..=94 => Ok(c - 64),
        _ => Err(Error::message(format!("character {c:#04x} is not part of EDIFACT"))),
    }
}

/// Packs up to four 6-bit values into up to three codewords.
fn pack_edifact(values: &[u8]) -> Vec<u8> {
    let get = |i: usize| values.get(i).copied().unwrap_or(0) as u32;
    let v = (get(0) << 18) | (get(1) << 12) | (get(2) << 6) | get(3);
    let bytes = [(v >> 16) as u8, (v >> 8) as u8, v as u8];
    bytes[..values.len().clamp(1, 3)].to_vec()
}

fn encode_edifact(ctx: &mut EncoderContext) -> Result<()> {
    let mut buffer = Vec::new();
    while ctx.has_more_characters() {
        let c = ctx.current();
        if !is_native_edifact(c) {
            ctx.new_mode = Some(Encodation::Ascii);
            break;
        }
        buffer.push(edifact_value(c)?);
        ctx.pos += 1;

        if buffer.len() >= 4 {
            let packed = pack_edifact(&buffer[..4]);
            ctx.codewords.extend_from_slice(&packed);
            buffer.drain(..4);
            if look_ahead(&ctx.msg, ctx.pos, Encodation::Edifact) != Encodation::Edifact {
                ctx.new_mode = Some(Encodation::Ascii);
                break;
            }
        }
    }
    // unlatch value
    buffer.push(31);
    let result = edifact_end_of_data(ctx, &buffer);
    ctx.new_mode = Some(Encodation::Ascii);
    result
}

fn edifact_end_of_data(ctx: &mut EncoderContext, buffer: &[u8]) -> Result<()> {
    if buffer.len() == 1 {
        // up to two codewords left at the end of the symbol are read as
        // ASCII without an unlatch
        let len = ctx.codewords.len();
        let mut available = ctx.capacity_for(len)? - len;
        let cost = ctx.remaining_ascii_cost();
        if cost > available {
            match ctx.capacity_for(len + cost) {
                Ok(capacity) => available = capacity - len,
                Err(_) => ctx.reset_symbol(),
            }
        }
        if cost <= available && available <= 2 {
            return Ok(());
        }
    }

    let rest = buffer.len() - 1;
    if rest > 3 {
        return Err(Error::message("EDIFACT data cannot be terminated"));
    }
    let encoded = pack_edifact(buffer);
    let mut rest_in_ascii = !ctx.has_more_characters() && rest <= 2;

    if rest <= 2 {
        let len = ctx.codewords.len();
        let available = ctx.capacity_for(len + rest)? - len;
        if available >= 3 {
            rest_in_ascii = false;
            ctx.capacity_for(len + encoded.len())?;
        }
    }

    if rest_in_ascii {
        ctx.reset_symbol();
        ctx.pos -= rest;
    } else {
        ctx.codewords.extend_from_slice(&encoded);
    }
    Ok(())
}

// Base 256

fn encode_base256(ctx: &mut EncoderContext) -> Result<()> {
    // first slot holds the length field
    let mut buffer = vec![0u8];
    while ctx.has_more_characters() {
        buffer.push(ctx.current());
        ctx.pos += 1;
        if look_ahead(&ctx.msg, ctx.pos, Encodation::Base256) != Encodation::Base256 {
            ctx.new_mode = Some(Encodation::Ascii);
            break;
        }
    }

    let data_count = buffer.len() - 1;
    let current_size = ctx.codewords.len() + data_count + 1;
    let must_pad = ctx.capacity_for(current_size)? > current_size;
    if ctx.has_more_characters() || must_pad {
        match data_count {
            0..=249 => buffer[0] = data_count as u8,
            250..=1555 => {
                buffer[0] = (data_count / 250 + 249) as u8;
                buffer.insert(1, (data_count % 250) as u8);
            }
            _ => return Err(Error::message(format!("{data_count} bytes do not fit a Base 256 length field"))),
        }
    }

    for b in buffer {
        let pos = ctx.codewords.len() + 1;
        ctx.codewords.push(randomize_255(b, pos));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamatrix::symbol::SymbolShapeHint;

    fn encode(msg: &str) -> Vec<u8> {
        encode_high_level(msg, &SymbolTable::standard(), &SizeConstraints::default()).unwrap().codewords
    }

    #[test]
    fn test_ascii() {
        assert_eq!(encode("123456"), [142, 164, 186]);
        assert_eq!(encode("A"), [66, 129, 70]);
        assert_eq!(encode("1"), [50, 129, 70]);
        assert_eq!(encode("12"), [142, 129, 70]);
        assert_eq!(encode("Hello, World!"), [73, 239, 116, 130, 175, 52, 19, 40, 179, 242, 106, 105]);
    }

    #[test]
    fn test_c40() {
        assert_eq!(encode("AIMAIMAIM"), [230, 91, 11, 91, 11, 91, 11, 254]);
        assert_eq!(encode("AIMAIMAIM'"), [230, 91, 11, 91, 11, 91, 11, 254, 40, 129]);
        assert_eq!(encode("AIMAIMAIMA"), [230, 91, 11, 91, 11, 91, 11, 66]);
        assert_eq!(
            encode("0123456789ABCDEFGHIJ"),
            [131, 153, 175, 197, 219, 230, 89, 233, 109, 36, 128, 95, 254, 75, 129, 237]
        );
    }

    #[test]
    fn test_text() {
        assert_eq!(encode("aimaimaim"), [239, 91, 11, 91, 11, 91, 11, 254]);
        assert_eq!(encode("aimaimaim'"), [239, 91, 11, 91, 11, 91, 11, 254, 40, 129]);
    }

    #[test]
    fn test_x12() {
        assert_eq!(encode("ABC>ABC123>AB"), [238, 89, 233, 14, 192, 100, 207, 44, 31, 67]);
        assert_eq!(encode("ABC>ABC123>ABC"), [238, 89, 233, 14, 192, 100, 207, 44, 31, 254, 67, 68]);
    }

    #[test]
    fn test_edifact() {
        assert_eq!(
            encode(".A.C1.3.DATA.123DATA.123DATA"),
            [240, 184, 27, 131, 198, 236, 238, 16, 21, 1, 187, 28, 179, 16, 21, 1, 187, 28, 179, 16, 21, 1]
        );
        assert_eq!(encode(".A.C1.3.X.X2.."), [240, 184, 27, 131, 198, 236, 238, 98, 230, 50, 47, 47]);
    }

    #[test]
    fn test_latch_needs_native_group() {
        // the lowercase letter keeps ASCII until a whole X12 triplet follows
        assert_eq!(encode("  a AA0\r0*>0A*"), [33, 33, 98, 238, 20, 255, 25, 5, 6, 149, 254, 66, 43, 129, 87, 237]);
        assert_eq!(encode("   a0AAA![!A!AA:A!"), [33, 33, 33, 98, 240, 192, 16, 65, 133, 184, 65, 132, 16, 122, 66, 34]);
    }

    #[test]
    fn test_edifact_unlatch_before_extended_tail() {
        // the two extended characters need four ASCII codewords, so the
        // unlatch value (31 << 2 = 124) is written
        let codewords = encode("0 00**0! 00AA0 0 :!\u{80}¡");
        assert_eq!(codewords[9..], [240, 4, 28, 32, 194, 14, 161, 124, 235, 1, 235, 34, 129]);
        let codewords = encode("A a*A*aa>.\r*0*\rAaa>0..A.* *0*Aä");
        assert_eq!(codewords[19..], [240, 251, 11, 174, 6, 234, 160, 171, 10, 129, 124, 235, 101]);
    }

    #[test]
    fn test_base256() {
        assert_eq!(encode("«äöüé»"), [231, 44, 108, 59, 226, 126, 1, 104]);
        assert_eq!(encode("«äöüéà»"), [231, 51, 108, 59, 226, 126, 1, 141, 254, 129]);
    }

    #[test]
    fn test_macro_05() {
        assert_eq!(encode("[)>\u{1e}05\u{1d}01234\u{1e}\u{04}"), [236, 131, 153, 53, 129]);
    }

    #[test]
    fn test_symbol_selection() {
        let table = SymbolTable::standard();
        let rect = SizeConstraints { shape: SymbolShapeHint::ForceRectangle, ..Default::default() };
        let encoded = encode_high_level("123456", &table, &rect).unwrap();
        assert!(encoded.symbol.rectangular);
        assert_eq!(encoded.codewords.len(), encoded.symbol.data_capacity);
        assert_eq!(encoded.codewords[..3], [142, 164, 186]);
    }

    #[test]
    fn test_rejects() {
        let table = SymbolTable::standard();
        let any = SizeConstraints::default();
        assert!(matches!(encode_high_level("€", &table, &any), Err(Error::InvalidMessage(_))));
        let long = "x".repeat(3200);
        assert_eq!(encode_high_level(&long, &table, &any), Err(Error::CapacityExceeded));
    }

    #[test]
    fn test_look_ahead_stays_on_short_input() {
        assert_eq!(look_ahead(b"AB", 2, Encodation::C40), Encodation::C40);
        assert_eq!(look_ahead(b"12", 0, Encodation::Ascii), Encodation::Ascii);
    }
}
