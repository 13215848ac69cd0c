//! USPS Intelligent Mail barcode (4-State Customer Barcode).
//!
//! A 20 digit tracking code and an optional 5, 9 or 11 digit routing code
//! are packed into one integer, protected by an 11 bit frame check sequence
//! and spread over ten 13 bit characters, which make up the 65 bars.

use super::postal::{PostalConfig, ASCENDER, DESCENDER, FULL, SHORT};
use crate::{
    dimension::BarcodeDimension,
    logic::{self, BarGroup, ClassicLogicHandler, Event},
    params::{self, BarcodeParams, ChecksumMode},
    Error, Result,
};

pub const BAR_COUNT: usize = 65;
const TRACKING_LEN: usize = 20;

/// Characters with `ones` bits set out of 13, a character and its bit
/// reversal next to each other from the start, palindromes from the end.
const fn n_of_13<const N: usize>(ones: u32) -> [u16; N] {
    let mut table = [0; N];
    let (mut lo, mut hi) = (0, N - 1);
    let mut c: u16 = 0;
    while c < 8192 {
        let reversed = c.reverse_bits() >> 3;
        if c.count_ones() == ones && reversed >= c {
            if reversed == c {
                table[hi] = c;
                hi = hi.saturating_sub(1);
            } else {
                table[lo] = c;
                table[lo + 1] = reversed;
                lo += 2;
            }
        }
        c += 1;
    }
    table
}

static TABLE_5_OF_13: [u16; 1287] = n_of_13(5);
static TABLE_2_OF_13: [u16; 78] = n_of_13(2);

/// Per bar: (character, bit) of its descender then of its ascender.
#[rustfmt::skip]
const BARS: [(u8, u8, u8, u8); BAR_COUNT] = [
    (7, 2, 4, 3), (1, 10, 0, 0), (9, 12, 2, 8), (5, 5, 6, 11), (8, 9, 3, 1),
    (0, 1, 5, 12), (2, 5, 1, 8), (4, 4, 9, 11), (6, 3, 8, 10), (3, 9, 7, 6),
    (5, 11, 1, 4), (8, 5, 2, 12), (9, 10, 0, 2), (7, 1, 6, 7), (3, 6, 4, 9),
    (0, 3, 8, 6), (6, 4, 2, 7), (1, 1, 9, 9), (7, 10, 5, 2), (4, 0, 3, 8),
    (6, 2, 0, 4), (8, 11, 1, 0), (9, 8, 3, 12), (2, 6, 7, 7), (5, 1, 4, 10),
    (1, 12, 6, 9), (7, 3, 8, 0), (5, 8, 9, 7), (4, 6, 2, 10), (3, 4, 0, 5),
    (8, 4, 5, 7), (7, 11, 1, 9), (6, 0, 9, 6), (0, 6, 4, 8), (2, 1, 3, 2),
    (5, 9, 8, 12), (4, 11, 6, 1), (9, 5, 7, 4), (3, 3, 1, 2), (0, 7, 2, 0),
    (1, 3, 4, 1), (6, 10, 3, 5), (8, 7, 9, 4), (2, 11, 5, 6), (0, 8, 7, 12),
    (4, 2, 8, 1), (5, 10, 3, 0), (9, 3, 0, 9), (6, 5, 2, 4), (7, 8, 1, 7),
    (5, 0, 4, 5), (2, 3, 0, 10), (6, 12, 9, 2), (3, 11, 1, 6), (8, 8, 7, 9),
    (5, 4, 0, 11), (1, 5, 2, 2), (9, 1, 4, 12), (8, 3, 6, 6), (7, 0, 3, 7),
    (4, 7, 7, 5), (0, 12, 1, 11), (2, 9, 9, 0), (6, 8, 5, 3), (3, 10, 8, 2),
];

fn crc_step(fcs: &mut u16, data: &mut u16) {
    const POLY: u16 = 0x0F35;
    *fcs = if (*fcs ^ *data) & 0x400 != 0 { (*fcs << 1) ^ POLY } else { *fcs << 1 };
    *fcs &= 0x7FF;
    *data <<= 1;
}

/// 11 bit CRC (generator 0xF35) over the 102 bit binary value, most
/// significant bit first.
fn frame_check_sequence(value: u128) -> u16 {
    let bytes = value.to_be_bytes();
    let bytes = &bytes[3..];
    let mut fcs: u16 = 0x07FF;

    // the top two bits of the 104 bit field are unused
    let mut data = (bytes[0] as u16) << 5;
    for _ in 2..8 {
        crc_step(&mut fcs, &mut data);
    }
    for &byte in &bytes[1..] {
        let mut data = (byte as u16) << 3;
        for _ in 0..8 {
            crc_step(&mut fcs, &mut data);
        }
    }
    fcs
}

/// Packs the routing and tracking codes into the binary value.
fn binary_value(tracking: &str, routing: &str) -> Result<u128> {
    let number = |s: &str| s.bytes().fold(0u128, |acc, b| acc * 10 + (b - b'0') as u128);
    let mut value = match routing.len() {
        0 => 0,
        5 => number(routing) + 1,
        9 => number(routing) + 100_000 + 1,
        11 => number(routing) + 1_000_000_000 + 100_000 + 1,
        l => return Err(Error::message(format!("USPS routing code has 0, 5, 9 or 11 digits, got {l}"))),
    };

    let t = tracking.as_bytes();
    if t[1] > b'4' {
        return Err(Error::message("second digit of the USPS barcode identifier must be 0 to 4"));
    }
    value = value * 10 + (t[0] - b'0') as u128;
    value = value * 5 + (t[1] - b'0') as u128;
    Ok(t[2..].iter().fold(value, |acc, &b| acc * 10 + (b - b'0') as u128))
}

/// Bar weights of a tracking code and a routing code.
pub fn encode_bars(tracking: &str, routing: &str) -> Result<[u8; BAR_COUNT]> {
    super::require_digits(tracking, "USPS tracking code")?;
    if tracking.len() != TRACKING_LEN {
        return Err(Error::message(format!("USPS tracking code has 20 digits, got {}", tracking.len())));
    }
    if !routing.is_empty() {
        super::require_digits(routing, "USPS routing code")?;
    }

    let mut value = binary_value(tracking, routing)?;
    let fcs = frame_check_sequence(value);

    let mut codewords = [0u16; 10];
    codewords[9] = (value % 636) as u16;
    value /= 636;
    for cw in codewords[1..9].iter_mut().rev() {
        *cw = (value % 1365) as u16;
        value /= 1365;
    }
    codewords[0] = value as u16;
    codewords[9] *= 2;
    if fcs & 0x400 != 0 {
        codewords[0] += 659;
    }

    let mut chars = [0u16; 10];
    for (i, (ch, &cw)) in chars.iter_mut().zip(&codewords).enumerate() {
        let cw = cw as usize;
        *ch = if cw < 1287 { TABLE_5_OF_13[cw] } else { TABLE_2_OF_13[cw - 1287] };
        if fcs & (1 << i) != 0 {
            *ch = !*ch & 0x1FFF;
        }
    }

    let mut bars = [SHORT; BAR_COUNT];
    for (bar, &(dc, db, ac, ab)) in bars.iter_mut().zip(&BARS) {
        let descender = chars[dc as usize] >> db & 1 != 0;
        let ascender = chars[ac as usize] >> ab & 1 != 0;
        *bar = match (descender, ascender) {
            (true, true) => FULL,
            (false, true) => ASCENDER,
            (true, false) => DESCENDER,
            (false, false) => SHORT,
        };
    }
    Ok(bars)
}

/// USPS Intelligent Mail generator. The message is the tracking code
/// followed by the routing code; `-` and spaces are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct Usps4Cb {
    config: PostalConfig,
}

impl Usps4Cb {
    pub fn new(config: PostalConfig) -> Result<Self> {
        config.validate()?;
        if config.checksum != ChecksumMode::Ignore {
            return Err(Error::UnsupportedOperation(
                "USPS Intelligent Mail carries its own frame check sequence, only checksum mode 'ignore' applies".into(),
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &PostalConfig {
        &self.config
    }

    fn bars(&self, msg: &str) -> Result<[u8; BAR_COUNT]> {
        let digits = super::postnet::strip_separators(msg);
        super::require_digits(&digits, "USPS Intelligent Mail")?;
        if digits.len() < TRACKING_LEN {
            return Err(Error::message(format!("USPS Intelligent Mail needs at least 20 digits, got {}", digits.len())));
        }
        let (tracking, routing) = digits.split_at(TRACKING_LEN);
        encode_bars(tracking, routing)
    }

    pub fn calc_dimensions(&self, msg: &str) -> Result<BarcodeDimension> {
        self.bars(msg)?;
        Ok(params::linear_dimensions(&self.config, self.config.run_width(BAR_COUNT)))
    }

    pub fn events(&self, msg: &str) -> Result<impl Iterator<Item = Event>> {
        let bars = self.bars(msg)?;
        let hr = params::format_human_readable(msg, self.config.common.pattern.as_deref());

        let mut elements = Vec::with_capacity(2 * BAR_COUNT - 1);
        for (i, &weight) in bars.iter().enumerate() {
            if i > 0 {
                elements.push(logic::bar(false, 1));
            }
            elements.push(logic::bar(true, weight));
        }
        let body = logic::group(BarGroup::MessageCharacter, None, elements);
        Ok(logic::barcode(msg.to_owned(), hr, body))
    }

    pub fn generate_barcode<H: ClassicLogicHandler + ?Sized>(&self, handler: &mut H, msg: &str) -> Result<()> {
        logic::emit(handler, self.events(msg)?);
        Ok(())
    }
}
