//! Decodes high level codewords back into messages. Every message an
//! encoder accepts has to come back unchanged.

use proptest::prelude::*;
use symbology::{
    datamatrix::{self, SizeConstraints, SymbolTable},
    pdf417,
};

// Data Matrix

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scheme {
    Ascii,
    C40,
    Text,
    X12,
    Edifact,
    Base256,
}

const C40_BASE: &[u8; 37] = b" 0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const C40_SHIFT3: &[u8; 32] = b"`abcdefghijklmnopqrstuvwxyz{|}~\x7f";
const TEXT_BASE: &[u8; 37] = b" 0123456789abcdefghijklmnopqrstuvwxyz";
const TEXT_SHIFT3: &[u8; 32] = b"`ABCDEFGHIJKLMNOPQRSTUVWXYZ{|}~\x7f";
const SHIFT2: &[u8; 27] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_";

fn derandomize_253(cw: u8, pos: usize) -> u8 {
    let t = cw as i16 - ((149 * pos) % 253 + 1) as i16;
    if t >= 1 { t as u8 } else { (t + 254) as u8 }
}

fn derandomize_255(cw: u8, pos: usize) -> u8 {
    let t = cw as i16 - ((149 * pos) % 255 + 1) as i16;
    if t >= 0 { t as u8 } else { (t + 256) as u8 }
}

fn triplet(a: u8, b: u8) -> [u8; 3] {
    let v = a as u16 * 256 + b as u16 - 1;
    [(v / 1600) as u8, (v / 40 % 40) as u8, (v % 40) as u8]
}

fn x12_char(v: u8) -> u8 {
    match v {
        0 => b'\r',
        1 => b'*',
        2 => b'>',
        3 => b' ',
        4..=13 => b'0' + v - 4,
        14..=39 => b'A' + v - 14,
        _ => panic!("X12 value {v}"),
    }
}

fn decode_datamatrix(data: &[u8]) -> String {
    let mut out = Vec::new();
    let mut header = None;
    let mut scheme = Scheme::Ascii;
    let mut i = 0;

    while i < data.len() {
        scheme = match scheme {
            Scheme::Ascii => {
                let mut upper = false;
                let mut next = Scheme::Ascii;
                while i < data.len() {
                    let cw = data[i];
                    i += 1;
                    match cw {
                        1..=128 => {
                            out.push(if upper { cw + 127 } else { cw - 1 });
                            upper = false;
                        }
                        129 => {
                            for (k, &pad) in data.iter().enumerate().skip(i) {
                                assert_eq!(derandomize_253(pad, k + 1), 129, "padding at {k}");
                            }
                            i = data.len();
                        }
                        130..=229 => out.extend_from_slice(&[b'0' + (cw - 130) / 10, b'0' + (cw - 130) % 10]),
                        230 => next = Scheme::C40,
                        231 => next = Scheme::Base256,
                        235 => upper = true,
                        236 | 237 if i == 1 => header = Some(cw),
                        238 => next = Scheme::X12,
                        239 => next = Scheme::Text,
                        240 => next = Scheme::Edifact,
                        _ => panic!("codeword {cw} in ASCII"),
                    }
                    if next != Scheme::Ascii {
                        break;
                    }
                }
                next
            }
            Scheme::Base256 => {
                let mut len = derandomize_255(data[i], i + 1) as usize;
                i += 1;
                if len == 0 {
                    len = data.len() - i;
                } else if len >= 250 {
                    len = 250 * (len - 249) + derandomize_255(data[i], i + 1) as usize;
                    i += 1;
                }
                for _ in 0..len {
                    out.push(derandomize_255(data[i], i + 1));
                    i += 1;
                }
                Scheme::Ascii
            }
            Scheme::Edifact => {
                // up to two codewords left at the end are ASCII
                'edifact: while data.len() - i > 2 {
                    let mut chunk = 0u32;
                    for (k, shifts) in [&[18u32][..], &[12][..], &[6, 0][..]].into_iter().enumerate() {
                        if i == data.len() {
                            break 'edifact;
                        }
                        chunk |= (data[i] as u32) << (16 - 8 * k);
                        i += 1;
                        for &shift in shifts {
                            let v = (chunk >> shift) as u8 & 0x3f;
                            if v == 31 {
                                break 'edifact;
                            }
                            out.push(if v & 0x20 != 0 { v } else { v | 0x40 });
                        }
                    }
                }
                Scheme::Ascii
            }
            Scheme::X12 => {
                let mut unlatched = false;
                while data.len() - i > 1 {
                    if data[i] == 254 {
                        i += 1;
                        unlatched = true;
                        break;
                    }
                    out.extend(triplet(data[i], data[i + 1]).map(x12_char));
                    i += 2;
                }
                if !unlatched && data.get(i) == Some(&254) {
                    i += 1;
                }
                Scheme::Ascii
            }
            Scheme::C40 | Scheme::Text => {
                let (base, shift3) = if scheme == Scheme::C40 { (C40_BASE, C40_SHIFT3) } else { (TEXT_BASE, TEXT_SHIFT3) };
                let mut shift = 0;
                let mut upper = false;
                let mut unlatched = false;
                while data.len() - i > 1 {
                    if data[i] == 254 {
                        i += 1;
                        unlatched = true;
                        break;
                    }
                    for v in triplet(data[i], data[i + 1]) {
                        let c = match (shift, v) {
                            (0, 0..=2) => {
                                shift = v + 1;
                                continue;
                            }
                            (0, _) => base[v as usize - 3],
                            (1, _) => v,
                            (2, 30) => {
                                upper = true;
                                shift = 0;
                                continue;
                            }
                            (2, _) => SHIFT2[v as usize],
                            _ => shift3[v as usize],
                        };
                        shift = 0;
                        out.push(if upper { c + 128 } else { c });
                        upper = false;
                    }
                    i += 2;
                }
                if !unlatched && data.get(i) == Some(&254) {
                    i += 1;
                }
                Scheme::Ascii
            }
        };
    }

    let bytes = match header {
        Some(236) => [b"[)>\x1e05\x1d".as_slice(), out.as_slice(), b"\x1e\x04".as_slice()].concat(),
        Some(_) => [b"[)>\x1e06\x1d".as_slice(), out.as_slice(), b"\x1e\x04".as_slice()].concat(),
        None => out,
    };
    bytes.into_iter().map(char::from).collect()
}

fn datamatrix_round_trip(msg: &str) -> String {
    let encoded = datamatrix::encode_high_level(msg, &SymbolTable::standard(), &SizeConstraints::default()).unwrap();
    assert_eq!(encoded.codewords.len(), encoded.symbol.data_capacity);
    decode_datamatrix(&encoded.codewords)
}

// PDF417

const PDF_MIXED: &[u8; 25] = b"0123456789&\r\t,:#-.$/+%*=^";
const PDF_PUNCTUATION: &[u8; 29] = b";<>@[\\]_`~!\r\t,:\n-.$/\"|*()?{}'";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Sub {
    Alpha,
    Lower,
    Mixed,
    Punctuation,
    AlphaShift,
    PunctuationShift,
}

enum Value {
    Text(u8),
    Byte(u8),
    Latch,
}

fn decode_text(cw: &[u16], mut i: usize, out: &mut Vec<u8>) -> usize {
    let mut values = Vec::new();
    while i < cw.len() {
        match cw[i] {
            c @ 0..=899 => {
                values.extend([Value::Text((c / 30) as u8), Value::Text((c % 30) as u8)]);
                i += 1;
            }
            913 => {
                values.push(Value::Byte(cw[i + 1] as u8));
                i += 2;
            }
            900 => {
                values.push(Value::Latch);
                i += 1;
            }
            _ => break,
        }
    }

    let (mut sub, mut prior) = (Sub::Alpha, Sub::Alpha);
    for value in values {
        let v = match value {
            Value::Byte(b) => {
                if sub == Sub::PunctuationShift {
                    sub = prior;
                }
                out.push(b);
                continue;
            }
            Value::Latch => {
                sub = Sub::Alpha;
                continue;
            }
            Value::Text(v) => v,
        };
        match (sub, v) {
            (Sub::Alpha, 0..=25) => out.push(b'A' + v),
            (Sub::Lower, 0..=25) => out.push(b'a' + v),
            (Sub::Alpha | Sub::Lower | Sub::Mixed, 26) => out.push(b' '),
            (Sub::Alpha | Sub::Mixed, 27) => sub = Sub::Lower,
            (Sub::Lower, 27) => (prior, sub) = (sub, Sub::AlphaShift),
            (Sub::Alpha | Sub::Lower, 28) => sub = Sub::Mixed,
            (Sub::Mixed, 28) => sub = Sub::Alpha,
            (Sub::Alpha | Sub::Lower | Sub::Mixed, 29) => (prior, sub) = (sub, Sub::PunctuationShift),
            (Sub::Mixed, 25) => sub = Sub::Punctuation,
            (Sub::Mixed, _) => out.push(PDF_MIXED[v as usize]),
            (Sub::Punctuation, 29) => sub = Sub::Alpha,
            (Sub::Punctuation, _) => out.push(PDF_PUNCTUATION[v as usize]),
            (Sub::AlphaShift, _) => {
                sub = prior;
                match v {
                    0..=25 => out.push(b'A' + v),
                    26 => out.push(b' '),
                    _ => {}
                }
            }
            (Sub::PunctuationShift, _) => {
                sub = prior;
                match v {
                    0..=28 => out.push(PDF_PUNCTUATION[v as usize]),
                    _ => sub = Sub::Alpha,
                }
            }
            _ => panic!("text value {v} in {sub:?}"),
        }
    }
    i
}

fn decode_bytes(cw: &[u16], mut i: usize, six: bool, out: &mut Vec<u8>) -> usize {
    let data = |k: usize| cw.get(k).is_some_and(|&c| c < 900);
    while data(i) {
        let start = i;
        let mut value = 0u64;
        let mut count = 0;
        loop {
            value = value * 900 + cw[i] as u64;
            i += 1;
            count += 1;
            if count == 5 || !data(i) {
                break;
            }
        }
        // with 901 a group of five is only packed when more data follows
        if count == 5 && (six || data(i)) {
            out.extend_from_slice(&value.to_be_bytes()[2..]);
        } else {
            i = start;
            while data(i) {
                out.push(cw[i] as u8);
                i += 1;
            }
        }
    }
    i
}

fn decode_numeric(cw: &[u16], mut i: usize, out: &mut Vec<u8>) -> usize {
    let data = |k: usize| cw.get(k).is_some_and(|&c| c < 900);
    while data(i) {
        // little endian decimal digits of up to 15 base 900 codewords
        let mut digits: Vec<u32> = Vec::new();
        let mut count = 0;
        while count < 15 && data(i) {
            let mut carry = cw[i] as u32;
            for d in digits.iter_mut() {
                let v = *d * 900 + carry;
                *d = v % 10;
                carry = v / 10;
            }
            while carry > 0 {
                digits.push(carry % 10);
                carry /= 10;
            }
            i += 1;
            count += 1;
        }
        assert_eq!(digits.pop(), Some(1), "numeric group without its leading 1");
        out.extend(digits.iter().rev().map(|&d| b'0' + d as u8));
    }
    i
}

fn decode_pdf417(cw: &[u16]) -> String {
    let mut out = Vec::new();
    let mut i = 0;
    while i < cw.len() {
        i = match cw[i] {
            900 => decode_text(cw, i + 1, &mut out),
            901 => decode_bytes(cw, i + 1, false, &mut out),
            924 => decode_bytes(cw, i + 1, true, &mut out),
            902 => decode_numeric(cw, i + 1, &mut out),
            913 => {
                out.push(cw[i + 1] as u8);
                i + 2
            }
            _ => decode_text(cw, i, &mut out),
        };
    }
    out.into_iter().map(char::from).collect()
}

fn pdf417_round_trip(msg: &str) -> String {
    decode_pdf417(&pdf417::encode_high_level(msg).unwrap())
}

fn latin1() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<u8>(), 1..80).prop_map(|bytes| bytes.into_iter().map(char::from).collect())
}

#[test]
fn datamatrix_x12_and_edifact_next_to_other_characters() {
    for msg in [
        "  a AA0\r0*>0A*",
        "   a0AAA![!A!AA:A!",
        "0 00**0! 00AA0 0 :!\u{80}¡",
        "A a*A*aa>.\r*0*\rAaa>0..A.* *0*Aä",
        "ABC>ABC123>ABC",
        ".A.C1.3.X.X2..",
        "[)>\u{1e}05\u{1d}01234\u{1e}\u{04}",
    ] {
        assert_eq!(datamatrix_round_trip(msg), msg);
    }
}

#[test]
fn pdf417_text_after_single_byte_shift() {
    for msg in [
        " 000000000000   0\r[{\t\t0AA\rA\t ;\t:¡00000",
        "Hello\u{1b}World",
        "This! Is a `quote (100%)`.",
        "AB1234567890123",
        "12345678987654321 num",
    ] {
        assert_eq!(pdf417_round_trip(msg), msg);
    }
}

proptest! {
    #[test]
    fn datamatrix_latin1(msg in latin1()) {
        prop_assert_eq!(datamatrix_round_trip(&msg), msg);
    }

    #[test]
    fn datamatrix_x12_edifact_mix(msg in "[ 0-9A-Z\r*>a:!\\[.\u{80}\u{a1}\u{e4}]{1,60}") {
        prop_assert_eq!(datamatrix_round_trip(&msg), msg);
    }

    #[test]
    fn pdf417_latin1(msg in latin1()) {
        prop_assert_eq!(pdf417_round_trip(&msg), msg);
    }

    #[test]
    fn pdf417_text_and_shifts(msg in "[ 0\r\t\\[{;:!A-Ca-c\u{1b}\u{a1}]{1,60}") {
        prop_assert_eq!(pdf417_round_trip(&msg), msg);
    }
}
