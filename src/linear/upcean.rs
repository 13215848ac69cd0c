//! EAN-13, EAN-8, UPC-A and UPC-E with optional 2 or 5 digit supplementals.
//!
//! A supplemental follows the main message after a `+`, e.g.
//! `"4006381333931+12"`.

use super::fixed_length_checksum;
use crate::{
    dimension::BarcodeDimension,
    logic::{self, BarGroup, ClassicLogicHandler, Event},
    params::{self, BarcodeParams, ChecksumMode, CommonParams},
    Error, Result,
};

/// Odd parity (set A) digits, space first. Set C uses the same widths bar
/// first and set B (even parity) the reversed widths.
const LEFT_ODD: [[u8; 4]; 10] = [
    [3, 2, 1, 1], [2, 2, 2, 1], [2, 1, 2, 2], [1, 4, 1, 1], [1, 1, 3, 2],
    [1, 2, 3, 1], [1, 1, 1, 4], [1, 3, 1, 2], [1, 2, 1, 3], [3, 1, 1, 2],
];

/// Parity of the left group of an EAN-13 by its first digit, a set bit is
/// even parity. The first of the six digits is the most significant bit.
const EAN13_PARITY: [u8; 10] = [0x00, 0x0B, 0x0D, 0x0E, 0x13, 0x19, 0x1C, 0x15, 0x16, 0x1A];

/// Parity of the six UPC-E digits by check digit, number system 0. Number
/// system 1 uses the complement.
const UPCE_PARITY: [u8; 10] = [0x38, 0x34, 0x32, 0x31, 0x2C, 0x26, 0x23, 0x2A, 0x29, 0x25];

/// Parity of an EAN-5 supplemental by its check value.
const EAN5_PARITY: [u8; 10] = [0x18, 0x14, 0x12, 0x11, 0x0C, 0x06, 0x03, 0x0A, 0x09, 0x05];

const EDGE_GUARD: [u8; 3] = [1, 1, 1];
const CENTER_GUARD: [u8; 5] = [1, 1, 1, 1, 1];
const UPCE_END_GUARD: [u8; 6] = [1, 1, 1, 1, 1, 1];
const SUPPLEMENTAL_GUARD: [u8; 3] = [1, 1, 2];
const SUPPLEMENTAL_DELINEATOR: [u8; 2] = [1, 1];
/// Space between the main symbol and its supplemental, in modules.
const SUPPLEMENTAL_GAP: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parity {
    Odd,
    Even,
    Right,
}

fn digit_widths(digit: u8, parity: Parity) -> [u8; 4] {
    let widths = LEFT_ODD[digit as usize];
    match parity {
        Parity::Odd | Parity::Right => widths,
        Parity::Even => [widths[3], widths[2], widths[1], widths[0]],
    }
}

fn digit_bars(digit: u8, parity: Parity) -> impl Iterator<Item = Event> {
    logic::alternating(digit_widths(digit, parity), parity == Parity::Right)
}

fn parity_of(mask: u8, index: usize, count: usize) -> Parity {
    if mask & (1 << (count - 1 - index)) != 0 { Parity::Even } else { Parity::Odd }
}

fn digits(s: &str) -> Vec<u8> {
    s.bytes().map(|b| b - b'0').collect()
}

/// Expands a UPC-E message (7 digits, or 8 with the check digit) to the
/// UPC-A message it stands for.
pub fn expand_upce(msg: &str) -> Result<String> {
    super::require_digits(msg, "UPC-E")?;
    let d = msg.as_bytes();
    if !matches!(d.len(), 7 | 8) {
        return Err(Error::message(format!("UPC-E messages have 7 or 8 digits, got {}", d.len())));
    }
    if !matches!(d[0], b'0' | b'1') {
        return Err(Error::message("UPC-E number system must be 0 or 1"));
    }

    let s = |range: core::ops::Range<usize>| &msg[range];
    let body = match d[6] {
        b'0'..=b'2' => format!("{}{}0000{}", s(0..3), s(6..7), s(3..6)),
        b'3' => format!("{}00000{}", s(0..4), s(4..6)),
        b'4' => format!("{}00000{}", s(0..5), s(5..6)),
        _ => format!("{}0000{}", s(0..6), s(6..7)),
    };
    Ok(format!("{body}{}", s(7..d.len())))
}

/// Compacts a UPC-A message (11 digits, or 12 with the check digit) to
/// UPC-E, or `None` if it has no UPC-E form.
pub fn compact_to_upce(msg: &str) -> Option<String> {
    if !matches!(msg.len(), 11 | 12) || !msg.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let d = msg.as_bytes();
    if !matches!(d[0], b'0' | b'1') {
        return None;
    }

    let s = |range: core::ops::Range<usize>| &msg[range];
    let (manufacturer, product) = (&d[1..6], &d[6..11]);
    let body = if matches!(manufacturer[2], b'0'..=b'2') && &manufacturer[3..] == b"00" && &product[..2] == b"00" {
        format!("{}{}{}", s(0..3), s(8..11), s(3..4))
    } else if &manufacturer[3..] == b"00" && &product[..3] == b"000" {
        format!("{}{}3", s(0..4), s(9..11))
    } else if manufacturer[4] == b'0' && &product[..4] == b"0000" {
        format!("{}{}4", s(0..5), s(10..11))
    } else if &product[..4] == b"0000" && product[4] >= b'5' {
        format!("{}{}", s(0..6), s(10..11))
    } else {
        return None;
    };
    Some(format!("{body}{}", s(11..d.len())))
}

/// Check value of an EAN-5 supplemental.
fn ean5_check(d: &[u8]) -> u8 {
    let sum: u32 = d.iter().enumerate().map(|(i, &v)| v as u32 * if i % 2 == 0 { 3 } else { 9 }).sum();
    (sum % 10) as u8
}

fn supplemental_events(supp: &str) -> Vec<Event> {
    let d = digits(supp);
    let (mask, count) = if d.len() == 2 {
        ((d[0] * 10 + d[1]) % 4, 2)
    } else {
        (EAN5_PARITY[ean5_check(&d) as usize], 5)
    };

    let mut bars = vec![logic::bar(false, SUPPLEMENTAL_GAP)];
    bars.extend(logic::alternating(SUPPLEMENTAL_GUARD, true));
    for (i, &digit) in d.iter().enumerate() {
        if i > 0 {
            bars.extend(logic::alternating(SUPPLEMENTAL_DELINEATOR, false));
        }
        bars.extend(digit_bars(digit, parity_of(mask, i, count)));
    }
    logic::group(BarGroup::UpcEanSupplemental, Some(supp.to_owned()), bars).collect()
}

const fn supplemental_modules(len: usize) -> usize {
    SUPPLEMENTAL_GAP as usize + 4 + 7 * len + 2 * (len - 1)
}

/// The UPC/EAN family members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum UpcEanVariant {
    Ean13,
    Ean8,
    UpcA,
    UpcE,
}

impl UpcEanVariant {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ean13 => "EAN-13",
            Self::Ean8 => "EAN-8",
            Self::UpcA => "UPC-A",
            Self::UpcE => "UPC-E",
        }
    }

    /// Width of the main symbol in modules.
    pub const fn modules(&self) -> usize {
        match self {
            Self::Ean13 | Self::UpcA => 95,
            Self::Ean8 => 67,
            Self::UpcE => 51,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UpcEanConfig {
    pub common: CommonParams,
    pub checksum: ChecksumMode,
}

impl Default for UpcEanConfig {
    fn default() -> Self {
        let mut common = CommonParams::with_module_width(0.33);
        common.bar_height = 22.85;
        Self { common, checksum: ChecksumMode::AutoIgnoreIfAbsent }
    }
}

impl BarcodeParams for UpcEanConfig {
    fn common(&self) -> &CommonParams {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonParams {
        &mut self.common
    }
}

impl UpcEanConfig {
    pub fn with_checksum(mut self, checksum: ChecksumMode) -> Self {
        self.checksum = checksum;
        self
    }
}

/// A validated message: main digits with their check digit and the
/// optional supplemental.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Message {
    main: String,
    supplemental: Option<String>,
}

/// Generator for every member of the UPC/EAN family.
#[derive(Debug, Clone, PartialEq)]
pub struct UpcEan {
    variant: UpcEanVariant,
    config: UpcEanConfig,
}

impl UpcEan {
    pub fn new(variant: UpcEanVariant, config: UpcEanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { variant, config })
    }

    pub fn variant(&self) -> UpcEanVariant {
        self.variant
    }

    pub fn config(&self) -> &UpcEanConfig {
        &self.config
    }

    fn parse(&self, msg: &str) -> Result<Message> {
        let name = self.variant.name();
        let (main, supplemental) = match msg.split_once('+') {
            Some((main, supp)) => (main, Some(supp)),
            None => (msg, None),
        };
        if let Some(supp) = supplemental {
            super::require_digits(supp, "UPC/EAN supplemental")?;
            if !matches!(supp.len(), 2 | 5) {
                return Err(Error::message(format!("supplementals have 2 or 5 digits, got {}", supp.len())));
            }
        }
        super::require_digits(main, name)?;

        let mode = self.config.checksum;
        let main = match self.variant {
            UpcEanVariant::Ean13 => fixed_length_checksum(main, 13, mode, name)?,
            UpcEanVariant::Ean8 => fixed_length_checksum(main, 8, mode, name)?,
            UpcEanVariant::UpcA => fixed_length_checksum(main, 12, mode, name)?,
            UpcEanVariant::UpcE => {
                let upce = match main.len() {
                    7 | 8 => main.to_owned(),
                    11 | 12 => compact_to_upce(main)
                        .ok_or_else(|| Error::message(format!("UPC-A message '{main}' cannot be compacted to UPC-E")))?,
                    l => return Err(Error::message(format!("UPC-E needs 7, 8, 11 or 12 digits, got {l}"))),
                };
                let upca = fixed_length_checksum(&expand_upce(&upce)?, 12, mode, name)?;
                format!("{}{}", &upce[..7], &upca[11..])
            }
        };
        Ok(Message { main, supplemental: supplemental.map(str::to_owned) })
    }

    pub fn calc_dimensions(&self, msg: &str) -> Result<BarcodeDimension> {
        let msg = self.parse(msg)?;
        let modules = self.variant.modules() + msg.supplemental.as_ref().map_or(0, |s| supplemental_modules(s.len()));
        Ok(params::linear_dimensions(&self.config, modules as f64 * self.config.common.module_width))
    }

    fn main_events(&self, main: &str) -> Vec<Event> {
        let d = digits(main);
        let d = d.as_slice();
        let label = |range: core::ops::Range<usize>| Some(main[range].to_owned());
        let guard = |widths: &[u8], black_first: bool| {
            logic::group(BarGroup::UpcEanGuard, None, logic::alternating(widths.to_vec(), black_first))
        };
        let left = |indices: core::ops::Range<usize>, mask: u8| {
            let count = indices.len();
            let start = indices.start;
            indices.flat_map(move |i| digit_bars(d[i], parity_of(mask, i - start, count))).collect::<Vec<_>>()
        };
        let right = |indices: core::ops::Range<usize>| {
            indices.flat_map(|i| digit_bars(d[i], Parity::Right)).collect::<Vec<_>>()
        };

        let mut events = Vec::new();
        match self.variant {
            UpcEanVariant::Ean13 | UpcEanVariant::UpcA => {
                let (first, mask) = match self.variant {
                    UpcEanVariant::Ean13 => (1, EAN13_PARITY[d[0] as usize]),
                    _ => (0, 0),
                };
                if first == 1 {
                    events.extend(logic::group(BarGroup::UpcEanLead, label(0..1), core::iter::empty()));
                }
                let last = d.len() - 1;
                events.extend(guard(&EDGE_GUARD, true));
                events.extend(logic::group(BarGroup::UpcEanGroup, label(first..first + 6), left(first..first + 6, mask)));
                events.extend(guard(&CENTER_GUARD, false));
                events.extend(logic::group(BarGroup::UpcEanGroup, label(first + 6..last), right(first + 6..last)));
                events.extend(logic::group(BarGroup::UpcEanCheck, label(last..last + 1), right(last..last + 1)));
                events.extend(guard(&EDGE_GUARD, true));
            }
            UpcEanVariant::Ean8 => {
                events.extend(guard(&EDGE_GUARD, true));
                events.extend(logic::group(BarGroup::UpcEanGroup, label(0..4), left(0..4, 0)));
                events.extend(guard(&CENTER_GUARD, false));
                events.extend(logic::group(BarGroup::UpcEanGroup, label(4..7), right(4..7)));
                events.extend(logic::group(BarGroup::UpcEanCheck, label(7..8), right(7..8)));
                events.extend(guard(&EDGE_GUARD, true));
            }
            UpcEanVariant::UpcE => {
                let mask = match d[0] {
                    0 => UPCE_PARITY[d[7] as usize],
                    _ => UPCE_PARITY[d[7] as usize] ^ 0x3F,
                };
                events.extend(logic::group(BarGroup::UpcEanLead, label(0..1), core::iter::empty()));
                events.extend(guard(&EDGE_GUARD, true));
                events.extend(logic::group(BarGroup::UpcEanGroup, label(1..7), left(1..7, mask)));
                events.extend(guard(&UPCE_END_GUARD, false));
                events.extend(logic::group(BarGroup::UpcEanCheck, label(7..8), core::iter::empty()));
            }
        }
        events
    }

    pub fn events(&self, msg: &str) -> Result<impl Iterator<Item = Event>> {
        let Message { main, supplemental } = self.parse(msg)?;
        let text = match &supplemental {
            Some(supp) => format!("{main} {supp}"),
            None => main.clone(),
        };
        let hr = params::format_human_readable(&text, self.config.common.pattern.as_deref());

        let mut body = self.main_events(&main);
        if let Some(supp) = &supplemental {
            body.extend(supplemental_events(supp));
        }
        Ok(logic::barcode(msg.to_owned(), hr, body))
    }

    pub fn generate_barcode<H: ClassicLogicHandler + ?Sized>(&self, handler: &mut H, msg: &str) -> Result<()> {
        logic::emit(handler, self.events(msg)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{is_well_nested, ModuleGrid};

    fn generator(variant: UpcEanVariant) -> UpcEan {
        UpcEan::new(variant, UpcEanConfig::default()).unwrap()
    }

    fn modules(variant: UpcEanVariant, msg: &str) -> Vec<bool> {
        let mut grid = ModuleGrid::new();
        generator(variant).generate_barcode(&mut grid, msg).unwrap();
        grid.rows()[0].clone()
    }

    fn bits(s: &str) -> Vec<bool> {
        s.bytes().map(|b| b == b'1').collect()
    }

    #[test]
    fn test_upce_expand() {
        assert_eq!(expand_upce("0123450").unwrap(), "01200000345");
        assert_eq!(expand_upce("01234531").unwrap(), "012300000451");
        assert_eq!(expand_upce("0123454").unwrap(), "01234000005");
        assert_eq!(expand_upce("0123457").unwrap(), "01234500007");
        assert!(expand_upce("2123457").is_err());
        assert!(expand_upce("012345").is_err());
    }

    #[test]
    fn test_upce_compact() {
        assert_eq!(compact_to_upce("01200000345").as_deref(), Some("0123450"));
        assert_eq!(compact_to_upce("012300000451").as_deref(), Some("01234531"));
        assert_eq!(compact_to_upce("01234000005").as_deref(), Some("0123454"));
        assert_eq!(compact_to_upce("01234500007").as_deref(), Some("0123457"));
        assert_eq!(compact_to_upce("01234500001"), None);
        assert_eq!(compact_to_upce("21200000345"), None);
    }

    #[test]
    fn test_ean13_modules() {
        let m = modules(UpcEanVariant::Ean13, "4006381333931");
        assert_eq!(m.len(), 95);
        assert_eq!(m[..3], bits("101"));
        // first digit 4 selects L G L L G G; digit 0 in set A is 0001101
        assert_eq!(m[3..10], bits("0001101"));
        // second digit 0 in set B is 0100111
        assert_eq!(m[10..17], bits("0100111"));
        assert_eq!(m[45..50], bits("01010"));
        // check digit 1 in set C is 1100110
        assert_eq!(m[85..92], bits("1100110"));
        assert_eq!(m[92..], bits("101"));
    }

    #[test]
    fn test_upca_and_ean8() {
        let m = modules(UpcEanVariant::UpcA, "03600029145");
        assert_eq!(m.len(), 95);
        assert_eq!(m[3..10], bits("0001101"));
        assert_eq!(modules(UpcEanVariant::Ean8, "9638507").len(), 67);
    }

    #[test]
    fn test_upce() {
        let upce = generator(UpcEanVariant::UpcE);
        let events: Vec<Event> = upce.events("01234500007").unwrap().collect();
        assert!(is_well_nested(&events));
        // 01234500007 has check digit 2
        assert!(events.contains(&Event::StartBarGroup { group: BarGroup::UpcEanCheck, label: Some("2".into()) }));
        assert_eq!(modules(UpcEanVariant::UpcE, "0123457").len(), 51);
        assert!(upce.events("01234500001").is_err());
    }

    #[test]
    fn test_supplementals() {
        let ean = generator(UpcEanVariant::Ean13);
        let m = modules(UpcEanVariant::Ean13, "4006381333931+12");
        assert_eq!(m.len(), 95 + 9 + 20);
        assert_eq!(m[95 + 9..95 + 13], bits("1011"));
        let m = modules(UpcEanVariant::Ean13, "4006381333931+52495");
        assert_eq!(m.len(), 95 + 9 + 47);

        let dim = ean.calc_dimensions("4006381333931+52495").unwrap();
        assert!((dim.width() - (95.0 + 56.0) * 0.33).abs() < 1e-9);
        assert!(ean.events("4006381333931+123").is_err());
        assert!(ean.events("4006381333931+1a").is_err());
    }

    #[test]
    fn test_ean5_parity() {
        // 52495: 5*3 + 2*9 + 4*3 + 9*9 + 5*3 = 141, check value 1: G L G L L
        assert_eq!(ean5_check(&[5, 2, 4, 9, 5]), 1);
        let parities: Vec<Parity> = (0..5).map(|i| parity_of(EAN5_PARITY[1], i, 5)).collect();
        assert_eq!(parities, [Parity::Even, Parity::Odd, Parity::Even, Parity::Odd, Parity::Odd]);
    }
}
