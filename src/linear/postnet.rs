//! POSTNET: five bars per digit, two of them full height, between two full
//! frame bars.

use super::postal::{PostalConfig, FULL, SHORT};
use crate::{
    dimension::BarcodeDimension,
    logic::{self, BarGroup, ClassicLogicHandler, Event},
    params::{self, BarcodeParams, ChecksumMode},
    Error, Result,
};

/// A set bit is a full bar, the first bar is the most significant bit.
const PATTERNS: [u8; 10] = [0b11000, 0b00011, 0b00101, 0b00110, 0b01001, 0b01010, 0b01100, 0b10001, 0b10010, 0b10100];

/// ZIP, ZIP+4 and delivery point lengths.
const LENGTHS: [usize; 3] = [5, 9, 11];

/// Check digit bringing the digit sum to a multiple of ten.
pub fn check_digit(digits: &str) -> char {
    let sum: u32 = digits.bytes().map(|b| (b - b'0') as u32).sum();
    (b'0' + ((10 - sum % 10) % 10) as u8) as char
}

/// Removes the `-` and space separators of a ZIP code.
pub fn strip_separators(msg: &str) -> String {
    msg.chars().filter(|&c| c != '-' && c != ' ').collect()
}

fn digit_bars(digit: u8) -> impl Iterator<Item = Event> {
    let pattern = PATTERNS[digit as usize];
    (0..5).rev().enumerate().flat_map(move |(i, bit)| {
        let weight = if pattern & (1 << bit) != 0 { FULL } else { SHORT };
        let space = (i > 0).then_some(logic::bar(false, 1));
        space.into_iter().chain(core::iter::once(logic::bar(true, weight)))
    })
}

/// POSTNET generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Postnet {
    config: PostalConfig,
}

impl Postnet {
    pub fn new(config: PostalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PostalConfig {
        &self.config
    }

    /// Digits to encode (check digit included) and the human-readable text.
    fn prepare(&self, msg: &str) -> Result<(String, String)> {
        let digits = strip_separators(msg);
        super::require_digits(&digits, "POSTNET")?;

        let has_check = match digits.len() {
            l if LENGTHS.contains(&l) => false,
            l if LENGTHS.contains(&(l - 1)) => true,
            l => return Err(Error::message(format!("POSTNET needs 5, 9 or 11 digits, got {l}"))),
        };

        let mut text = msg.to_owned();
        let data = match (self.config.checksum, has_check) {
            (ChecksumMode::Ignore, _) => digits,
            (ChecksumMode::Add | ChecksumMode::AutoIgnoreIfAbsent, false) => {
                let check = check_digit(&digits);
                if self.config.display_checksum {
                    text.push(check);
                }
                format!("{digits}{check}")
            }
            (ChecksumMode::Add, true) => {
                return Err(Error::message(format!("POSTNET message '{msg}' already has a check digit")))
            }
            (ChecksumMode::Check, false) => return Err(Error::message("POSTNET message has no check digit")),
            (ChecksumMode::Check | ChecksumMode::AutoIgnoreIfAbsent, true) => {
                let (body, check) = digits.split_at(digits.len() - 1);
                if check.starts_with(check_digit(body)) {
                    if !self.config.display_checksum {
                        text.pop();
                    }
                    digits
                } else {
                    return Err(Error::message(format!("wrong POSTNET check digit in '{msg}'")));
                }
            }
        };
        Ok((data, params::format_human_readable(&text, self.config.common.pattern.as_deref())))
    }

    pub fn calc_dimensions(&self, msg: &str) -> Result<BarcodeDimension> {
        let (data, _) = self.prepare(msg)?;
        let width = self.config.run_width(2 + 5 * data.len());
        Ok(params::linear_dimensions(&self.config, width))
    }

    pub fn events(&self, msg: &str) -> Result<impl Iterator<Item = Event>> {
        let (data, hr) = self.prepare(msg)?;

        let mut body: Vec<Event> = logic::group(BarGroup::StartCharacter, None, [logic::bar(true, FULL)]).collect();
        for c in data.chars() {
            body.push(logic::bar(false, 1));
            body.extend(logic::group(BarGroup::MessageCharacter, Some(c.to_string()), digit_bars(c as u8 - b'0')));
        }
        body.push(logic::bar(false, 1));
        body.extend(logic::group(BarGroup::StopCharacter, None, [logic::bar(true, FULL)]));
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
    use crate::logic::is_well_nested;

    fn bar_weights(events: &[Event]) -> Vec<u8> {
        events.iter()
            .filter_map(|e| match e {
                Event::Bar { black: true, width } => Some(*width),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_patterns() {
        assert!(PATTERNS.iter().all(|p| p.count_ones() == 2));
    }

    #[test]
    fn test_check_digit() {
        assert_eq!(check_digit("555551237"), '2');
        assert_eq!(check_digit("12345"), '5');
        assert_eq!(strip_separators("55555-1237"), "555551237");
    }

    #[test]
    fn test_events() {
        let postnet = Postnet::new(PostalConfig::postnet()).unwrap();
        let events: Vec<Event> = postnet.events("12345").unwrap().collect();
        assert!(is_well_nested(&events));
        let weights = bar_weights(&events);
        // frame, six digits, frame
        assert_eq!(weights.len(), 2 + 5 * 6);
        assert_eq!(weights[0], FULL);
        assert_eq!(weights[1..6], [SHORT, SHORT, SHORT, FULL, FULL]);
        assert_eq!(weights[weights.len() - 1], FULL);
        // bars and spaces alternate
        let blacks: Vec<bool> = events.iter()
            .filter_map(|e| match e {
                Event::Bar { black, .. } => Some(*black),
                _ => None,
            })
            .collect();
        assert!(blacks.iter().enumerate().all(|(i, &b)| b == (i % 2 == 0)));
    }

    #[test]
    fn test_lengths_and_checksum() {
        let postnet = Postnet::new(PostalConfig::postnet()).unwrap();
        assert!(postnet.events("55555-1237").is_ok());
        assert!(postnet.events("55555-12372").is_ok());
        assert!(postnet.events("55555-12373").is_err());
        assert!(postnet.events("1234").is_err());
        assert!(postnet.events("1234a").is_err());

        let check = Postnet::new(PostalConfig::postnet().with_checksum(ChecksumMode::Check)).unwrap();
        assert!(check.events("12345").is_err());
        assert!(check.events("123455").is_ok());
    }

    #[test]
    fn test_dimensions() {
        let config = PostalConfig::postnet();
        let postnet = Postnet::new(config.clone()).unwrap();
        let dim = postnet.calc_dimensions("12345").unwrap();
        let bars = 32.0;
        let expected = bars * config.common.module_width + (bars - 1.0) * config.intercharacter_gap;
        assert!((dim.width() - expected).abs() < 1e-9);
    }
}
