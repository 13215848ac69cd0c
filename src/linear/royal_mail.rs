//! Royal Mail 4-State Customer Code (RM4SCC).
//!
//! Each character sits on a 6x6 matrix: its row selects which of its four
//! bars have an ascender, its column which have a descender.

use super::postal::{PostalConfig, ASCENDER, FULL};
use crate::{
    dimension::BarcodeDimension,
    logic::{self, BarGroup, ClassicLogicHandler, Event},
    params::{self, BarcodeParams, ChecksumMode},
    Error, Result,
};

const MATRIX: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Four bars, first bar in the most significant bit. Used for ascenders by
/// row and for descenders by column.
const HALVES: [u8; 6] = [0b0011, 0b0101, 0b0110, 0b1001, 0b1010, 0b1100];

/// Row and column of a character.
fn position(c: char) -> Option<(usize, usize)> {
    MATRIX.iter().position(|&b| b as char == c).map(|i| (i / 6, i % 6))
}

/// Check character: the sums of the (1-based) rows and columns modulo 6,
/// where a remainder of 0 stands for the sixth row or column.
pub fn check_char(msg: &str) -> Result<char> {
    let (mut rows, mut cols) = (0, 0);
    for c in msg.chars() {
        let (row, col) = position(c).ok_or_else(|| Error::message(format!("invalid Royal Mail CBC character '{c}'")))?;
        rows += row + 1;
        cols += col + 1;
    }
    let row = (rows % 6 + 5) % 6;
    let col = (cols % 6 + 5) % 6;
    Ok(MATRIX[row * 6 + col] as char)
}

fn char_bars(c: char) -> Vec<Event> {
    let (row, col) = position(c).unwrap_or((0, 0));
    let (top, bottom) = (HALVES[row], HALVES[col]);
    let mut bars = Vec::with_capacity(7);
    for bit in (0..4).rev() {
        if bit < 3 {
            bars.push(logic::bar(false, 1));
        }
        // tracker 1, plus 1 for an ascender and 2 for a descender
        let weight = 1 + (top >> bit & 1) + 2 * (bottom >> bit & 1);
        bars.push(logic::bar(true, weight));
    }
    bars
}

/// Royal Mail CBC generator.
#[derive(Debug, Clone, PartialEq)]
pub struct RoyalMailCbc {
    config: PostalConfig,
}

impl RoyalMailCbc {
    pub fn new(config: PostalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PostalConfig {
        &self.config
    }

    /// Characters to encode, check character included, and the
    /// human-readable text. `AutoIgnoreIfAbsent` adds the check character.
    fn prepare(&self, msg: &str) -> Result<(String, String)> {
        let data: String = msg.chars().map(|c| c.to_ascii_uppercase()).collect();
        if data.is_empty() {
            return Err(Error::message("Royal Mail CBC message is empty"));
        }
        if let Some(c) = data.chars().find(|&c| position(c).is_none()) {
            return Err(Error::message(format!("invalid Royal Mail CBC character '{c}'")));
        }
        let mut text = data.clone();

        let data = match self.config.checksum {
            ChecksumMode::Ignore => data,
            ChecksumMode::Add | ChecksumMode::AutoIgnoreIfAbsent => {
                let check = check_char(&data)?;
                if self.config.display_checksum {
                    text.push(check);
                }
                format!("{data}{check}")
            }
            ChecksumMode::Check => {
                let (body, check) = data.split_at(data.len() - 1);
                if !check.starts_with(check_char(body)?) {
                    return Err(Error::message(format!("wrong Royal Mail CBC check character in '{msg}'")));
                }
                if !self.config.display_checksum {
                    text.pop();
                }
                data
            }
        };
        Ok((data, params::format_human_readable(&text, self.config.common.pattern.as_deref())))
    }

    pub fn calc_dimensions(&self, msg: &str) -> Result<BarcodeDimension> {
        let (data, _) = self.prepare(msg)?;
        let width = self.config.run_width(2 + 4 * data.len());
        Ok(params::linear_dimensions(&self.config, width))
    }

    pub fn events(&self, msg: &str) -> Result<impl Iterator<Item = Event>> {
        let (data, hr) = self.prepare(msg)?;

        let mut body: Vec<Event> = logic::group(BarGroup::StartCharacter, None, [logic::bar(true, ASCENDER)]).collect();
        for c in data.chars() {
            body.push(logic::bar(false, 1));
            body.extend(logic::group(BarGroup::MessageCharacter, Some(c.to_string()), char_bars(c)));
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

    fn weights(events: &[Event]) -> Vec<u8> {
        events.iter()
            .filter_map(|e| match e {
                Event::Bar { black: true, width } => Some(*width),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_check_char() {
        assert_eq!(check_char("SN34RD1A").unwrap(), 'K');
        assert!(check_char("SN34-RD1A").is_err());
    }

    #[test]
    fn test_char_bars() {
        // 0 is on row 1, column 1: two trackers then two full bars
        assert_eq!(weights(&char_bars('0')), [1, 1, 4, 4]);
        // Z is on row 6, column 6: two full bars then two trackers
        assert_eq!(weights(&char_bars('Z')), [4, 4, 1, 1]);
        // 5 is on row 1, column 6: descenders first, ascenders last
        assert_eq!(weights(&char_bars('5')), [3, 3, 2, 2]);
    }

    #[test]
    fn test_events() {
        let rm = RoyalMailCbc::new(PostalConfig::royal_mail()).unwrap();
        let events: Vec<Event> = rm.events("sn34rd1a").unwrap().collect();
        assert!(is_well_nested(&events));
        let w = weights(&events);
        assert_eq!(w.len(), 2 + 4 * 9);
        assert_eq!(w[0], ASCENDER);
        assert_eq!(w[w.len() - 1], FULL);
        assert!(events.contains(&Event::StartBarGroup { group: BarGroup::MessageCharacter, label: Some("K".into()) }));
    }

    #[test]
    fn test_check_mode() {
        let rm = RoyalMailCbc::new(PostalConfig::royal_mail().with_checksum(ChecksumMode::Check)).unwrap();
        assert!(rm.events("SN34RD1AK").is_ok());
        assert!(rm.events("SN34RD1AJ").is_err());
    }

    #[test]
    fn test_dimensions() {
        let config = PostalConfig::royal_mail();
        let rm = RoyalMailCbc::new(config.clone()).unwrap();
        let dim = rm.calc_dimensions("SN34RD1A").unwrap();
        assert!((dim.width() - config.run_width(38)).abs() < 1e-9);
    }
}
