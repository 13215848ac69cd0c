//! Code 39, optionally with the full ASCII extension.

use super::two_width;
use crate::{
    checksum,
    dimension::BarcodeDimension,
    logic::{self, BarGroup, ClassicLogicHandler, Event},
    params::{self, check_wide_factor, BarcodeParams, ChecksumMode, CommonParams},
    Error, Result,
};

/// The 43 data characters, in check value order.
pub const CHARS: &[u8; 43] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

/// Nine elements, bar first. A set bit is wide.
const PATTERNS: [u16; 43] = [
    0x034, 0x121, 0x061, 0x160, 0x031, 0x130, 0x070, 0x025, 0x124, 0x064,
    0x109, 0x049, 0x148, 0x019, 0x118, 0x058, 0x00D, 0x10C, 0x04C, 0x01C,
    0x103, 0x043, 0x142, 0x013, 0x112, 0x052, 0x007, 0x106, 0x046, 0x016,
    0x181, 0x0C1, 0x1C0, 0x091, 0x190, 0x0D0, 0x085, 0x184, 0x0C4, 0x0A8,
    0x0A2, 0x08A, 0x02A,
];
const START_STOP: u16 = 0x094;

/// Weight of the gap between two characters.
const GAP: u8 = 3;

fn value_of(c: char) -> Option<usize> {
    CHARS.iter().position(|&b| b as char == c)
}

/// Check character of a message made of base characters.
pub fn checksum_char(msg: &str) -> Result<char> {
    let values = msg.chars()
        .map(|c| value_of(c).ok_or_else(|| Error::message(format!("invalid Code 39 character '{c}'"))))
        .collect::<Result<Vec<_>>>()?;
    Ok(CHARS[checksum::mod43(values)] as char)
}

/// Whether the last character of `msg` is its check character.
pub fn validate_checksum(msg: &str) -> bool {
    let mut chars = msg.chars();
    match chars.next_back() {
        Some(check) => checksum_char(chars.as_str()).is_ok_and(|c| c == check),
        None => false,
    }
}

/// Maps full ASCII text to base characters.
pub fn to_extended(msg: &str) -> Result<String> {
    let mut out = String::with_capacity(msg.len() * 2);
    for c in msg.chars() {
        let code = u32::from(c);
        let shifted = |shift: char, base: char, offset: u32| -> [char; 2] {
            [shift, char::from_u32(u32::from(base) + offset).unwrap_or(base)]
        };
        let pair = match c {
            ' ' | '-' | '.' | '0'..='9' | 'A'..='Z' => {
                out.push(c);
                continue;
            }
            '\0' => ['%', 'U'],
            '\u{1}'..='\u{1a}' => shifted('$', 'A', code - 1),
            '\u{1b}'..='\u{1f}' => shifted('%', 'A', code - 27),
            '!'..=',' | '/' | ':' => shifted('/', 'A', code - 33),
            ';'..='?' => shifted('%', 'F', code - 59),
            '@' => ['%', 'V'],
            '['..='_' => shifted('%', 'K', code - 91),
            '`' => ['%', 'W'],
            'a'..='z' => shifted('+', 'A', code - 97),
            '{'..='\u{7f}' => shifted('%', 'P', code - 123),
            _ => return Err(Error::message(format!("'{c}' is not an ASCII character"))),
        };
        out.extend(pair);
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Code39Config {
    pub common: CommonParams,
    pub wide_factor: f64,
    /// Gap between characters in module widths.
    pub intercharacter_gap: f64,
    /// `AutoIgnoreIfAbsent` behaves like `Ignore`: a check character cannot
    /// be told apart from data.
    pub checksum: ChecksumMode,
    pub display_start_stop: bool,
    pub display_checksum: bool,
    /// Full ASCII: every ASCII character, lower case letters included.
    pub extended_charset: bool,
}

impl Default for Code39Config {
    fn default() -> Self {
        Self {
            common: CommonParams::with_module_width(0.19),
            wide_factor: 2.5,
            intercharacter_gap: 1.0,
            checksum: ChecksumMode::AutoIgnoreIfAbsent,
            display_start_stop: false,
            display_checksum: false,
            extended_charset: false,
        }
    }
}

impl BarcodeParams for Code39Config {
    fn common(&self) -> &CommonParams {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonParams {
        &mut self.common
    }

    fn bar_width(&self, weight: u8) -> f64 {
        let mw = self.common.module_width;
        match weight {
            GAP => self.intercharacter_gap * mw,
            w => super::two_width_bar(w, mw, self.wide_factor),
        }
    }

    fn validate(&self) -> Result<()> {
        self.common.validate()?;
        check_wide_factor(self.wide_factor)?;
        if !(self.intercharacter_gap > 0.0) {
            return Err(Error::config("Code 39 intercharacter gap must be positive"));
        }
        Ok(())
    }
}

impl Code39Config {
    pub fn with_wide_factor(mut self, wide_factor: f64) -> Result<Self> {
        self.wide_factor = wide_factor;
        self.validate()?;
        Ok(self)
    }

    pub fn with_intercharacter_gap(mut self, gap: f64) -> Result<Self> {
        self.intercharacter_gap = gap;
        self.validate()?;
        Ok(self)
    }

    pub fn with_checksum(mut self, checksum: ChecksumMode) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn with_extended_charset(mut self, extended: bool) -> Self {
        self.extended_charset = extended;
        self
    }
}

/// Code 39 generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Code39 {
    config: Code39Config,
}

impl Code39 {
    pub fn new(config: Code39Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Code39Config {
        &self.config
    }

    /// Base characters to encode (check character included) and the
    /// human-readable text.
    fn prepare(&self, msg: &str) -> Result<(String, String)> {
        let config = &self.config;
        let mut data = if config.extended_charset {
            to_extended(msg)?
        } else {
            if let Some(c) = msg.chars().find(|&c| value_of(c).is_none()) {
                let reason = if c == '*' { "'*' is reserved for start/stop" } else { "invalid Code 39 character" };
                return Err(Error::message(format!("{reason}: '{c}'")));
            }
            msg.to_owned()
        };
        if data.is_empty() {
            return Err(Error::message("Code 39 message is empty"));
        }

        let mut text = msg.to_owned();
        match config.checksum {
            ChecksumMode::Ignore | ChecksumMode::AutoIgnoreIfAbsent => (),
            ChecksumMode::Add => {
                let check = checksum_char(&data)?;
                data.push(check);
                if config.display_checksum {
                    text.push(check);
                }
            }
            ChecksumMode::Check => {
                if !validate_checksum(&data) {
                    return Err(Error::message(format!("wrong Code 39 check character in '{msg}'")));
                }
                if !config.display_checksum {
                    text.pop();
                }
            }
        }

        if config.display_start_stop {
            text = format!("*{text}*");
        }
        Ok((data, params::format_human_readable(&text, config.common.pattern.as_deref())))
    }

    pub fn calc_dimensions(&self, msg: &str) -> Result<BarcodeDimension> {
        let (data, _) = self.prepare(msg)?;
        let config = &self.config;
        let mw = config.common.module_width;
        let symbols = data.chars().count() + 2;
        let width = symbols as f64 * (6.0 + 3.0 * config.wide_factor) * mw
            + (symbols - 1) as f64 * config.intercharacter_gap * mw;
        Ok(params::linear_dimensions(config, width))
    }

    pub fn events(&self, msg: &str) -> Result<impl Iterator<Item = Event>> {
        let (data, hr) = self.prepare(msg)?;

        let mut body: Vec<Event> = logic::group(BarGroup::StartCharacter, Some("*".into()), logic::alternating(two_width(START_STOP, 9), true))
            .collect();
        for c in data.chars() {
            let pattern = value_of(c).map_or(START_STOP, |v| PATTERNS[v]);
            body.push(logic::bar(false, GAP));
            body.extend(logic::group(BarGroup::MessageCharacter, Some(c.to_string()), logic::alternating(two_width(pattern, 9), true)));
        }
        body.push(logic::bar(false, GAP));
        body.extend(logic::group(BarGroup::StopCharacter, Some("*".into()), logic::alternating(two_width(START_STOP, 9), true)));

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

    #[test]
    fn test_patterns_three_wide() {
        assert!(PATTERNS.iter().all(|p| p.count_ones() == 3));
        assert_eq!(START_STOP.count_ones(), 3);
        let mut sorted = PATTERNS.to_vec();
        sorted.push(START_STOP);
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 44);
    }

    #[test]
    fn test_checksum() {
        assert_eq!(checksum_char("CODE39").unwrap(), 'W');
        assert!(validate_checksum("CODE39W"));
        assert!(!validate_checksum("CODE39X"));
        assert!(!validate_checksum(""));
    }

    #[test]
    fn test_extended() {
        assert_eq!(to_extended("Code39").unwrap(), "C+O+D+E39");
        assert_eq!(to_extended("a*b%").unwrap(), "+A/J+B/E");
        assert_eq!(to_extended("\0\u{7f}").unwrap(), "%U%T");
        assert!(to_extended("é").is_err());
    }

    #[test]
    fn test_rejects_asterisk() {
        let code39 = Code39::new(Code39Config::default()).unwrap();
        assert!(matches!(code39.events("AB*C").map(|_| ()), Err(Error::InvalidMessage(_))));
        assert!(matches!(code39.events("abc").map(|_| ()), Err(Error::InvalidMessage(_))));
        let extended = Code39::new(Code39Config::default().with_extended_charset(true)).unwrap();
        assert!(extended.events("AB*c").is_ok());
    }

    #[test]
    fn test_checksum_modes() {
        let add = Code39::new(Code39Config::default().with_checksum(ChecksumMode::Add)).unwrap();
        let events: Vec<Event> = add.events("CODE39").unwrap().collect();
        assert!(events.contains(&Event::StartBarGroup { group: BarGroup::MessageCharacter, label: Some("W".into()) }));

        let check = Code39::new(Code39Config::default().with_checksum(ChecksumMode::Check)).unwrap();
        assert!(check.events("CODE39W").is_ok());
        assert!(matches!(check.events("CODE39X").map(|_| ()), Err(Error::InvalidMessage(_))));
    }

    #[test]
    fn test_events_and_dimensions() {
        let config = Code39Config::default();
        let (mw, wf) = (config.common.module_width, config.wide_factor);
        let code39 = Code39::new(config).unwrap();
        let events: Vec<Event> = code39.events("A").unwrap().collect();
        assert!(is_well_nested(&events));
        // start, gap, A, gap, stop
        let bars = events.iter().filter(|e| matches!(e, Event::Bar { .. })).count();
        assert_eq!(bars, 9 * 3 + 2);

        let dim = code39.calc_dimensions("A").unwrap();
        let expected = 3.0 * (6.0 + 3.0 * wf) * mw + 2.0 * mw;
        assert!((dim.width() - expected).abs() < 1e-9);
    }
}
