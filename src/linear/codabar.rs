//! Codabar: digits, `-$:/.+` and the start/stop characters `A B C D`.

use super::{two_width, two_width_bar, wide_count};
use crate::{
    dimension::BarcodeDimension,
    logic::{self, BarGroup, ClassicLogicHandler, Event},
    params::{self, check_wide_factor, BarcodeParams, ChecksumMode, CommonParams},
    Error, Result,
};

const CHARS: &[u8; 20] = b"0123456789-$:/.+ABCD";

/// Seven elements, bar first. A set bit is wide.
const PATTERNS: [u16; 20] = [
    0x003, 0x006, 0x009, 0x060, 0x012, 0x042, 0x021, 0x024, 0x030, 0x048,
    0x00C, 0x018, 0x045, 0x051, 0x054, 0x015, 0x01A, 0x029, 0x00B, 0x00E,
];

/// Resolves the alternative start/stop names `T N * E` and lower case.
fn start_stop(c: char) -> Option<char> {
    match c.to_ascii_uppercase() {
        c @ 'A'..='D' => Some(c),
        'T' => Some('A'),
        'N' => Some('B'),
        '*' => Some('C'),
        'E' => Some('D'),
        _ => None,
    }
}

fn index_of(c: char) -> Option<usize> {
    CHARS.iter().position(|&b| b as char == c)
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CodabarConfig {
    pub common: CommonParams,
    pub wide_factor: f64,
    /// Codabar has no check character, only `Ignore` and
    /// `AutoIgnoreIfAbsent` are supported.
    pub checksum: ChecksumMode,
    /// Shows the start and stop characters in the human-readable text.
    pub display_start_stop: bool,
}

impl Default for CodabarConfig {
    fn default() -> Self {
        Self {
            common: CommonParams::with_module_width(0.19),
            wide_factor: 3.0,
            checksum: ChecksumMode::AutoIgnoreIfAbsent,
            display_start_stop: false,
        }
    }
}

impl BarcodeParams for CodabarConfig {
    fn common(&self) -> &CommonParams {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonParams {
        &mut self.common
    }

    fn bar_width(&self, weight: u8) -> f64 {
        two_width_bar(weight, self.common.module_width, self.wide_factor)
    }

    fn validate(&self) -> Result<()> {
        self.common.validate()?;
        check_wide_factor(self.wide_factor)
    }
}

impl CodabarConfig {
    pub fn with_wide_factor(mut self, wide_factor: f64) -> Result<Self> {
        self.wide_factor = wide_factor;
        self.validate()?;
        Ok(self)
    }

    pub fn with_checksum(mut self, checksum: ChecksumMode) -> Self {
        self.checksum = checksum;
        self
    }
}

/// A validated Codabar message with its start and stop characters.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Message {
    start: char,
    body: String,
    stop: char,
}

impl Message {
    /// Messages carrying no start/stop characters get `A` on both ends.
    fn parse(msg: &str) -> Result<Self> {
        let chars: Vec<char> = msg.chars().collect();
        if chars.is_empty() {
            return Err(Error::message("Codabar message is empty"));
        }
        let first = chars.first().copied().and_then(start_stop);
        let last = if chars.len() > 1 { chars.last().copied().and_then(start_stop) } else { None };

        let (start, body, stop) = match (first, last) {
            (Some(start), Some(stop)) => (start, &chars[1..chars.len() - 1], stop),
            (None, None) => ('A', &chars[..], 'A'),
            _ => return Err(Error::message("Codabar needs both a start and a stop character, or neither")),
        };

        if let Some(c) = body.iter().find(|&&c| index_of(c).map_or(true, |i| i >= 16)) {
            return Err(Error::message(format!("invalid Codabar character '{c}'")));
        }
        Ok(Self { start, body: body.iter().collect(), stop })
    }

    fn chars(&self) -> impl Iterator<Item = char> + '_ {
        core::iter::once(self.start).chain(self.body.chars()).chain(core::iter::once(self.stop))
    }
}

/// Codabar generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Codabar {
    config: CodabarConfig,
}

impl Codabar {
    pub fn new(config: CodabarConfig) -> Result<Self> {
        config.validate()?;
        if matches!(config.checksum, ChecksumMode::Add | ChecksumMode::Check) {
            return Err(Error::UnsupportedOperation("Codabar has no check character".into()));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodabarConfig {
        &self.config
    }

    pub fn calc_dimensions(&self, msg: &str) -> Result<BarcodeDimension> {
        let msg = Message::parse(msg)?;
        let mw = self.config.common.module_width;
        let mut width = 0.0;
        let mut count = 0;
        for c in msg.chars() {
            let pattern = index_of(c).map_or(0, |i| PATTERNS[i]);
            let wide = wide_count(pattern) as f64;
            width += (7.0 - wide) * mw + wide * self.config.wide_factor * mw;
            count += 1;
        }
        width += (count - 1) as f64 * mw;
        Ok(params::linear_dimensions(&self.config, width))
    }

    pub fn events(&self, msg: &str) -> Result<impl Iterator<Item = Event>> {
        let parsed = Message::parse(msg)?;
        let text = if self.config.display_start_stop { parsed.chars().collect() } else { parsed.body.clone() };
        let hr = params::format_human_readable(&text, self.config.common.pattern.as_deref());

        let last = parsed.body.chars().count() + 1;
        let mut body = Vec::new();
        for (i, c) in parsed.chars().enumerate() {
            let pattern = index_of(c).map_or(0, |i| PATTERNS[i]);
            let group = match i {
                0 => BarGroup::StartCharacter,
                i if i == last => BarGroup::StopCharacter,
                _ => BarGroup::MessageCharacter,
            };
            body.extend(logic::group(group, Some(c.to_string()), logic::alternating(two_width(pattern, 7), true)));
            if i != last {
                body.push(logic::bar(false, 1));
            }
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
    use crate::logic::is_well_nested;

    fn codabar() -> Codabar {
        Codabar::new(CodabarConfig::default()).unwrap()
    }

    #[test]
    fn test_patterns_two_wide_or_three_wide() {
        for (i, &p) in PATTERNS.iter().enumerate() {
            assert!(matches!(wide_count(p), 2 | 3), "{}", CHARS[i] as char);
        }
    }

    #[test]
    fn test_start_stop() {
        assert_eq!(Message::parse("a123b").unwrap(), Message { start: 'A', body: "123".into(), stop: 'B' });
        assert_eq!(Message::parse("T1N").unwrap(), Message { start: 'A', body: "1".into(), stop: 'B' });
        assert_eq!(Message::parse("123").unwrap(), Message { start: 'A', body: "123".into(), stop: 'A' });
        assert!(Message::parse("A123").is_err());
        assert!(Message::parse("1A23").is_err());
        assert!(Message::parse("12%3").is_err());
    }

    #[test]
    fn test_events() {
        let events: Vec<Event> = codabar().events("A1B").unwrap().collect();
        assert!(is_well_nested(&events));
        assert_eq!(events[1], Event::StartBarGroup { group: BarGroup::StartCharacter, label: Some("A".into()) });
        // A: n n w w n w n
        let bars: Vec<Event> = events[2..9].to_vec();
        assert_eq!(bars, logic::alternating([1, 1, 2, 2, 1, 2, 1], true).collect::<Vec<_>>());
        assert_eq!(events[10], logic::bar(false, 1));
        assert_eq!(events[0], Event::StartBarcode { message: "A1B".into(), human_readable: "1".into() });
    }

    #[test]
    fn test_dimensions() {
        let config = CodabarConfig::default();
        let mw = config.common.module_width;
        let dim = Codabar::new(config).unwrap().calc_dimensions("A1B").unwrap();
        // A and B have three wide elements, 1 has two; two gaps
        let expected = (4.0 + 9.0) * mw + (5.0 + 6.0) * mw + (4.0 + 9.0) * mw + 2.0 * mw;
        assert!((dim.width() - expected).abs() < 1e-9);
        assert!(dim.width_plus_quiet() >= dim.width());
    }

    #[test]
    fn test_checksum_unsupported() {
        let err = Codabar::new(CodabarConfig::default().with_checksum(ChecksumMode::Add)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation(_)));
        let err = Codabar::new(CodabarConfig::default().with_checksum(ChecksumMode::Check)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation(_)));
    }

    #[test]
    fn test_wide_factor() {
        assert!(CodabarConfig::default().with_wide_factor(1.0).is_err());
        let config = CodabarConfig::default().with_wide_factor(2.0).unwrap();
        assert!((config.bar_width(2) - 0.38).abs() < 1e-9);
    }
}
