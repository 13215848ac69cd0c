//! Interleaved 2 of 5 and its fixed-length variant ITF-14.
//!
//! Digits are encoded in pairs: the first digit of a pair in the bars, the
//! second one in the spaces between them.

use super::{fixed_length_checksum, two_width, two_width_bar};
use crate::{
    checksum,
    dimension::BarcodeDimension,
    logic::{self, BarGroup, ClassicLogicHandler, Event},
    params::{self, check_wide_factor, BarcodeParams, ChecksumMode, CommonParams},
    Error, Result,
};

/// Five elements per digit. A set bit is wide.
const PATTERNS: [u16; 10] = [0x06, 0x11, 0x09, 0x18, 0x05, 0x14, 0x0C, 0x03, 0x12, 0x0A];
const START: [u8; 4] = [1, 1, 1, 1];
const STOP: [u8; 3] = [2, 1, 1];

/// Width in narrow modules of a run of `digits` digits between start and
/// stop.
fn symbol_width(digits: usize, module_width: f64, wide_factor: f64) -> f64 {
    let digit = 3.0 + 2.0 * wide_factor;
    (4.0 + digits as f64 * digit + 2.0 + wide_factor) * module_width
}

fn symbol_events(digits: &str) -> Vec<Event> {
    let mut body: Vec<Event> = logic::group(BarGroup::StartCharacter, None, logic::alternating(START, true)).collect();
    let bytes = digits.as_bytes();
    for pair in bytes.chunks_exact(2) {
        let bars = two_width(PATTERNS[(pair[0] - b'0') as usize], 5);
        let spaces = two_width(PATTERNS[(pair[1] - b'0') as usize], 5);
        let widths = bars.zip(spaces).flat_map(|(b, s)| [b, s]);
        let label = String::from_utf8_lossy(pair).into_owned();
        body.extend(logic::group(BarGroup::MessageCharacter, Some(label), logic::alternating(widths, true)));
    }
    body.extend(logic::group(BarGroup::StopCharacter, None, logic::alternating(STOP, true)));
    body
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Interleaved2Of5Config {
    pub common: CommonParams,
    pub wide_factor: f64,
    /// `AutoIgnoreIfAbsent` behaves like `Ignore`.
    pub checksum: ChecksumMode,
    pub display_checksum: bool,
}

impl Default for Interleaved2Of5Config {
    fn default() -> Self {
        Self {
            common: CommonParams::with_module_width(0.21),
            wide_factor: 3.0,
            checksum: ChecksumMode::AutoIgnoreIfAbsent,
            display_checksum: false,
        }
    }
}

impl BarcodeParams for Interleaved2Of5Config {
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

impl Interleaved2Of5Config {
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

/// Interleaved 2 of 5 generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Interleaved2Of5 {
    config: Interleaved2Of5Config,
}

impl Interleaved2Of5 {
    pub fn new(config: Interleaved2Of5Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Interleaved2Of5Config {
        &self.config
    }

    /// Digits to encode and the human-readable text.
    fn prepare(&self, msg: &str) -> Result<(String, String)> {
        super::require_digits(msg, "Interleaved 2 of 5")?;
        let config = &self.config;
        let mut data = msg.to_owned();
        let mut text = msg.to_owned();
        match config.checksum {
            ChecksumMode::Ignore | ChecksumMode::AutoIgnoreIfAbsent => (),
            ChecksumMode::Add => {
                let check = checksum::mod10_char(msg);
                data.push(check);
                if config.display_checksum {
                    text.push(check);
                }
            }
            ChecksumMode::Check => {
                if !checksum::validate_mod10(msg) {
                    return Err(Error::message(format!("wrong Interleaved 2 of 5 check digit in '{msg}'")));
                }
                if !config.display_checksum {
                    text.pop();
                }
            }
        }

        if data.len() % 2 != 0 {
            return Err(Error::message(format!(
                "Interleaved 2 of 5 needs an even number of digits, got {}",
                data.len()
            )));
        }
        Ok((data, params::format_human_readable(&text, config.common.pattern.as_deref())))
    }

    pub fn calc_dimensions(&self, msg: &str) -> Result<BarcodeDimension> {
        let (data, _) = self.prepare(msg)?;
        let width = symbol_width(data.len(), self.config.common.module_width, self.config.wide_factor);
        Ok(params::linear_dimensions(&self.config, width))
    }

    pub fn events(&self, msg: &str) -> Result<impl Iterator<Item = Event>> {
        let (data, hr) = self.prepare(msg)?;
        Ok(logic::barcode(msg.to_owned(), hr, symbol_events(&data)))
    }

    pub fn generate_barcode<H: ClassicLogicHandler + ?Sized>(&self, handler: &mut H, msg: &str) -> Result<()> {
        logic::emit(handler, self.events(msg)?);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Itf14Config {
    pub common: CommonParams,
    pub wide_factor: f64,
    pub checksum: ChecksumMode,
    /// Thickness of the bearer bars.
    pub bearer_bar_width: f64,
    /// Draws the bearer bars as a box around the symbol instead of bars
    /// above and below it.
    pub bearer_box: bool,
}

impl Default for Itf14Config {
    fn default() -> Self {
        let mut common = CommonParams::with_module_width(1.016);
        common.bar_height = 32.0;
        Self {
            common,
            wide_factor: 2.5,
            checksum: ChecksumMode::AutoIgnoreIfAbsent,
            bearer_bar_width: 4.8,
            bearer_box: true,
        }
    }
}

impl BarcodeParams for Itf14Config {
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
        check_wide_factor(self.wide_factor)?;
        if self.bearer_bar_width < 0.0 {
            return Err(Error::config("ITF-14 bearer bar width must not be negative"));
        }
        Ok(())
    }
}

impl Itf14Config {
    pub fn with_bearer(mut self, width: f64, as_box: bool) -> Result<Self> {
        (self.bearer_bar_width, self.bearer_box) = (width, as_box);
        self.validate()?;
        Ok(self)
    }

    pub fn with_checksum(mut self, checksum: ChecksumMode) -> Self {
        self.checksum = checksum;
        self
    }
}

/// ITF-14: 13 digits and a mod-10 check digit framed by bearer bars.
#[derive(Debug, Clone, PartialEq)]
pub struct Itf14 {
    config: Itf14Config,
}

impl Itf14 {
    pub fn new(config: Itf14Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Itf14Config {
        &self.config
    }

    fn prepare(&self, msg: &str) -> Result<String> {
        super::require_digits(msg, "ITF-14")?;
        fixed_length_checksum(msg, 14, self.config.checksum, "ITF-14")
    }

    /// Bearer bars are included: on all four sides for a box, above and
    /// below otherwise.
    pub fn calc_dimensions(&self, msg: &str) -> Result<BarcodeDimension> {
        let data = self.prepare(msg)?;
        let config = &self.config;
        let common = &config.common;
        let bearer = config.bearer_bar_width;
        let mut width = symbol_width(data.len(), common.module_width, config.wide_factor);
        if config.bearer_box {
            width += 2.0 * (bearer + common.quiet_zone_h());
        }
        let height = common.bar_height + 2.0 * bearer + common.human_readable_height();
        let qz_h = if config.bearer_box { 0.0 } else { common.quiet_zone_h() };
        Ok(BarcodeDimension::new(width, height, qz_h, common.quiet_zone_v()))
    }

    pub fn events(&self, msg: &str) -> Result<impl Iterator<Item = Event>> {
        let data = self.prepare(msg)?;
        let hr = params::format_human_readable(&data, self.config.common.pattern.as_deref());
        Ok(logic::barcode(msg.to_owned(), hr, symbol_events(&data)))
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

    fn widths(events: &[Event]) -> Vec<u8> {
        events.iter()
            .filter_map(|e| match e {
                Event::Bar { width, .. } => Some(*width),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_patterns_two_wide() {
        assert!(PATTERNS.iter().all(|p| p.count_ones() == 2));
    }

    #[test]
    fn test_pair_interleaving() {
        let itf = Interleaved2Of5::new(Interleaved2Of5Config::default()).unwrap();
        let events: Vec<Event> = itf.events("12").unwrap().collect();
        assert!(is_well_nested(&events));
        // start, then 1 (W N N N W) in bars and 2 (N W N N W) in spaces, then stop
        assert_eq!(widths(&events), [1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 1, 1, 2, 2, 2, 1, 1]);
        assert!(events.contains(&Event::StartBarGroup { group: BarGroup::MessageCharacter, label: Some("12".into()) }));
    }

    #[test]
    fn test_odd_length() {
        let itf = Interleaved2Of5::new(Interleaved2Of5Config::default()).unwrap();
        assert!(matches!(itf.events("123").map(|_| ()), Err(Error::InvalidMessage(_))));
        let add = Interleaved2Of5::new(Interleaved2Of5Config::default().with_checksum(ChecksumMode::Add)).unwrap();
        assert!(add.events("123").is_ok());
        assert!(add.events("1234").is_err());
    }

    #[test]
    fn test_check_mode() {
        let check = Interleaved2Of5::new(Interleaved2Of5Config::default().with_checksum(ChecksumMode::Check)).unwrap();
        assert!(check.events("12345670").is_ok());
        assert!(check.events("12345671").is_err());
        let events: Vec<Event> = check.events("12345670").unwrap().collect();
        assert_eq!(events[0], Event::StartBarcode { message: "12345670".into(), human_readable: "1234567".into() });
    }

    #[test]
    fn test_dimensions() {
        let config = Interleaved2Of5Config::default();
        let mw = config.common.module_width;
        let itf = Interleaved2Of5::new(config).unwrap();
        let dim = itf.calc_dimensions("12").unwrap();
        assert!((dim.width() - (4.0 + 2.0 * 9.0 + 5.0) * mw).abs() < 1e-9);
    }

    #[test]
    fn test_itf14() {
        let itf14 = Itf14::new(Itf14Config::default()).unwrap();
        let events: Vec<Event> = itf14.events("1540014128876").unwrap().collect();
        assert_eq!(events[0], Event::StartBarcode {
            message: "1540014128876".into(),
            human_readable: "15400141288763".into(),
        });
        assert!(itf14.events("15400141288763").is_ok());
        assert!(itf14.events("15400141288760").is_err());
        assert!(itf14.events("154001412887").is_err());

        let config = Itf14Config::default();
        let dim = itf14.calc_dimensions("1540014128876").unwrap();
        let bars = symbol_width(14, config.common.module_width, config.wide_factor);
        let expected = bars + 2.0 * (config.bearer_bar_width + config.common.quiet_zone_h());
        assert!((dim.width() - expected).abs() < 1e-9);
        assert!(dim.height() > config.common.bar_height + 2.0 * config.bearer_bar_width);

        let bars_only = Itf14::new(Itf14Config::default().with_bearer(4.8, false).unwrap()).unwrap();
        assert!((bars_only.calc_dimensions("1540014128876").unwrap().width() - bars).abs() < 1e-9);
    }
}
