//! # Code 128
//!
//! Full Latin-1 linear symbology with three code sets. Function characters
//! are written in messages as U+00F1 (FNC1) to U+00F4 (FNC4). GS1-128 is
//! built on top of it in [gs1].
//!
//! ```
//! # use symbology::code128::{Code128, Code128Config};
//! let code128 = Code128::new(Code128Config::default()).unwrap();
//! assert_eq!(code128.encode("123").unwrap(), [104, 17, 18, 19, 8, 106]);
//! ```

pub mod ai;
pub mod encoder;
pub mod gs1;

use log::debug;

use crate::{
    checksum,
    dimension::BarcodeDimension,
    logic::{self, BarGroup, ClassicLogicHandler, Event},
    params::{self, BarcodeParams, CommonParams},
    Result,
};
pub use encoder::{CodeSet, FNC1, FNC2, FNC3, FNC4};
use encoder::{START_A, START_B, START_C, STOP};
pub use gs1::{Gs1Config, Gs1128};

/// Bar and space widths of the symbol values 0 to 105, bar first.
#[rustfmt::skip]
const PATTERNS: [[u8; 6]; 106] = [
    [2, 1, 2, 2, 2, 2], [2, 2, 2, 1, 2, 2], [2, 2, 2, 2, 2, 1], [1, 2, 1, 2, 2, 3], [1, 2, 1, 3, 2, 2],
    [1, 3, 1, 2, 2, 2], [1, 2, 2, 2, 1, 3], [1, 2, 2, 3, 1, 2], [1, 3, 2, 2, 1, 2], [2, 2, 1, 2, 1, 3],
    [2, 2, 1, 3, 1, 2], [2, 3, 1, 2, 1, 2], [1, 1, 2, 2, 3, 2], [1, 2, 2, 1, 3, 2], [1, 2, 2, 2, 3, 1],
    [1, 1, 3, 2, 2, 2], [1, 2, 3, 1, 2, 2], [1, 2, 3, 2, 2, 1], [2, 2, 3, 2, 1, 1], [2, 2, 1, 1, 3, 2],
    [2, 2, 1, 2, 3, 1], [2, 1, 3, 2, 1, 2], [2, 2, 3, 1, 1, 2], [3, 1, 2, 1, 3, 1], [3, 1, 1, 2, 2, 2],
    [3, 2, 1, 1, 2, 2], [3, 2, 1, 2, 2, 1], [3, 1, 2, 2, 1, 2], [3, 2, 2, 1, 1, 2], [3, 2, 2, 2, 1, 1],
    [2, 1, 2, 1, 2, 3], [2, 1, 2, 3, 2, 1], [2, 3, 2, 1, 2, 1], [1, 1, 1, 3, 2, 3], [1, 3, 1, 1, 2, 3],
    [1, 3, 1, 3, 2, 1], [1, 1, 2, 3, 1, 3], [1, 3, 2, 1, 1, 3], [1, 3, 2, 3, 1, 1], [2, 1, 1, 3, 1, 3],
    [2, 3, 1, 1, 1, 3], [2, 3, 1, 3, 1, 1], [1, 1, 2, 1, 3, 3], [1, 1, 2, 3, 3, 1], [1, 3, 2, 1, 3, 1],
    [1, 1, 3, 1, 2, 3], [1, 1, 3, 3, 2, 1], [1, 3, 3, 1, 2, 1], [3, 1, 3, 1, 2, 1], [2, 1, 1, 3, 3, 1],
    [2, 3, 1, 1, 3, 1], [2, 1, 3, 1, 1, 3], [2, 1, 3, 3, 1, 1], [2, 1, 3, 1, 3, 1], [3, 1, 1, 1, 2, 3],
    [3, 1, 1, 3, 2, 1], [3, 3, 1, 1, 2, 1], [3, 1, 2, 1, 1, 3], [3, 1, 2, 3, 1, 1], [3, 3, 2, 1, 1, 1],
    [3, 1, 4, 1, 1, 1], [2, 2, 1, 4, 1, 1], [4, 3, 1, 1, 1, 1], [1, 1, 1, 2, 2, 4], [1, 1, 1, 4, 2, 2],
    [1, 2, 1, 1, 2, 4], [1, 2, 1, 4, 2, 1], [1, 4, 1, 1, 2, 2], [1, 4, 1, 2, 2, 1], [1, 1, 2, 2, 1, 4],
    [1, 1, 2, 4, 1, 2], [1, 2, 2, 1, 1, 4], [1, 2, 2, 4, 1, 1], [1, 4, 2, 1, 1, 2], [1, 4, 2, 2, 1, 1],
    [2, 4, 1, 2, 1, 1], [2, 2, 1, 1, 1, 4], [4, 1, 3, 1, 1, 1], [2, 4, 1, 1, 1, 2], [1, 3, 4, 1, 1, 1],
    [1, 1, 1, 2, 4, 2], [1, 2, 1, 1, 4, 2], [1, 2, 1, 2, 4, 1], [1, 1, 4, 2, 1, 2], [1, 2, 4, 1, 1, 2],
    [1, 2, 4, 2, 1, 1], [4, 1, 1, 2, 1, 2], [4, 2, 1, 1, 1, 2], [4, 2, 1, 2, 1, 1], [2, 1, 2, 1, 4, 1],
    [2, 1, 4, 1, 2, 1], [4, 1, 2, 1, 2, 1], [1, 1, 1, 1, 4, 3], [1, 1, 1, 3, 4, 1], [1, 3, 1, 1, 4, 1],
    [1, 1, 4, 1, 1, 3], [1, 1, 4, 3, 1, 1], [4, 1, 1, 1, 1, 3], [4, 1, 1, 3, 1, 1], [1, 1, 3, 1, 4, 1],
    [1, 1, 4, 1, 3, 1], [3, 1, 1, 1, 4, 1], [4, 1, 1, 1, 3, 1], [2, 1, 1, 4, 1, 2], [2, 1, 1, 2, 1, 4],
    [2, 1, 1, 2, 3, 2],
];
const STOP_PATTERN: [u8; 7] = [2, 3, 3, 1, 1, 1, 2];

/// Modules per symbol value and for the stop pattern.
const SYMBOL_MODULES: usize = 11;
const STOP_MODULES: usize = 13;

/// Widths of a symbol value, the stop pattern included.
pub fn pattern(value: u8) -> &'static [u8] {
    match PATTERNS.get(value as usize) {
        Some(widths) => widths,
        None => &STOP_PATTERN,
    }
}

/// Appends the mod-103 check value and the stop code to symbol values
/// starting with a start code.
pub(crate) fn finish(mut values: Vec<u8>) -> Vec<u8> {
    let check = checksum::mod103(values[0], &values[1..]);
    values.push(check);
    values.push(STOP);
    values
}

/// Events of complete symbol values (start, data, check and stop).
pub(crate) fn symbol_events(values: &[u8]) -> Vec<Event> {
    let last = values.len() - 1;
    let mut body = Vec::new();
    for (i, &value) in values.iter().enumerate() {
        let (group, label) = match (i, value) {
            (0, START_A) => (BarGroup::StartCharacter, Some("StartA".to_owned())),
            (0, START_B) => (BarGroup::StartCharacter, Some("StartB".to_owned())),
            (0, START_C) => (BarGroup::StartCharacter, Some("StartC".to_owned())),
            (i, _) if i == last => (BarGroup::StopCharacter, None),
            (_, value) => (BarGroup::MessageCharacter, Some(format!("idx{value}"))),
        };
        body.extend(logic::group(group, label, logic::alternating(pattern(value).iter().copied(), true)));
    }
    body
}

/// Width in modules of a symbol made of `values`, check and stop included.
pub(crate) const fn symbol_modules(values: usize) -> usize {
    (values - 1) * SYMBOL_MODULES + STOP_MODULES
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Code128Config {
    pub common: CommonParams,
}

impl Default for Code128Config {
    fn default() -> Self {
        Self { common: CommonParams::with_module_width(0.21) }
    }
}

impl BarcodeParams for Code128Config {
    fn common(&self) -> &CommonParams {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonParams {
        &mut self.common
    }
}

/// Code 128 generator. The check character is always added.
#[derive(Debug, Clone, PartialEq)]
pub struct Code128 {
    config: Code128Config,
}

impl Code128 {
    pub fn new(config: Code128Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Code128Config {
        &self.config
    }

    /// Symbol values of `msg` from the start code to the stop code.
    pub fn encode(&self, msg: &str) -> Result<Vec<u8>> {
        let values = finish(encoder::encode(msg)?);
        debug!("Code 128: {} symbols for {} characters", values.len(), msg.chars().count());
        Ok(values)
    }

    pub fn calc_dimensions(&self, msg: &str) -> Result<BarcodeDimension> {
        let values = self.encode(msg)?;
        let width = symbol_modules(values.len()) as f64 * self.config.common.module_width;
        Ok(params::linear_dimensions(&self.config, width))
    }

    pub fn events(&self, msg: &str) -> Result<impl Iterator<Item = Event>> {
        let values = self.encode(msg)?;
        let hr = params::format_human_readable(&encoder::printable(msg), self.config.common.pattern.as_deref());
        Ok(logic::barcode(msg.to_owned(), hr, symbol_events(&values)))
    }

    pub fn generate_barcode<H: ClassicLogicHandler + ?Sized>(&self, handler: &mut H, msg: &str) -> Result<()> {
        logic::emit(handler, self.events(msg)?);
        Ok(())
    }
}
