//! # PDF417
//!
//! Stacked 2-D symbology. A message goes through three stages:
//!
//! - **high level encoding** ([high_level]): text, byte and numeric
//!   compaction turn the message into codewords (0-928),
//! - **error correction** ([ecc]): Reed-Solomon codewords over GF(929),
//! - **layout**: the codewords are arranged in rows of up to 30 data
//!   columns framed by start/stop patterns and row indicators.
//!
//! ```
//! # use symbology::pdf417::{Pdf417, Pdf417Config};
//! let symbol = Pdf417::new(Pdf417Config::default()).unwrap().encode("Hello, world!").unwrap();
//! assert!(symbol.rows() >= 3);
//! ```

pub mod ecc;
pub mod high_level;
pub mod row;
mod tables;

use log::debug;

use crate::{
    dimension::BarcodeDimension,
    logic::{self, BarGroup, Event, TwoDimLogicHandler},
    params::{BarcodeParams, CommonParams, HumanReadablePlacement},
    Error, Result,
};
pub use ecc::{ecc_count, generate_error_correction, recommended_level};
pub use high_level::{encode_high_level, PDF417Encoder};
use high_level::CW_PADDING;
use row::{PDF417Row, RowPart, ROW_OVERHEAD, TRUNCATED_ROW_OVERHEAD};

/// Minimum number of rows in a PDF417 barcode.
pub const MIN_ROWS: usize = 3;
/// Maximum number of rows in a PDF417 barcode.
pub const MAX_ROWS: usize = 90;
/// Minimum number of data columns in a PDF417 barcode.
pub const MIN_COLS: usize = 1;
/// Maximum number of data columns in a PDF417 barcode.
pub const MAX_COLS: usize = 30;
/// Maximum number of codewords in a symbol: length descriptor, data,
/// padding and error correction.
pub const MAX_CODEWORDS: usize = 929;

/// Width to height ratio the layout aims for.
const PREFERRED_RATIO: f64 = 3.0;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Pdf417Config {
    pub common: CommonParams,
    pub min_cols: usize,
    pub max_cols: usize,
    pub min_rows: usize,
    pub max_rows: usize,
    /// Error correction level (0-8), `None` picks one from the data size.
    pub error_correction: Option<u8>,
    /// Row height in modules.
    pub row_height: f64,
    /// Drops the right row indicator and reduces the stop pattern to a
    /// single bar.
    pub truncated: bool,
}

impl Default for Pdf417Config {
    fn default() -> Self {
        let module_width = 25.4 / 72.0;
        let mut common = CommonParams::with_module_width(module_width);
        common.quiet_zone = Some(2.0 * module_width);
        common.human_readable = HumanReadablePlacement::None;
        Self {
            common,
            min_cols: MIN_COLS,
            max_cols: MAX_COLS,
            min_rows: MIN_ROWS,
            max_rows: MAX_ROWS,
            error_correction: None,
            row_height: 3.0,
            truncated: false,
        }
    }
}

impl BarcodeParams for Pdf417Config {
    fn common(&self) -> &CommonParams {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonParams {
        &mut self.common
    }

    fn validate(&self) -> Result<()> {
        self.common.validate()?;
        if !(MIN_COLS..=MAX_COLS).contains(&self.min_cols) || !(self.min_cols..=MAX_COLS).contains(&self.max_cols) {
            return Err(Error::config(format!("PDF417 columns must satisfy 1 <= min ({}) <= max ({}) <= 30", self.min_cols, self.max_cols)));
        }
        if !(MIN_ROWS..=MAX_ROWS).contains(&self.min_rows) || !(self.min_rows..=MAX_ROWS).contains(&self.max_rows) {
            return Err(Error::config(format!("PDF417 rows must satisfy 3 <= min ({}) <= max ({}) <= 90", self.min_rows, self.max_rows)));
        }
        if self.error_correction.is_some_and(|level| level > ecc::MAX_LEVEL) {
            return Err(Error::config("PDF417 error correction level must be between 0 and 8"));
        }
        if !(self.row_height > 0.0) {
            return Err(Error::config("PDF417 row height must be positive"));
        }
        Ok(())
    }
}

impl Pdf417Config {
    pub fn with_columns(mut self, min: usize, max: usize) -> Result<Self> {
        (self.min_cols, self.max_cols) = (min, max);
        self.validate()?;
        Ok(self)
    }

    pub fn with_rows(mut self, min: usize, max: usize) -> Result<Self> {
        (self.min_rows, self.max_rows) = (min, max);
        self.validate()?;
        Ok(self)
    }

    pub fn with_error_correction(mut self, level: u8) -> Result<Self> {
        self.error_correction = Some(level);
        self.validate()?;
        Ok(self)
    }

    pub fn with_truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    /// Modules in a row with `cols` data columns.
    fn row_modules(&self, cols: usize) -> usize {
        17 * cols + if self.truncated { TRUNCATED_ROW_OVERHEAD } else { ROW_OVERHEAD }
    }
}

/// Rows needed for `m` data codewords and `k` error correction codewords in
/// `c` columns, the length descriptor included.
const fn number_of_rows(m: usize, k: usize, c: usize) -> usize {
    let mut r = (m + 1 + k) / c + 1;
    if c * r >= m + 1 + k + c {
        r -= 1;
    }
    r
}

/// Pad codewords filling a `c` by `r` symbol.
const fn number_of_pads(m: usize, k: usize, c: usize, r: usize) -> usize {
    let n = c * r - k;
    if n > m + 1 { n - m - 1 } else { 0 }
}

/// An encoded PDF417: every codeword (length descriptor, data, padding,
/// error correction) and its layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdf417Symbol {
    codewords: Vec<u16>,
    rows: usize,
    cols: usize,
    level: u8,
    truncated: bool,
}

impl Pdf417Symbol {
    /// Get the number of rows of the PDF417.
    #[inline]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Get the number of data columns of the PDF417.
    #[inline]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub const fn level(&self) -> u8 {
        self.level
    }

    pub fn codewords(&self) -> &[u16] {
        &self.codewords
    }

    pub fn iter(&self) -> impl Iterator<Item = PDF417Row<'_>> + '_ {
        let infos = PDF417Row::prepare((self.rows, self.cols), self.level);
        let truncated = self.truncated;
        self.codewords.chunks(self.cols)
            .enumerate()
            .map(move |(row, codewords)| PDF417Row::new(codewords, row, infos, truncated))
    }

    /// Modules of every row, dark modules set.
    pub fn module_rows(&self) -> Vec<Vec<bool>> {
        self.iter()
            .map(|row| row.flat_map(|(_, field)| field).collect())
            .collect()
    }

    fn into_events(self) -> impl Iterator<Item = Event> {
        let rows: Vec<Vec<(RowPart, Vec<u8>)>> = self.iter()
            .map(|row| row.map(|(part, field)| (part, field.widths())).collect())
            .collect();

        rows.into_iter().flat_map(|row| {
            let bars = row.into_iter().flat_map(|(part, widths)| {
                let group = match part {
                    RowPart::Start => BarGroup::StartCharacter,
                    RowPart::End => BarGroup::StopCharacter,
                    RowPart::Indicator | RowPart::Data => BarGroup::MessageCharacter,
                };
                logic::group(group, None, logic::alternating(widths, true))
            });
            core::iter::once(Event::StartRow)
                .chain(bars)
                .chain(core::iter::once(Event::EndRow))
        })
    }
}

/// PDF417 generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdf417 {
    config: Pdf417Config,
}

impl Pdf417 {
    pub fn new(config: Pdf417Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Pdf417Config {
        &self.config
    }

    /// Columns and rows for `m` data codewords and `k` error correction
    /// codewords, picking the layout whose aspect ratio is closest to 3:1.
    fn determine_dimensions(&self, m: usize, k: usize) -> Result<(usize, usize)> {
        let config = &self.config;
        let mut best: Option<((usize, usize), f64)> = None;

        for cols in config.min_cols..=config.max_cols {
            let rows = number_of_rows(m, k, cols);
            if rows < config.min_rows {
                break;
            }
            if rows > config.max_rows {
                continue;
            }

            let ratio = config.row_modules(cols) as f64 / (rows as f64 * config.row_height);
            if best.is_some_and(|(_, r)| (ratio - PREFERRED_RATIO).abs() > (r - PREFERRED_RATIO).abs()) {
                continue;
            }
            best = Some(((cols, rows), ratio));
        }

        if let Some((dimensions, _)) = best {
            return Ok(dimensions);
        }
        if number_of_rows(m, k, config.min_cols) < config.min_rows {
            return Ok((config.min_cols, config.min_rows));
        }
        Err(Error::CapacityExceeded)
    }

    /// Encodes `message` into a complete symbol.
    pub fn encode(&self, message: &str) -> Result<Pdf417Symbol> {
        let data = encode_high_level(message)?;
        let m = data.len();
        let level = match self.config.error_correction {
            Some(level) => level,
            None => recommended_level(m).ok_or(Error::CapacityExceeded)?,
        };
        let k = ecc_count(level);
        if m + k + 1 > MAX_CODEWORDS {
            return Err(Error::CapacityExceeded);
        }

        let (cols, rows) = self.determine_dimensions(m, k)?;
        let pad = number_of_pads(m, k, cols, rows);
        let n = m + pad + 1;
        if n + k > MAX_CODEWORDS {
            return Err(Error::CapacityExceeded);
        }

        let mut codewords = Vec::with_capacity(rows * cols);
        codewords.push(n as u16);
        codewords.extend_from_slice(&data);
        codewords.resize(n, CW_PADDING);
        codewords.resize(n + k, 0);
        ecc::generate_ecc(&mut codewords, level);
        debug!("PDF417: {m} data codewords, {pad} pads, level {level}, {rows}x{cols}");

        Ok(Pdf417Symbol { codewords, rows, cols, level, truncated: self.config.truncated })
    }

    pub fn calc_dimensions(&self, message: &str) -> Result<BarcodeDimension> {
        let symbol = self.encode(message)?;
        let config = &self.config;
        let mw = config.common.module_width;
        let width = config.row_modules(symbol.cols) as f64 * mw;
        let height = symbol.rows as f64 * config.row_height * mw;
        Ok(BarcodeDimension::new(width, height, config.common.quiet_zone_h(), config.common.quiet_zone_v()))
    }

    /// Events of the symbol, one 2-D row per PDF417 row.
    pub fn events(&self, message: &str) -> Result<impl Iterator<Item = Event>> {
        let symbol = self.encode(message)?;
        Ok(logic::barcode(message.to_owned(), message.to_owned(), symbol.into_events()))
    }

    pub fn generate_barcode<H: TwoDimLogicHandler + ?Sized>(&self, handler: &mut H, message: &str) -> Result<()> {
        logic::emit_2d(handler, self.events(message)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{is_well_nested, ModuleGrid};

    #[test]
    fn test_rows_and_pads() {
        assert_eq!(number_of_rows(10, 8, 2), 10);
        assert_eq!(number_of_rows(8, 8, 1), 17);
        assert_eq!(number_of_pads(10, 8, 2, 10), 1);
        assert_eq!(number_of_pads(8, 8, 1, 17), 0);
    }

    #[test]
    fn test_seal() {
        let pdf = Pdf417::new(Pdf417Config::default().with_error_correction(0).unwrap().with_columns(2, 2).unwrap()).unwrap();
        let symbol = pdf.encode("000213298174000").unwrap();
        // 7 data codewords, length descriptor, 2 ecc: 10 codewords in 2 columns
        assert_eq!((symbol.cols(), symbol.rows()), (2, 5));
        assert_eq!(&symbol.codewords()[..8], &[8, 902, 1, 624, 434, 632, 282, 200]);
        assert_eq!(symbol.codewords().len(), 10);
        assert_eq!(generate_error_correction(&symbol.codewords()[..8], 0).unwrap(), &symbol.codewords()[8..]);
    }

    #[test]
    fn test_padding_fills_symbol() {
        let pdf = Pdf417::new(Pdf417Config::default().with_error_correction(1).unwrap().with_columns(2, 2).unwrap()).unwrap();
        let symbol = pdf.encode("ABCDEFGH").unwrap();
        assert_eq!((symbol.cols(), symbol.rows()), (2, 5));
        assert_eq!(symbol.codewords().len(), symbol.rows() * symbol.cols());
        let n = symbol.codewords()[0] as usize;
        assert_eq!(n + ecc_count(1), symbol.codewords().len());
        assert_eq!(symbol.codewords()[n - 1], CW_PADDING);
    }

    #[test]
    fn test_aspect_ratio_prefers_wide() {
        let pdf = Pdf417::new(Pdf417Config::default()).unwrap();
        let symbol = pdf.encode(&"PDF417 ".repeat(20)).unwrap();
        assert!(symbol.cols() > 1);
        assert!(symbol.rows() >= MIN_ROWS);
    }

    #[test]
    fn test_capacity() {
        let pdf = Pdf417::new(Pdf417Config::default()).unwrap();
        assert_eq!(pdf.encode(&"\u{1}".repeat(1200)), Err(Error::CapacityExceeded));

        let narrow = Pdf417::new(Pdf417Config::default().with_columns(1, 1).unwrap().with_rows(3, 5).unwrap()).unwrap();
        assert_eq!(narrow.encode("a much longer message than five rows"), Err(Error::CapacityExceeded));
    }

    #[test]
    fn test_invalid_config() {
        assert!(Pdf417Config::default().with_columns(0, 3).is_err());
        assert!(Pdf417Config::default().with_columns(5, 3).is_err());
        assert!(Pdf417Config::default().with_rows(2, 3).is_err());
        assert!(Pdf417Config::default().with_error_correction(9).is_err());
    }

    #[test]
    fn test_events_grid() {
        let pdf = Pdf417::new(Pdf417Config::default().with_error_correction(2).unwrap()).unwrap();
        let events: Vec<Event> = pdf.events("Hello, world!").unwrap().collect();
        assert!(is_well_nested(&events));

        let symbol = pdf.encode("Hello, world!").unwrap();
        let mut grid = ModuleGrid::new();
        pdf.generate_barcode(&mut grid, "Hello, world!").unwrap();
        assert_eq!(grid.height(), symbol.rows());
        assert_eq!(grid.width(), 17 * symbol.cols() + 69);
        assert_eq!(grid.rows(), symbol.module_rows().as_slice());
        // every row starts with the 8 module bar of the start pattern
        assert!(grid.rows().iter().all(|row| row[..8].iter().all(|&m| m) && !row[8]));
    }

    #[test]
    fn test_truncated() {
        let config = Pdf417Config::default().with_truncated(true);
        let pdf = Pdf417::new(config.clone()).unwrap();
        let symbol = pdf.encode("Truncated PDF417").unwrap();
        let mut grid = ModuleGrid::new();
        pdf.generate_barcode(&mut grid, "Truncated PDF417").unwrap();
        assert_eq!(grid.width(), 17 * symbol.cols() + 35);

        let dim = pdf.calc_dimensions("Truncated PDF417").unwrap();
        let mw = config.common.module_width;
        assert!((dim.width() - grid.width() as f64 * mw).abs() < 1e-9);
        assert!((dim.height() - symbol.rows() as f64 * 3.0 * mw).abs() < 1e-9);
        assert!(dim.width_plus_quiet() > dim.width());
    }
}
