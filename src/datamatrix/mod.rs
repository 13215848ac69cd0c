//! # Data Matrix (ECC200)
//!
//! The message is compacted into data codewords by [encoder], completed
//! with Reed-Solomon codewords by [ecc] and laid out diagonally by
//! [placement]. Each data region is framed by its finder pattern: solid
//! left and bottom edges, alternating top and right edges.
//!
//! ```
//! # use symbology::datamatrix::{DataMatrix, DataMatrixConfig};
//! let symbol = DataMatrix::new(DataMatrixConfig::default()).unwrap().encode("123456").unwrap();
//! assert_eq!((symbol.width(), symbol.height()), (10, 10));
//! ```

pub mod ecc;
pub mod encoder;
pub mod placement;
pub mod symbol;

use log::debug;

use crate::{
    dimension::BarcodeDimension,
    logic::{self, Event, TwoDimLogicHandler},
    params::{BarcodeParams, CommonParams, HumanReadablePlacement},
    Error, Result,
};
pub use encoder::{encode_high_level, Encodation, Encoded};
use placement::Placement;
pub use symbol::{SizeConstraints, SymbolInfo, SymbolShapeHint, SymbolTable, PRODUCTION_SYMBOLS};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DataMatrixConfig {
    pub common: CommonParams,
    pub shape: SymbolShapeHint,
    /// Smallest acceptable symbol as (width, height) in modules.
    pub min_size: Option<(usize, usize)>,
    pub max_size: Option<(usize, usize)>,
    /// Sizes to choose from.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub table: SymbolTable,
}

impl Default for DataMatrixConfig {
    fn default() -> Self {
        let module_width = 25.4 / 72.0;
        let mut common = CommonParams::with_module_width(module_width);
        common.quiet_zone = Some(module_width);
        common.human_readable = HumanReadablePlacement::None;
        Self {
            common,
            shape: SymbolShapeHint::ForceNone,
            min_size: None,
            max_size: None,
            table: SymbolTable::standard(),
        }
    }
}

impl BarcodeParams for DataMatrixConfig {
    fn common(&self) -> &CommonParams {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonParams {
        &mut self.common
    }

    fn validate(&self) -> Result<()> {
        self.common.validate()?;
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min.0 > max.0 || min.1 > max.1 {
                return Err(Error::config(format!("Data Matrix minimum size {min:?} exceeds maximum size {max:?}")));
            }
        }
        if self.table.symbols().is_empty() {
            return Err(Error::config("Data Matrix symbol table is empty"));
        }
        Ok(())
    }
}

impl DataMatrixConfig {
    pub fn with_shape(mut self, shape: SymbolShapeHint) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_size_range(mut self, min: Option<(usize, usize)>, max: Option<(usize, usize)>) -> Result<Self> {
        (self.min_size, self.max_size) = (min, max);
        self.validate()?;
        Ok(self)
    }

    pub fn with_table(mut self, table: SymbolTable) -> Result<Self> {
        self.table = table;
        self.validate()?;
        Ok(self)
    }

    pub fn constraints(&self) -> SizeConstraints {
        SizeConstraints { shape: self.shape, min_size: self.min_size, max_size: self.max_size }
    }
}

/// An encoded Data Matrix with its finder patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMatrixSymbol {
    codewords: Vec<u8>,
    info: SymbolInfo,
    modules: Vec<Vec<bool>>,
}

impl DataMatrixSymbol {
    /// Lays out data and error correction codewords in the symbol `info`.
    pub fn new(codewords: Vec<u8>, info: SymbolInfo) -> Self {
        let mut placement = Placement::new(&codewords, info.symbol_data_width(), info.symbol_data_height());
        placement.place();
        let modules = frame(&placement, &info);
        Self { codewords, info, modules }
    }

    pub fn info(&self) -> &SymbolInfo {
        &self.info
    }

    /// Data codewords followed by the error correction codewords.
    pub fn codewords(&self) -> &[u8] {
        &self.codewords
    }

    pub fn width(&self) -> usize {
        self.info.symbol_width()
    }

    pub fn height(&self) -> usize {
        self.info.symbol_height()
    }

    pub fn module_rows(&self) -> &[Vec<bool>] {
        &self.modules
    }
}

/// Adds the finder pattern around every data region.
fn frame(placement: &Placement, info: &SymbolInfo) -> Vec<Vec<bool>> {
    let (region_w, region_h) = (info.matrix_width, info.matrix_height);
    let width = info.symbol_width();
    let mut rows = Vec::with_capacity(info.symbol_height());

    for y in 0..placement.num_rows() {
        if y % region_h == 0 {
            rows.push((0..width).map(|x| x % 2 == 0).collect());
        }

        let mut row = Vec::with_capacity(width);
        for x in 0..placement.num_cols() {
            if x % region_w == 0 {
                row.push(true);
            }
            row.push(placement.bit(x, y));
            if x % region_w == region_w - 1 {
                row.push(y % 2 == 0);
            }
        }
        rows.push(row);

        if y % region_h == region_h - 1 {
            rows.push(vec![true; width]);
        }
    }
    rows
}

/// Data Matrix generator.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMatrix {
    config: DataMatrixConfig,
}

impl DataMatrix {
    pub fn new(config: DataMatrixConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DataMatrixConfig {
        &self.config
    }

    pub fn encode(&self, message: &str) -> Result<DataMatrixSymbol> {
        let Encoded { codewords, symbol } = encode_high_level(message, &self.config.table, &self.config.constraints())?;
        debug!("Data Matrix: {} data codewords in {}x{}", codewords.len(), symbol.symbol_width(), symbol.symbol_height());
        let codewords = ecc::encode_ecc200(&codewords, &symbol)?;
        Ok(DataMatrixSymbol::new(codewords, symbol))
    }

    pub fn calc_dimensions(&self, message: &str) -> Result<BarcodeDimension> {
        let symbol = self.encode(message)?;
        let common = &self.config.common;
        let mw = common.module_width;
        Ok(BarcodeDimension::new(
            symbol.width() as f64 * mw,
            symbol.height() as f64 * mw,
            common.quiet_zone_h(),
            common.quiet_zone_v(),
        ))
    }

    /// Events of the symbol, one 2-D row per module row.
    pub fn events(&self, message: &str) -> Result<impl Iterator<Item = Event>> {
        let symbol = self.encode(message)?;
        Ok(logic::barcode(message.to_owned(), message.to_owned(), logic::module_rows(symbol.modules)))
    }

    pub fn generate_barcode<H: TwoDimLogicHandler + ?Sized>(&self, handler: &mut H, message: &str) -> Result<()> {
        logic::emit_2d(handler, self.events(message)?);
        Ok(())
    }
}
