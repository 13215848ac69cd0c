//! ECC200 symbol sizes.

use std::borrow::Cow;

use crate::{Error, Result};

/// Shape restriction applied when picking a symbol size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SymbolShapeHint {
    #[default]
    ForceNone,
    ForceSquare,
    ForceRectangle,
}

/// Capacity and geometry of one symbol size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    pub rectangular: bool,
    pub data_capacity: usize,
    pub error_codewords: usize,
    /// Width of one data region in modules.
    pub matrix_width: usize,
    pub matrix_height: usize,
    pub data_regions: usize,
    /// Data codewords per interleaved block.
    pub rs_block_data: usize,
    /// Error codewords per interleaved block.
    pub rs_block_error: usize,
}

impl SymbolInfo {
    pub const fn new(rectangular: bool, data_capacity: usize, error_codewords: usize,
                     matrix_width: usize, matrix_height: usize, data_regions: usize) -> Self {
        Self::interleaved(rectangular, data_capacity, error_codewords, matrix_width, matrix_height,
            data_regions, data_capacity, error_codewords)
    }

    #[allow(clippy::too_many_arguments)]
    pub const fn interleaved(rectangular: bool, data_capacity: usize, error_codewords: usize,
                             matrix_width: usize, matrix_height: usize, data_regions: usize,
                             rs_block_data: usize, rs_block_error: usize) -> Self {
        Self {
            rectangular, data_capacity, error_codewords, matrix_width, matrix_height,
            data_regions, rs_block_data, rs_block_error,
        }
    }

    pub const fn horizontal_data_regions(&self) -> usize {
        match self.data_regions {
            1 => 1,
            2 | 4 => 2,
            16 => 4,
            36 => 6,
            _ => 1,
        }
    }

    pub const fn vertical_data_regions(&self) -> usize {
        match self.data_regions {
            1 | 2 => 1,
            4 => 2,
            16 => 4,
            36 => 6,
            _ => 1,
        }
    }

    /// Width of the placement area (all data regions, no finder patterns).
    pub const fn symbol_data_width(&self) -> usize {
        self.horizontal_data_regions() * self.matrix_width
    }

    pub const fn symbol_data_height(&self) -> usize {
        self.vertical_data_regions() * self.matrix_height
    }

    /// Full symbol width in modules, finder patterns included.
    pub const fn symbol_width(&self) -> usize {
        self.symbol_data_width() + self.horizontal_data_regions() * 2
    }

    pub const fn symbol_height(&self) -> usize {
        self.symbol_data_height() + self.vertical_data_regions() * 2
    }

    pub const fn codeword_count(&self) -> usize {
        self.data_capacity + self.error_codewords
    }

    /// The 144x144 symbol is the only one whose blocks differ in size.
    const fn is_144(&self) -> bool {
        self.data_capacity == 1558 && !self.rectangular
    }

    pub const fn interleaved_block_count(&self) -> usize {
        if self.is_144() { 10 } else { self.data_capacity / self.rs_block_data }
    }

    /// Data codewords of the 1-based block `index`.
    pub const fn data_length_for_block(&self, index: usize) -> usize {
        if self.is_144() {
            if index <= 8 { 156 } else { 155 }
        } else {
            self.rs_block_data
        }
    }

    pub const fn error_length_for_block(&self, _index: usize) -> usize {
        self.rs_block_error
    }
}

/// ECC200 sizes from ISO/IEC 16022, smallest first.
pub const PRODUCTION_SYMBOLS: [SymbolInfo; 30] = [
    SymbolInfo::new(false, 3, 5, 8, 8, 1),
    SymbolInfo::new(false, 5, 7, 10, 10, 1),
    SymbolInfo::new(true, 5, 7, 16, 6, 1),
    SymbolInfo::new(false, 8, 10, 12, 12, 1),
    SymbolInfo::new(true, 10, 11, 14, 6, 2),
    SymbolInfo::new(false, 12, 12, 14, 14, 1),
    SymbolInfo::new(true, 16, 14, 24, 10, 1),

    SymbolInfo::new(false, 18, 14, 16, 16, 1),
    SymbolInfo::new(false, 22, 18, 18, 18, 1),
    SymbolInfo::new(true, 22, 18, 16, 10, 2),
    SymbolInfo::new(false, 30, 20, 20, 20, 1),
    SymbolInfo::new(true, 32, 24, 16, 14, 2),
    SymbolInfo::new(false, 36, 24, 22, 22, 1),
    SymbolInfo::new(false, 44, 28, 24, 24, 1),
    SymbolInfo::new(true, 49, 28, 22, 14, 2),

    SymbolInfo::new(false, 62, 36, 14, 14, 4),
    SymbolInfo::new(false, 86, 42, 16, 16, 4),
    SymbolInfo::new(false, 114, 48, 18, 18, 4),
    SymbolInfo::new(false, 144, 56, 20, 20, 4),
    SymbolInfo::new(false, 174, 68, 22, 22, 4),

    SymbolInfo::interleaved(false, 204, 84, 24, 24, 4, 102, 42),
    SymbolInfo::interleaved(false, 280, 112, 14, 14, 16, 140, 56),
    SymbolInfo::interleaved(false, 368, 144, 16, 16, 16, 92, 36),
    SymbolInfo::interleaved(false, 456, 192, 18, 18, 16, 114, 48),
    SymbolInfo::interleaved(false, 576, 224, 20, 20, 16, 144, 56),
    SymbolInfo::interleaved(false, 696, 272, 22, 22, 16, 174, 68),
    SymbolInfo::interleaved(false, 816, 336, 24, 24, 16, 136, 56),
    SymbolInfo::interleaved(false, 1050, 408, 18, 18, 36, 175, 68),
    SymbolInfo::interleaved(false, 1304, 496, 20, 20, 36, 163, 62),
    SymbolInfo::interleaved(false, 1558, 620, 22, 22, 36, 1558, 62),
];

/// Size constraints for [SymbolTable::lookup], in modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeConstraints {
    pub shape: SymbolShapeHint,
    /// Minimum (width, height) of the symbol.
    pub min_size: Option<(usize, usize)>,
    pub max_size: Option<(usize, usize)>,
}

impl SizeConstraints {
    fn accepts(&self, symbol: &SymbolInfo) -> bool {
        let shape = match self.shape {
            SymbolShapeHint::ForceNone => true,
            SymbolShapeHint::ForceSquare => !symbol.rectangular,
            SymbolShapeHint::ForceRectangle => symbol.rectangular,
        };
        let (w, h) = (symbol.symbol_width(), symbol.symbol_height());
        shape
            && self.min_size.map_or(true, |(mw, mh)| w >= mw && h >= mh)
            && self.max_size.map_or(true, |(mw, mh)| w <= mw && h <= mh)
    }
}

/// The list of symbol sizes an encoder may pick from. Encoders receive it
/// explicitly, so tests can restrict it without affecting anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: Cow<'static, [SymbolInfo]>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl SymbolTable {
    pub const fn standard() -> Self {
        Self { symbols: Cow::Borrowed(&PRODUCTION_SYMBOLS) }
    }

    /// A custom table. Entries must be sorted by increasing capacity.
    pub fn new(symbols: Vec<SymbolInfo>) -> Self {
        Self { symbols: Cow::Owned(symbols) }
    }

    pub fn symbols(&self) -> &[SymbolInfo] {
        &self.symbols
    }

    /// Smallest symbol holding `data_codewords` that satisfies `constraints`.
    pub fn lookup(&self, data_codewords: usize, constraints: &SizeConstraints) -> Result<&SymbolInfo> {
        self.symbols.iter()
            .filter(|symbol| constraints.accepts(symbol))
            .find(|symbol| data_codewords <= symbol.data_capacity)
            .ok_or(Error::CapacityExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry() {
        let table = SymbolTable::standard();
        let sizes: Vec<(usize, usize)> = table.symbols().iter().map(|s| (s.symbol_width(), s.symbol_height())).collect();
        assert_eq!(sizes[0], (10, 10));
        assert_eq!(sizes[2], (18, 8));
        assert_eq!(sizes[4], (32, 8));
        assert_eq!(sizes[15], (32, 32));
        assert_eq!(sizes[29], (144, 144));
    }

    #[test]
    fn test_lookup() {
        let table = SymbolTable::standard();
        let any = SizeConstraints::default();
        assert_eq!(table.lookup(3, &any).unwrap().data_capacity, 3);
        assert_eq!(table.lookup(4, &any).unwrap().data_capacity, 5);
        assert!(!table.lookup(4, &any).unwrap().rectangular);

        let rect = SizeConstraints { shape: SymbolShapeHint::ForceRectangle, ..Default::default() };
        assert!(table.lookup(4, &rect).unwrap().rectangular);
        assert_eq!(table.lookup(50, &rect), Err(Error::CapacityExceeded));
        assert_eq!(table.lookup(1559, &any), Err(Error::CapacityExceeded));

        let min = SizeConstraints { min_size: Some((20, 20)), ..Default::default() };
        assert_eq!(table.lookup(1, &min).unwrap().symbol_width(), 20);
    }

    #[test]
    fn test_lookup_is_monotonic() {
        let table = SymbolTable::standard();
        let any = SizeConstraints::default();
        let mut last = 0;
        for n in 1..=1558 {
            let capacity = table.lookup(n, &any).unwrap().data_capacity;
            assert!(capacity >= n && capacity >= last);
            last = capacity;
        }
    }

    #[test]
    fn test_interleaving() {
        let s144 = PRODUCTION_SYMBOLS[29];
        assert_eq!(s144.interleaved_block_count(), 10);
        let total: usize = (1..=10).map(|i| s144.data_length_for_block(i)).sum();
        assert_eq!(total, 1558);
        assert_eq!(PRODUCTION_SYMBOLS[20].interleaved_block_count(), 2);
        assert_eq!(PRODUCTION_SYMBOLS[0].interleaved_block_count(), 1);
    }

    #[test]
    fn test_injected_table() {
        let table = SymbolTable::new(vec![PRODUCTION_SYMBOLS[1], PRODUCTION_SYMBOLS[5]]);
        assert_eq!(table.lookup(1, &SizeConstraints::default()).unwrap().data_capacity, 5);
        assert_eq!(table.lookup(13, &SizeConstraints::default()), Err(Error::CapacityExceeded));
    }
}
