//! Low level layout of PDF417 rows.

use core::iter;

use super::tables::HL_TO_LL;

/// Up to 24 modules, most significant bit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitfield(u32);

impl Bitfield {
    pub const fn new(bits: u32, count: u8) -> Self {
        debug_assert!(count <= 24, "count is too big");

        Self((bits << 8) | count as u32)
    }

    #[inline]
    pub const fn size(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0 >> 8
    }

    /// Widths of the alternating bars and spaces, starting with a bar.
    pub fn widths(&self) -> Vec<u8> {
        let mut widths: Vec<u8> = Vec::new();
        let mut last = None;
        for bit in *self {
            match widths.last_mut() {
                Some(w) if last == Some(bit) => *w += 1,
                _ => widths.push(1),
            }
            last = Some(bit);
        }
        widths
    }
}

impl iter::IntoIterator for Bitfield {
    type Item = bool;
    type IntoIter = Bits;

    fn into_iter(self) -> Self::IntoIter {
        Bits { value: self.bits(), count: self.size() as u32 }
    }
}

pub struct Bits {
    value: u32,
    count: u32,
}

impl iter::Iterator for Bits {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        if self.count > 0 {
            self.count -= 1;
            Some((self.value >> self.count) & 1 != 0)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.count as usize;
        (count, Some(count))
    }
}

impl iter::ExactSizeIterator for Bits {}
impl iter::FusedIterator for Bits {}

pub const START_PAT: Bitfield = Bitfield::new(0b11111111010101000, 17);
pub const   END_PAT: Bitfield = Bitfield::new(0b111111101000101001, 18);
/// Stop pattern of a truncated symbol.
pub const TRUNCATED_END_PAT: Bitfield = Bitfield::new(1, 1);

/// Modules of a start pattern, left indicator, right indicator and stop
/// pattern.
pub const ROW_OVERHEAD: usize = 17 + 17 + 17 + 18;
/// Same for a truncated symbol (no right indicator, single bar stop).
pub const TRUNCATED_ROW_OVERHEAD: usize = 17 + 17 + 1;

/// Pattern of `codeword` in the cluster used by `row`.
pub fn codeword_pattern(row: usize, codeword: u16) -> Bitfield {
    let table = row % 3;
    Bitfield::new((1 << 16) | HL_TO_LL[table * 929 + codeword as usize] as u32, 17)
}

/// Which element of a row a [Bitfield] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPart {
    Start,
    Indicator,
    Data,
    End,
}

#[derive(Clone, Copy)]
enum RowPattern {
    Start,
    Left,
    Data,
    Right,
    End,
    None,
}

/// Iterator over the elements of one row of a symbol.
#[derive(Clone)]
pub struct PDF417Row<'a> {
    codewords: &'a [u16],
    next_pat: RowPattern,
    row: usize,
    truncated: bool,
    /// (left, right)
    markers: (u16, u16),
}

/// (rows_val, cols_val, level_val) shared by every row indicator.
pub type RowInfo = (u16, u16, u16);

impl<'a> PDF417Row<'a> {
    pub fn new(codewords: &'a [u16], row: usize, infos: RowInfo, truncated: bool) -> Self {
        let (rows_val, cols_val, level_val) = infos;
        let row_id = (row / 3) as u16 * 30;

        let (left, right) = match row % 3 {
            0 => (rows_val, cols_val),
            1 => (level_val, rows_val),
            _ => (cols_val, level_val),
        };
        Self {
            codewords,
            row,
            truncated,
            markers: (left + row_id, right + row_id),
            next_pat: RowPattern::Start,
        }
    }

    pub fn prepare((rows, cols): (usize, usize), level: u8) -> RowInfo {
        let rows_val = (rows as u16 - 1) / 3;
        let cols_val = cols as u16 - 1;
        let level_val = level as u16 * 3 + (rows as u16 - 1) % 3;
        (rows_val, cols_val, level_val)
    }
}

impl<'a> iter::Iterator for PDF417Row<'a> {
    type Item = (RowPart, Bitfield);

    fn next(&mut self) -> Option<Self::Item> {
        let (item, next) = match self.next_pat {
            RowPattern::Start => (Some((RowPart::Start, START_PAT)), RowPattern::Left),
            RowPattern::Left => {
                let next = if self.codewords.is_empty() { RowPattern::Right } else { RowPattern::Data };
                (Some((RowPart::Indicator, codeword_pattern(self.row, self.markers.0))), next)
            },
            RowPattern::Data => {
                let cw = self.codewords[0];
                self.codewords = &self.codewords[1..];

                let next = if self.codewords.is_empty() { RowPattern::Right } else { RowPattern::Data };

                (Some((RowPart::Data, codeword_pattern(self.row, cw))), next)
            },
            RowPattern::Right if self.truncated => (Some((RowPart::End, TRUNCATED_END_PAT)), RowPattern::None),
            RowPattern::Right => (Some((RowPart::Indicator, codeword_pattern(self.row, self.markers.1))), RowPattern::End),
            RowPattern::End => (Some((RowPart::End, END_PAT)), RowPattern::None),
            RowPattern::None => (None, RowPattern::None),
        };

        self.next_pat = next;
        item
    }
}

impl<'a> iter::FusedIterator for PDF417Row<'a> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_order() {
        let bits: Vec<bool> = Bitfield::new(0b1101, 4).into_iter().collect();
        assert_eq!(bits, [true, true, false, true]);
        assert_eq!(START_PAT.into_iter().len(), 17);
    }

    #[test]
    fn test_widths() {
        assert_eq!(START_PAT.widths(), [8, 1, 1, 1, 1, 1, 1, 3]);
        assert_eq!(END_PAT.widths(), [7, 1, 1, 3, 1, 1, 1, 2, 1]);
    }

    #[test]
    fn test_codeword_patterns_are_17_modules_4_bars() {
        for row in 0..3 {
            for cw in [0u16, 1, 450, 928] {
                let widths = codeword_pattern(row, cw).widths();
                assert_eq!(widths.iter().map(|&w| w as usize).sum::<usize>(), 17);
                assert_eq!(widths.len(), 8, "row {row} codeword {cw}");
            }
        }
    }

    #[test]
    fn test_row_elements() {
        let codewords = [1u16, 2];
        let infos = PDF417Row::prepare((3, 2), 0);
        assert_eq!(infos, (0, 1, 2));

        let parts: Vec<RowPart> = PDF417Row::new(&codewords, 0, infos, false).map(|(p, _)| p).collect();
        assert_eq!(parts, [RowPart::Start, RowPart::Indicator, RowPart::Data, RowPart::Data, RowPart::Indicator, RowPart::End]);

        let truncated: Vec<_> = PDF417Row::new(&codewords, 1, infos, true).collect();
        assert_eq!(truncated.len(), 5);
        assert_eq!(truncated[4], (RowPart::End, TRUNCATED_END_PAT));
        // row 1 left indicator is the level value
        assert_eq!(truncated[1].1, codeword_pattern(1, 2));
    }
}
