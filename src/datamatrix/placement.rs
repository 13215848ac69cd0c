//! ECC200 module placement: the diagonal "utah" layout of codewords into
//! the data area of a symbol.

/// Module states of the data area, row major. `None` means not yet placed.
pub struct Placement<'a> {
    codewords: &'a [u8],
    num_rows: usize,
    num_cols: usize,
    bits: Vec<Option<bool>>,
}

impl<'a> Placement<'a> {
    pub fn new(codewords: &'a [u8], num_cols: usize, num_rows: usize) -> Self {
        Self { codewords, num_rows, num_cols, bits: vec![None; num_rows * num_cols] }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn bit(&self, col: usize, row: usize) -> bool {
        self.bits[row * self.num_cols + col].unwrap_or(false)
    }

    fn has_bit(&self, col: usize, row: usize) -> bool {
        self.bits[row * self.num_cols + col].is_some()
    }

    fn set_bit(&mut self, col: usize, row: usize, bit: bool) {
        self.bits[row * self.num_cols + col] = Some(bit);
    }

    /// Rows of the placed data area.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<bool>]> + '_ {
        self.bits.chunks(self.num_cols)
    }

    pub fn place(&mut self) {
        let (rows, cols) = (self.num_rows as isize, self.num_cols as isize);
        let mut pos = 0;
        let mut row: isize = 4;
        let mut col: isize = 0;

        loop {
            if row == rows && col == 0 {
                self.corner1(pos);
                pos += 1;
            }
            if row == rows - 2 && col == 0 && cols % 4 != 0 {
                self.corner2(pos);
                pos += 1;
            }
            if row == rows - 2 && col == 0 && cols % 8 == 4 {
                self.corner3(pos);
                pos += 1;
            }
            if row == rows + 4 && col == 2 && cols % 8 == 0 {
                self.corner4(pos);
                pos += 1;
            }

            // sweep upward diagonally
            loop {
                if row < rows && col >= 0 && !self.has_bit(col as usize, row as usize) {
                    self.utah(row, col, pos);
                    pos += 1;
                }
                row -= 2;
                col += 2;
                if !(row >= 0 && col < cols) {
                    break;
                }
            }
            row += 1;
            col += 3;

            // sweep downward diagonally
            loop {
                if row >= 0 && col < cols && !self.has_bit(col as usize, row as usize) {
                    self.utah(row, col, pos);
                    pos += 1;
                }
                row += 2;
                col -= 2;
                if !(row < rows && col >= 0) {
                    break;
                }
            }
            row += 3;
            col += 1;

            if !(row < rows || col < cols) {
                break;
            }
        }

        // fixed pattern in the lower right corner of some sizes
        let (last_row, last_col) = (self.num_rows - 1, self.num_cols - 1);
        if !self.has_bit(last_col, last_row) {
            self.set_bit(last_col, last_row, true);
            self.set_bit(last_col - 1, last_row - 1, true);
            self.set_bit(last_col - 1, last_row, false);
            self.set_bit(last_col, last_row - 1, false);
        }
    }

    /// Places bit `bit` (1 = most significant) of codeword `pos`.
    fn module(&mut self, mut row: isize, mut col: isize, pos: usize, bit: u8) {
        let (rows, cols) = (self.num_rows as isize, self.num_cols as isize);
        if row < 0 {
            row += rows;
            col += 4 - ((rows + 4) % 8);
        }
        if col < 0 {
            col += cols;
            row += 4 - ((cols + 4) % 8);
        }
        let value = self.codewords.get(pos).copied().unwrap_or(0);
        let dark = value & (1 << (8 - bit)) != 0;
        self.set_bit(col as usize, row as usize, dark);
    }

    fn utah(&mut self, row: isize, col: isize, pos: usize) {
        const SHAPE: [(isize, isize); 8] = [(-2, -2), (-2, -1), (-1, -2), (-1, -1), (-1, 0), (0, -2), (0, -1), (0, 0)];
        for (bit, (dr, dc)) in SHAPE.into_iter().enumerate() {
            self.module(row + dr, col + dc, pos, bit as u8 + 1);
        }
    }

    fn corner(&mut self, cells: [(isize, isize); 8], pos: usize) {
        for (bit, (row, col)) in cells.into_iter().enumerate() {
            self.module(row, col, pos, bit as u8 + 1);
        }
    }

    fn corner1(&mut self, pos: usize) {
        let (r, c) = (self.num_rows as isize, self.num_cols as isize);
        self.corner([(r - 1, 0), (r - 1, 1), (r - 1, 2), (0, c - 2), (0, c - 1), (1, c - 1), (2, c - 1), (3, c - 1)], pos);
    }

    fn corner2(&mut self, pos: usize) {
        let (r, c) = (self.num_rows as isize, self.num_cols as isize);
        self.corner([(r - 3, 0), (r - 2, 0), (r - 1, 0), (0, c - 4), (0, c - 3), (0, c - 2), (0, c - 1), (1, c - 1)], pos);
    }

    fn corner3(&mut self, pos: usize) {
        let (r, c) = (self.num_rows as isize, self.num_cols as isize);
        self.corner([(r - 3, 0), (r - 2, 0), (r - 1, 0), (0, c - 2), (0, c - 1), (1, c - 1), (2, c - 1), (3, c - 1)], pos);
    }

    fn corner4(&mut self, pos: usize) {
        let (r, c) = (self.num_rows as isize, self.num_cols as isize);
        self.corner([(r - 1, 0), (r - 1, c - 1), (0, c - 3), (0, c - 2), (0, c - 1), (1, c - 3), (1, c - 2), (1, c - 1)], pos);
    }
}
