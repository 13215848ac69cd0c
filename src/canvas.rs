//! Raster output on an [embedded_graphics] [DrawTarget].
//!
//! Bar widths are taken as module counts, which suits Code 128, UPC/EAN,
//! PDF417 and Data Matrix. Each module is `scale.0` pixels wide; a linear
//! symbol is `scale.1` pixels high and so is each row of a 2-D symbol.

use embedded_graphics::{
    draw_target::DrawTarget,
    prelude::{Point, Size},
    primitives::Rectangle,
};

use crate::logic::{BarGroup, ClassicLogicHandler, TwoDimLogicHandler};

pub struct DrawTargetHandler<'a, D: DrawTarget> {
    target: &'a mut D,
    on: D::Color,
    off: Option<D::Color>,
    origin: Point,
    scale: (u32, u32),
    cursor: Point,
    rows: u32,
    error: Option<D::Error>,
}

impl<'a, D: DrawTarget> DrawTargetHandler<'a, D> {
    /// Draws dark modules with `on`. Light modules are left untouched.
    pub fn new(target: &'a mut D, on: D::Color, origin: Point, scale: (u32, u32)) -> Self {
        Self { target, on, off: None, origin, scale, cursor: origin, rows: 0, error: None }
    }

    /// Also paints light modules.
    pub fn with_background(mut self, off: D::Color) -> Self {
        self.off = Some(off);
        self
    }

    /// First error reported by the draw target, if any.
    pub fn finish(self) -> Result<(), D::Error> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fill(&mut self, width: u32, color: D::Color) {
        if self.error.is_some() {
            return;
        }
        let area = Rectangle::new(self.cursor, Size::new(width, self.scale.1));
        if let Err(err) = self.target.fill_solid(&area, color) {
            self.error = Some(err);
        }
    }
}

impl<D: DrawTarget> ClassicLogicHandler for DrawTargetHandler<'_, D> {
    fn start_barcode(&mut self, _message: &str, _human_readable: &str) {
        self.cursor = self.origin;
        self.rows = 0;
    }

    fn start_bar_group(&mut self, _group: BarGroup, _label: Option<&str>) {}

    fn add_bar(&mut self, black: bool, width: u8) {
        let pixels = width as u32 * self.scale.0;
        match (black, self.off) {
            (true, _) => self.fill(pixels, self.on),
            (false, Some(off)) => self.fill(pixels, off),
            (false, None) => (),
        }
        self.cursor.x += pixels as i32;
    }

    fn end_bar_group(&mut self) {}

    fn end_barcode(&mut self) {}
}

impl<D: DrawTarget> TwoDimLogicHandler for DrawTargetHandler<'_, D> {
    fn start_row(&mut self) {
        self.cursor = self.origin + Point::new(0, (self.rows * self.scale.1) as i32);
    }

    fn end_row(&mut self) {
        self.rows += 1;
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

    use super::*;
    use crate::{
        code128::{Code128, Code128Config},
        datamatrix::{DataMatrix, DataMatrixConfig},
        logic::ModuleGrid,
    };

    struct Framebuffer {
        size: Size,
        pixels: Vec<bool>,
    }

    impl Framebuffer {
        fn new(width: u32, height: u32) -> Self {
            Self { size: Size::new(width, height), pixels: vec![false; (width * height) as usize] }
        }

        fn get(&self, x: u32, y: u32) -> bool {
            self.pixels[(y * self.size.width + x) as usize]
        }
    }

    impl OriginDimensions for Framebuffer {
        fn size(&self) -> Size {
            self.size
        }
    }

    impl DrawTarget for Framebuffer {
        type Color = BinaryColor;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                if self.bounding_box().contains(point) {
                    let index = (point.y as u32 * self.size.width + point.x as u32) as usize;
                    self.pixels[index] = color.is_on();
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_linear() {
        let code128 = Code128::new(Code128Config::default()).unwrap();
        let mut fb = Framebuffer::new(68 * 2, 10);
        let mut handler = DrawTargetHandler::new(&mut fb, BinaryColor::On, Point::zero(), (2, 10));
        code128.generate_barcode(&mut handler, "123").unwrap();
        handler.finish().unwrap();

        let mut grid = ModuleGrid::new();
        code128.generate_barcode(&mut grid, "123").unwrap();
        for x in 0..68 * 2 {
            assert_eq!(fb.get(x, 0), grid.get(x as usize / 2, 0), "x = {x}");
            assert_eq!(fb.get(x, 9), fb.get(x, 0));
        }
    }

    #[test]
    fn test_two_dim() {
        let dm = DataMatrix::new(DataMatrixConfig::default()).unwrap();
        let symbol = dm.encode("123456").unwrap();
        let mut fb = Framebuffer::new(12, 12);
        let mut handler = DrawTargetHandler::new(&mut fb, BinaryColor::On, Point::new(1, 1), (1, 1))
            .with_background(BinaryColor::Off);
        dm.generate_barcode(&mut handler, "123456").unwrap();
        handler.finish().unwrap();

        for (y, row) in symbol.module_rows().iter().enumerate() {
            for (x, &module) in row.iter().enumerate() {
                assert_eq!(fb.get(x as u32 + 1, y as u32 + 1), module);
            }
        }
        assert!(!fb.get(0, 0) && !fb.get(11, 11));
    }
}
