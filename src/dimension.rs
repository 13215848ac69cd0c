/// Rotation applied by a renderer, in degrees clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    /// Parses -270, -180, -90, 0, 90, 180 and 270.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    pub const fn is_sideways(&self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// Size of a symbol in millimetres, with and without its quiet zones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarcodeDimension {
    width: f64,
    height: f64,
    width_plus_quiet: f64,
    height_plus_quiet: f64,
    x_offset: f64,
    y_offset: f64,
}

impl BarcodeDimension {
    /// Creates a dimension from the bare symbol size and the quiet zones
    /// placed on each side horizontally (`qz_h`) and vertically (`qz_v`).
    pub fn new(width: f64, height: f64, qz_h: f64, qz_v: f64) -> Self {
        let (qz_h, qz_v) = (qz_h.max(0.0), qz_v.max(0.0));
        Self {
            width,
            height,
            width_plus_quiet: width + 2.0 * qz_h,
            height_plus_quiet: height + 2.0 * qz_v,
            x_offset: qz_h,
            y_offset: qz_v,
        }
    }

    #[inline]
    pub const fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub const fn width_plus_quiet(&self) -> f64 {
        self.width_plus_quiet
    }

    #[inline]
    pub const fn height_plus_quiet(&self) -> f64 {
        self.height_plus_quiet
    }

    /// Offset of the symbol from the left edge of the quiet zone.
    #[inline]
    pub const fn x_offset(&self) -> f64 {
        self.x_offset
    }

    #[inline]
    pub const fn y_offset(&self) -> f64 {
        self.y_offset
    }

    pub fn width_for(&self, orientation: Orientation) -> f64 {
        if orientation.is_sideways() { self.height } else { self.width }
    }

    pub fn height_for(&self, orientation: Orientation) -> f64 {
        if orientation.is_sideways() { self.width } else { self.height }
    }

    pub fn width_plus_quiet_for(&self, orientation: Orientation) -> f64 {
        if orientation.is_sideways() { self.height_plus_quiet } else { self.width_plus_quiet }
    }

    pub fn height_plus_quiet_for(&self, orientation: Orientation) -> f64 {
        if orientation.is_sideways() { self.width_plus_quiet } else { self.height_plus_quiet }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_swap() {
        let dim = BarcodeDimension::new(40.0, 15.0, 2.0, 1.0);
        assert_eq!(dim.width_plus_quiet(), 44.0);
        assert_eq!(dim.height_plus_quiet(), 17.0);
        assert_eq!(dim.width_for(Orientation::Deg90), 15.0);
        assert_eq!(dim.height_plus_quiet_for(Orientation::Deg270), 44.0);
        assert_eq!(dim.width_for(Orientation::Deg180), 40.0);
        assert_eq!((dim.x_offset(), dim.y_offset()), (2.0, 1.0));
    }

    #[test]
    fn test_orientation_degrees() {
        assert_eq!(Orientation::from_degrees(-90), Some(Orientation::Deg270));
        assert_eq!(Orientation::from_degrees(180), Some(Orientation::Deg180));
        assert_eq!(Orientation::from_degrees(45), None);
    }
}
