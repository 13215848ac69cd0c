//! Configuration shared by every symbology.

use crate::{dimension::BarcodeDimension, Error, Result};

/// Millimetres per typographic point.
pub const MM_PER_POINT: f64 = 25.4 / 72.0;

/// How a symbology treats its check character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ChecksumMode {
    /// Leave the message as it is.
    Ignore,
    /// Symbology specific: check the character when the message carries
    /// one, add it when the length shows it is missing, otherwise ignore.
    #[default]
    AutoIgnoreIfAbsent,
    /// Compute and append the check character.
    Add,
    /// The last character is a check character and must be valid.
    Check,
}

/// Where the human-readable text goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum HumanReadablePlacement {
    None,
    Top,
    #[default]
    Bottom,
}

/// Settings every symbology has. Lengths are in millimetres.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CommonParams {
    /// Width of the narrowest bar or space.
    pub module_width: f64,
    pub bar_height: f64,
    /// Horizontal quiet zone on each side, `None` to disable quiet zones.
    pub quiet_zone: Option<f64>,
    /// Vertical quiet zone, defaults to the horizontal one.
    pub vertical_quiet_zone: Option<f64>,
    pub human_readable: HumanReadablePlacement,
    pub font_name: String,
    pub font_size: f64,
    /// Gap between the bars and the text.
    pub text_spacing: f64,
    /// Formatting pattern for the human-readable text, see [format_human_readable].
    pub pattern: Option<String>,
}

impl CommonParams {
    /// Defaults for a given module width: bars of 15 mm, a quiet zone of ten
    /// modules and 8 pt text under the bars.
    pub fn with_module_width(module_width: f64) -> Self {
        Self {
            module_width,
            bar_height: 15.0,
            quiet_zone: Some(10.0 * module_width),
            vertical_quiet_zone: None,
            human_readable: HumanReadablePlacement::Bottom,
            font_name: "Helvetica".into(),
            font_size: 8.0 * MM_PER_POINT,
            text_spacing: 0.5,
            pattern: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.module_width > 0.0) {
            return Err(Error::config("module width must be positive"));
        }
        if !(self.bar_height > 0.0) {
            return Err(Error::config("bar height must be positive"));
        }
        if self.quiet_zone.is_some_and(|qz| qz < 0.0) || self.vertical_quiet_zone.is_some_and(|qz| qz < 0.0) {
            return Err(Error::config("quiet zone must not be negative"));
        }
        if self.font_size < 0.0 || self.text_spacing < 0.0 {
            return Err(Error::config("font size and text spacing must not be negative"));
        }
        Ok(())
    }

    pub fn quiet_zone_h(&self) -> f64 {
        self.quiet_zone.unwrap_or(0.0)
    }

    pub fn quiet_zone_v(&self) -> f64 {
        match self.quiet_zone {
            Some(qz) => self.vertical_quiet_zone.unwrap_or(qz),
            None => 0.0,
        }
    }

    /// Height taken by the human-readable text, zero when it is not shown.
    pub fn human_readable_height(&self) -> f64 {
        match self.human_readable {
            HumanReadablePlacement::None => 0.0,
            _ => self.font_size + self.text_spacing,
        }
    }
}

impl Default for CommonParams {
    fn default() -> Self {
        Self::with_module_width(0.21)
    }
}

/// Access to the shared settings of a symbology configuration, and the way
/// its bar weights map to physical widths.
pub trait BarcodeParams {
    fn common(&self) -> &CommonParams;
    fn common_mut(&mut self) -> &mut CommonParams;

    /// Physical width of a bar of the given weight. Symbologies with wide
    /// bars override this.
    fn bar_width(&self, weight: u8) -> f64 {
        weight as f64 * self.common().module_width
    }

    fn validate(&self) -> Result<()> {
        self.common().validate()
    }

    fn module_width(&self) -> f64 {
        self.common().module_width
    }

    fn with_module_width(mut self, module_width: f64) -> Result<Self>
    where
        Self: Sized,
    {
        self.common_mut().module_width = module_width;
        self.validate()?;
        Ok(self)
    }

    fn with_bar_height(mut self, bar_height: f64) -> Result<Self>
    where
        Self: Sized,
    {
        self.common_mut().bar_height = bar_height;
        self.validate()?;
        Ok(self)
    }

    fn with_quiet_zone(mut self, quiet_zone: Option<f64>) -> Result<Self>
    where
        Self: Sized,
    {
        self.common_mut().quiet_zone = quiet_zone;
        self.validate()?;
        Ok(self)
    }

    fn with_human_readable(mut self, placement: HumanReadablePlacement) -> Self
    where
        Self: Sized,
    {
        self.common_mut().human_readable = placement;
        self
    }

    fn with_pattern(mut self, pattern: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.common_mut().pattern = Some(pattern.into());
        self
    }
}

/// Dimensions of a linear symbol whose bars measure `width` in total.
pub(crate) fn linear_dimensions<P: BarcodeParams + ?Sized>(params: &P, width: f64) -> BarcodeDimension {
    let common = params.common();
    let height = common.bar_height + common.human_readable_height();
    BarcodeDimension::new(width, height, common.quiet_zone_h(), common.quiet_zone_v())
}

/// Applies a human-readable formatting pattern: `_` takes the next message
/// character, `#` drops it, `\` makes the next pattern character literal and
/// any other character is copied. Message characters left over when the
/// pattern ends are appended.
pub fn format_human_readable(text: &str, pattern: Option<&str>) -> String {
    let Some(pattern) = pattern.filter(|p| !p.is_empty()) else { return text.to_owned() };

    let mut source = text.chars();
    let mut out = String::with_capacity(text.len() + pattern.len());
    let mut pat = pattern.chars();
    while let Some(c) = pat.next() {
        match c {
            '_' => out.extend(source.next()),
            '#' => { source.next(); },
            '\\' => out.extend(pat.next()),
            c => out.push(c),
        }
    }
    out.extend(source);
    out
}

/// Checks a wide to narrow ratio.
pub(crate) fn check_wide_factor(factor: f64) -> Result<()> {
    if factor > 1.0 {
        Ok(())
    } else {
        Err(Error::config(format!("wide factor must be greater than 1.0, got {factor}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern() {
        assert_eq!(format_human_readable("0123456789", Some("___-___-____")), "012-345-6789");
        assert_eq!(format_human_readable("12345", Some("\\__#__")), "_1345");
        assert_eq!(format_human_readable("ABC", None), "ABC");
        assert_eq!(format_human_readable("ABCDE", Some("(__)")), "(AB)CDE");
    }

    #[test]
    fn test_quiet_zones() {
        let mut common = CommonParams::with_module_width(0.2);
        assert_eq!(common.quiet_zone_h(), 2.0);
        assert_eq!(common.quiet_zone_v(), 2.0);
        common.vertical_quiet_zone = Some(1.0);
        assert_eq!(common.quiet_zone_v(), 1.0);
        common.quiet_zone = None;
        assert_eq!(common.quiet_zone_v(), 0.0);
    }

    #[test]
    fn test_validate() {
        let mut common = CommonParams::default();
        assert!(common.validate().is_ok());
        common.module_width = 0.0;
        assert!(matches!(common.validate(), Err(Error::InvalidConfiguration(_))));
        assert!(check_wide_factor(1.0).is_err());
        assert!(check_wide_factor(2.5).is_ok());
    }
}
