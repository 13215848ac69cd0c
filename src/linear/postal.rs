//! Settings shared by the height-modulated postal codes.
//!
//! Every bar is `module_width` wide and every space `intercharacter_gap`
//! wide. Bar weights only select a height: see [PostalConfig::bar_span]
//! and [PostalConfig::four_state_span].

use crate::{
    params::{BarcodeParams, ChecksumMode, CommonParams, HumanReadablePlacement},
    Error, Result,
};

/// Weight of a full-height bar.
pub const FULL: u8 = 4;
/// Weight of a short bar: POSTNET half bar, 4-state tracker.
pub const SHORT: u8 = 1;
pub const ASCENDER: u8 = 2;
pub const DESCENDER: u8 = 3;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PostalConfig {
    /// `bar_height` is the height of a full bar.
    pub common: CommonParams,
    /// Width of the space between two bars.
    pub intercharacter_gap: f64,
    /// Height of a POSTNET half bar or of a 4-state tracker.
    pub short_bar_height: f64,
    pub checksum: ChecksumMode,
    pub display_checksum: bool,
}

impl PostalConfig {
    /// POSTNET defaults: bars of 0.02" on a 0.025" gap, 0.125" and 0.05"
    /// high.
    pub fn postnet() -> Self {
        let mut common = CommonParams::with_module_width(0.508);
        common.bar_height = 3.175;
        common.quiet_zone = Some(3.175);
        Self {
            common,
            intercharacter_gap: 0.635,
            short_bar_height: 1.27,
            checksum: ChecksumMode::AutoIgnoreIfAbsent,
            display_checksum: false,
        }
    }

    /// USPS Intelligent Mail defaults.
    pub fn usps4cb() -> Self {
        let mut common = CommonParams::with_module_width(0.508);
        common.bar_height = 3.683;
        common.quiet_zone = Some(3.175);
        Self {
            common,
            intercharacter_gap: 0.635,
            short_bar_height: 1.143,
            checksum: ChecksumMode::Ignore,
            display_checksum: false,
        }
    }

    /// Royal Mail CBC defaults.
    pub fn royal_mail() -> Self {
        let mut common = CommonParams::with_module_width(0.53);
        common.bar_height = 5.22;
        common.quiet_zone = Some(2.0);
        common.human_readable = HumanReadablePlacement::None;
        Self {
            common,
            intercharacter_gap: 0.75,
            short_bar_height: 1.6,
            checksum: ChecksumMode::Add,
            display_checksum: false,
        }
    }

    pub fn with_intercharacter_gap(mut self, gap: f64) -> Result<Self> {
        self.intercharacter_gap = gap;
        self.validate()?;
        Ok(self)
    }

    pub fn with_short_bar_height(mut self, height: f64) -> Result<Self> {
        self.short_bar_height = height;
        self.validate()?;
        Ok(self)
    }

    pub fn with_checksum(mut self, checksum: ChecksumMode) -> Self {
        self.checksum = checksum;
        self
    }

    /// Width of a bar (`black`) or of the space between two bars.
    pub fn element_width(&self, black: bool) -> f64 {
        if black { self.common.module_width } else { self.intercharacter_gap }
    }

    /// Width of `bars` bars and the spaces between them.
    pub(crate) fn run_width(&self, bars: usize) -> f64 {
        bars as f64 * self.common.module_width + bars.saturating_sub(1) as f64 * self.intercharacter_gap
    }

    /// Offset from the top of the bar area and height of a POSTNET bar.
    /// Half bars stand on the baseline.
    pub fn bar_span(&self, weight: u8) -> (f64, f64) {
        let full = self.common.bar_height;
        match weight {
            FULL => (0.0, full),
            _ => (full - self.short_bar_height, self.short_bar_height),
        }
    }

    /// Offset from the top of the bar area and height of a 4-state bar.
    /// The tracker is centred, ascenders and descenders extend it to the
    /// top or the bottom.
    pub fn four_state_span(&self, weight: u8) -> (f64, f64) {
        let full = self.common.bar_height;
        let tracker_top = (full - self.short_bar_height) / 2.0;
        let tracker_bottom = tracker_top + self.short_bar_height;
        match weight {
            ASCENDER => (0.0, tracker_bottom),
            DESCENDER => (tracker_top, full - tracker_top),
            FULL => (0.0, full),
            _ => (tracker_top, self.short_bar_height),
        }
    }
}

impl Default for PostalConfig {
    fn default() -> Self {
        Self::postnet()
    }
}

impl BarcodeParams for PostalConfig {
    fn common(&self) -> &CommonParams {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonParams {
        &mut self.common
    }

    /// Bars all have the module width; use [PostalConfig::element_width]
    /// for spaces.
    fn bar_width(&self, _weight: u8) -> f64 {
        self.common.module_width
    }

    fn validate(&self) -> Result<()> {
        self.common.validate()?;
        if !(self.intercharacter_gap > 0.0) {
            return Err(Error::config("intercharacter gap must be positive"));
        }
        if !(self.short_bar_height > 0.0 && self.short_bar_height < self.common.bar_height) {
            return Err(Error::config("short bars must be positive and lower than full bars"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        for config in [PostalConfig::postnet(), PostalConfig::usps4cb(), PostalConfig::royal_mail()] {
            assert!(config.validate().is_ok());
        }
        assert!(PostalConfig::postnet().with_short_bar_height(5.0).is_err());
        assert!(PostalConfig::postnet().with_intercharacter_gap(0.0).is_err());
    }

    #[test]
    fn test_spans() {
        let config = PostalConfig::usps4cb();
        let full = config.common.bar_height;
        let (top, height) = config.four_state_span(SHORT);
        assert!((top * 2.0 + height - full).abs() < 1e-9);
        let (asc_top, asc_height) = config.four_state_span(ASCENDER);
        let (desc_top, desc_height) = config.four_state_span(DESCENDER);
        assert_eq!(asc_top, 0.0);
        assert!((asc_height - (top + height)).abs() < 1e-9);
        assert!((desc_top + desc_height - full).abs() < 1e-9);

        let postnet = PostalConfig::postnet();
        let (top, height) = postnet.bar_span(SHORT);
        assert!((top + height - postnet.common.bar_height).abs() < 1e-9);
    }

    #[test]
    fn test_run_width() {
        let config = PostalConfig::postnet();
        assert!((config.run_width(2) - (2.0 * 0.508 + 0.635)).abs() < 1e-9);
        assert_eq!(config.run_width(0), 0.0);
    }
}
