//! # symbology
//!
//! Barcode encoding engine. Each symbology turns a message into a stream of
//! drawing [Event]s which a [ClassicLogicHandler] (linear symbols) or a
//! [TwoDimLogicHandler] (PDF417, Data Matrix) consumes; nothing here draws
//! pixels on its own except the optional [canvas] handler.
//!
//! ```
//! use symbology::{logic::ModuleGrid, Generator, Symbology};
//!
//! let generator = Generator::from_symbology("code128".parse().unwrap()).unwrap();
//! let mut grid = ModuleGrid::new();
//! generator.generate_barcode(&mut grid, "123").unwrap();
//! assert_eq!(grid.width(), 68);
//! assert_eq!("ean-128".parse::<Symbology>().unwrap(), Symbology::Gs1128);
//! ```

#[cfg(feature = "embedded-graphics")]
pub mod canvas;
pub mod checksum;
pub mod code128;
pub mod datamatrix;
pub mod dimension;
mod error;
pub mod linear;
pub mod logic;
pub mod params;
pub mod pdf417;

use core::{fmt, str::FromStr};

use code128::{Code128, Code128Config, Gs1128, Gs1Config};
use datamatrix::{DataMatrix, DataMatrixConfig};
use linear::{
    codabar::{Codabar, CodabarConfig},
    code39::{Code39, Code39Config},
    interleaved::{Interleaved2Of5, Interleaved2Of5Config, Itf14, Itf14Config},
    postal::PostalConfig,
    postnet::Postnet,
    royal_mail::RoyalMailCbc,
    upcean::{UpcEan, UpcEanConfig, UpcEanVariant},
    usps4cb::Usps4Cb,
};
use pdf417::{Pdf417, Pdf417Config};

pub use dimension::{BarcodeDimension, Orientation};
pub use error::{Error, Result};
pub use logic::{BarGroup, ClassicLogicHandler, Event, TwoDimLogicHandler};
pub use params::{BarcodeParams, ChecksumMode, CommonParams, HumanReadablePlacement};

/// Every supported symbology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbology {
    Codabar,
    Code39,
    Code128,
    Gs1128,
    UpcA,
    UpcE,
    Ean13,
    Ean8,
    Interleaved2Of5,
    Itf14,
    Postnet,
    Usps4Cb,
    RoyalMailCbc,
    Pdf417,
    DataMatrix,
}

impl Symbology {
    pub const ALL: [Symbology; 15] = [
        Self::Codabar, Self::Code39, Self::Code128, Self::Gs1128, Self::UpcA, Self::UpcE, Self::Ean13,
        Self::Ean8, Self::Interleaved2Of5, Self::Itf14, Self::Postnet, Self::Usps4Cb, Self::RoyalMailCbc,
        Self::Pdf417, Self::DataMatrix,
    ];

    /// Canonical short name, as accepted by [FromStr].
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Codabar => "codabar",
            Self::Code39 => "code39",
            Self::Code128 => "code128",
            Self::Gs1128 => "gs1-128",
            Self::UpcA => "upc-a",
            Self::UpcE => "upc-e",
            Self::Ean13 => "ean-13",
            Self::Ean8 => "ean-8",
            Self::Interleaved2Of5 => "intl2of5",
            Self::Itf14 => "itf-14",
            Self::Postnet => "postnet",
            Self::Usps4Cb => "usps4cb",
            Self::RoyalMailCbc => "royal-mail-cbc",
            Self::Pdf417 => "pdf417",
            Self::DataMatrix => "datamatrix",
        }
    }

    pub const fn is_two_dimensional(&self) -> bool {
        matches!(self, Self::Pdf417 | Self::DataMatrix)
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Symbology {
    type Err = Error;

    /// Case-insensitive. `ean-128` is an alias of `gs1-128`.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        if name == "ean-128" {
            return Ok(Self::Gs1128);
        }
        Self::ALL.into_iter().find(|sym| sym.name() == name).ok_or(Error::UnknownSymbology)
    }
}

/// A configured generator of any symbology.
#[derive(Debug, Clone, PartialEq)]
pub enum Generator {
    Codabar(Codabar),
    Code39(Code39),
    Code128(Code128),
    Gs1128(Gs1128),
    UpcEan(UpcEan),
    Interleaved2Of5(Interleaved2Of5),
    Itf14(Itf14),
    Postnet(Postnet),
    Usps4Cb(Usps4Cb),
    RoyalMailCbc(RoyalMailCbc),
    Pdf417(Pdf417),
    DataMatrix(DataMatrix),
}

impl Generator {
    /// Generator with the default configuration of `symbology`.
    pub fn from_symbology(symbology: Symbology) -> Result<Self> {
        let upc_ean = |variant| UpcEan::new(variant, UpcEanConfig::default()).map(Self::UpcEan);
        match symbology {
            Symbology::Codabar => Codabar::new(CodabarConfig::default()).map(Self::Codabar),
            Symbology::Code39 => Code39::new(Code39Config::default()).map(Self::Code39),
            Symbology::Code128 => Code128::new(Code128Config::default()).map(Self::Code128),
            Symbology::Gs1128 => Gs1128::new(Gs1Config::default()).map(Self::Gs1128),
            Symbology::UpcA => upc_ean(UpcEanVariant::UpcA),
            Symbology::UpcE => upc_ean(UpcEanVariant::UpcE),
            Symbology::Ean13 => upc_ean(UpcEanVariant::Ean13),
            Symbology::Ean8 => upc_ean(UpcEanVariant::Ean8),
            Symbology::Interleaved2Of5 => Interleaved2Of5::new(Interleaved2Of5Config::default()).map(Self::Interleaved2Of5),
            Symbology::Itf14 => Itf14::new(Itf14Config::default()).map(Self::Itf14),
            Symbology::Postnet => Postnet::new(PostalConfig::postnet()).map(Self::Postnet),
            Symbology::Usps4Cb => Usps4Cb::new(PostalConfig::usps4cb()).map(Self::Usps4Cb),
            Symbology::RoyalMailCbc => RoyalMailCbc::new(PostalConfig::royal_mail()).map(Self::RoyalMailCbc),
            Symbology::Pdf417 => Pdf417::new(Pdf417Config::default()).map(Self::Pdf417),
            Symbology::DataMatrix => DataMatrix::new(DataMatrixConfig::default()).map(Self::DataMatrix),
        }
    }

    pub fn is_two_dimensional(&self) -> bool {
        matches!(self, Self::Pdf417(_) | Self::DataMatrix(_))
    }

    pub fn calc_dimensions(&self, msg: &str) -> Result<BarcodeDimension> {
        match self {
            Self::Codabar(g) => g.calc_dimensions(msg),
            Self::Code39(g) => g.calc_dimensions(msg),
            Self::Code128(g) => g.calc_dimensions(msg),
            Self::Gs1128(g) => g.calc_dimensions(msg),
            Self::UpcEan(g) => g.calc_dimensions(msg),
            Self::Interleaved2Of5(g) => g.calc_dimensions(msg),
            Self::Itf14(g) => g.calc_dimensions(msg),
            Self::Postnet(g) => g.calc_dimensions(msg),
            Self::Usps4Cb(g) => g.calc_dimensions(msg),
            Self::RoyalMailCbc(g) => g.calc_dimensions(msg),
            Self::Pdf417(g) => g.calc_dimensions(msg),
            Self::DataMatrix(g) => g.calc_dimensions(msg),
        }
    }

    /// The whole event stream of `msg`.
    pub fn events(&self, msg: &str) -> Result<Vec<Event>> {
        Ok(match self {
            Self::Codabar(g) => g.events(msg)?.collect(),
            Self::Code39(g) => g.events(msg)?.collect(),
            Self::Code128(g) => g.events(msg)?.collect(),
            Self::Gs1128(g) => g.events(msg)?.collect(),
            Self::UpcEan(g) => g.events(msg)?.collect(),
            Self::Interleaved2Of5(g) => g.events(msg)?.collect(),
            Self::Itf14(g) => g.events(msg)?.collect(),
            Self::Postnet(g) => g.events(msg)?.collect(),
            Self::Usps4Cb(g) => g.events(msg)?.collect(),
            Self::RoyalMailCbc(g) => g.events(msg)?.collect(),
            Self::Pdf417(g) => g.events(msg)?.collect(),
            Self::DataMatrix(g) => g.events(msg)?.collect(),
        })
    }

    /// Drives `handler` with the symbol of `msg`. Nothing is emitted when
    /// the message is rejected.
    pub fn generate_barcode<H: TwoDimLogicHandler + ?Sized>(&self, handler: &mut H, msg: &str) -> Result<()> {
        logic::emit_2d(handler, self.events(msg)?);
        Ok(())
    }

    /// Same as [Generator::generate_barcode] for a handler without row
    /// support, which only linear symbologies can drive.
    pub fn generate_classic<H: ClassicLogicHandler + ?Sized>(&self, handler: &mut H, msg: &str) -> Result<()> {
        if self.is_two_dimensional() {
            return Err(Error::UnsupportedOperation("2-D symbols need a TwoDimLogicHandler".into()));
        }
        logic::emit(handler, self.events(msg)?);
        Ok(())
    }
}

impl TryFrom<Symbology> for Generator {
    type Error = Error;

    fn try_from(symbology: Symbology) -> Result<Self> {
        Self::from_symbology(symbology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::is_well_nested;

    #[test]
    fn test_names_round_trip() {
        for sym in Symbology::ALL {
            assert_eq!(sym.name().parse::<Symbology>().unwrap(), sym);
        }
        assert_eq!("EAN-128".parse::<Symbology>().unwrap(), Symbology::Gs1128);
        assert_eq!(" PDF417 ".parse::<Symbology>().unwrap(), Symbology::Pdf417);
    }

    #[test]
    fn test_unknown_name() {
        let err = "qr".parse::<Symbology>().unwrap_err();
        assert_eq!(err, Error::UnknownSymbology);
        assert_eq!(err.to_string(), "No known barcode configuration element found");
    }

    #[test]
    fn test_every_default_generator() {
        let samples = [
            (Symbology::Codabar, "A40156B"),
            (Symbology::Code39, "CODE39"),
            (Symbology::Code128, "Hello 123"),
            (Symbology::Gs1128, "(01)09501101530003"),
            (Symbology::UpcA, "01234567890"),
            (Symbology::UpcE, "0123456"),
            (Symbology::Ean13, "400638133393"),
            (Symbology::Ean8, "9638507"),
            (Symbology::Interleaved2Of5, "123456"),
            (Symbology::Itf14, "1540014128876"),
            (Symbology::Postnet, "12345"),
            (Symbology::Usps4Cb, "01234567094987654321"),
            (Symbology::RoyalMailCbc, "SN34RD1A"),
            (Symbology::Pdf417, "PDF417"),
            (Symbology::DataMatrix, "123456"),
        ];
        for (sym, msg) in samples {
            let generator = Generator::try_from(sym).unwrap();
            assert_eq!(generator.is_two_dimensional(), sym.is_two_dimensional());
            let events = generator.events(msg).unwrap();
            assert!(is_well_nested(&events), "{sym}");
            let dim = generator.calc_dimensions(msg).unwrap();
            assert!(dim.width_plus_quiet() >= dim.width(), "{sym}");
        }
    }

    #[test]
    fn test_classic_handler_rejects_2d() {
        let mut events: Vec<Event> = Vec::new();
        let dm = Generator::from_symbology(Symbology::DataMatrix).unwrap();
        assert!(matches!(dm.generate_classic(&mut events, "123456"), Err(Error::UnsupportedOperation(_))));
        assert!(events.is_empty());

        let code39 = Generator::from_symbology(Symbology::Code39).unwrap();
        assert!(code39.generate_classic(&mut events, "*").is_err());
        assert!(events.is_empty());
        code39.generate_classic(&mut events, "A").unwrap();
        assert!(is_well_nested(&events));
    }
}
