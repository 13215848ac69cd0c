//! GS1-128: Code 128 carrying GS1 Application Identifier data.
//!
//! Messages come in two forms:
//!
//! - bracketed, `(01)0950110153000#(10)ABC`,
//! - raw, `010950110153000#10ABC`, where a variable length field is ended
//!   by the group separator (FNC1 by default) unless it is the last one.
//!
//! A check digit may be given as the marker character (`#` by default) to
//! have it computed.

use log::debug;

use super::{
    ai::{self, AiSpec, AiTrie, Charset},
    encoder::{self, FNC1},
    finish, symbol_events, symbol_modules,
};
use crate::{
    checksum,
    dimension::BarcodeDimension,
    logic::{self, ClassicLogicHandler, Event},
    params::{self, BarcodeParams, CommonParams},
    Error, Result,
};

/// One AI and its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub ai: String,
    pub data: String,
}

impl Field {
    /// Whether the field length is fixed by its AI, so that no FNC1 has to
    /// follow it.
    pub fn is_predefined_length(&self) -> bool {
        ai::is_predefined_length(&self.ai)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Gs1Config {
    pub common: CommonParams,
    /// Ends variable length fields in the raw form.
    pub group_separator: char,
    /// Stands for a check digit to compute.
    pub check_digit_marker: char,
}

impl Default for Gs1Config {
    fn default() -> Self {
        Self {
            common: CommonParams::with_module_width(0.21),
            group_separator: FNC1,
            check_digit_marker: '#',
        }
    }
}

impl BarcodeParams for Gs1Config {
    fn common(&self) -> &CommonParams {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonParams {
        &mut self.common
    }

    fn validate(&self) -> Result<()> {
        self.common.validate()?;
        let (sep, marker) = (self.group_separator, self.check_digit_marker);
        if sep == marker || sep.is_ascii_alphanumeric() || marker.is_ascii_alphanumeric() {
            return Err(Error::config("GS1 group separator and check digit marker must be distinct non-alphanumeric characters"));
        }
        Ok(())
    }
}

impl Gs1Config {
    pub fn with_group_separator(mut self, separator: char) -> Result<Self> {
        self.group_separator = separator;
        self.validate()?;
        Ok(self)
    }

    pub fn with_check_digit_marker(mut self, marker: char) -> Result<Self> {
        self.check_digit_marker = marker;
        self.validate()?;
        Ok(self)
    }
}

/// Checks a YYMMDD date. A day of 00 stands for the end of the month.
fn check_date(ai: &str, data: &str) -> Result<()> {
    let month: u8 = data[2..4].parse().unwrap_or(0);
    let day: u8 = data[4..6].parse().unwrap_or(99);
    if !(1..=12).contains(&month) || day > 31 {
        return Err(Error::message(format!("invalid date '{data}' for AI ({ai})")));
    }
    Ok(())
}

/// Validates the data of one field, computing a check digit given as the
/// marker.
fn complete_field(ai: &str, spec: &AiSpec, data: &str, marker: char) -> Result<Field> {
    let mut data = data.to_owned();
    if spec.check_digit && data.ends_with(marker) {
        data.pop();
        if !data.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::message(format!("AI ({ai}) only accepts digits")));
        }
        data.push(checksum::mod10_char(&data));
    }

    let len = data.chars().count();
    if len < spec.min as usize || len > spec.max as usize {
        let expected = if spec.is_fixed() { spec.max.to_string() } else { format!("{} to {}", spec.min, spec.max) };
        return Err(Error::message(format!("AI ({ai}) takes {expected} characters, got {len}")));
    }
    if let Some(c) = data.chars().find(|&c| !spec.charset.accepts(c)) {
        let what = match spec.charset {
            Charset::Numeric => "digits",
            Charset::Alphanumeric => "GS1 character set 82",
        };
        return Err(Error::message(format!("AI ({ai}) only accepts {what}, found '{c}'")));
    }
    if spec.check_digit && !checksum::validate_mod10(&data) {
        return Err(Error::message(format!("wrong check digit in AI ({ai}) data '{data}'")));
    }
    if spec.date {
        check_date(ai, &data)?;
    }
    Ok(Field { ai: ai.to_owned(), data })
}

fn parse_bracketed(msg: &str, trie: &AiTrie, marker: char) -> Result<Vec<Field>> {
    let mut fields = Vec::new();
    let mut rest = msg;
    while !rest.is_empty() {
        let body = rest.strip_prefix('(').ok_or_else(|| Error::message(format!("expected '(' at '{rest}'")))?;
        let (ai, after) = body.split_once(')').ok_or_else(|| Error::message("unclosed AI bracket"))?;
        let spec = trie.get(ai).ok_or_else(|| Error::message(format!("unknown AI ({ai})")))?;
        let end = after.find('(').unwrap_or(after.len());
        fields.push(complete_field(ai, &spec, &after[..end], marker)?);
        rest = &after[end..];
    }
    Ok(fields)
}

fn parse_raw(msg: &str, trie: &AiTrie, separator: char, marker: char) -> Result<Vec<Field>> {
    let mut fields = Vec::new();
    let mut rest = msg;
    while !rest.is_empty() {
        let (ai, spec) = trie.longest_match(rest).ok_or_else(|| Error::message(format!("no known AI at '{rest}'")))?;
        let after = &rest[ai.len()..];
        let end = if spec.is_fixed() {
            after.char_indices().nth(spec.max as usize).map_or(after.len(), |(i, _)| i)
        } else {
            after.find(separator).unwrap_or(after.len())
        };
        fields.push(complete_field(ai, &spec, &after[..end], marker)?);
        rest = after[end..].strip_prefix(separator).unwrap_or(&after[end..]);
    }
    Ok(fields)
}

/// Splits a GS1 message into its fields.
pub fn parse(msg: &str, trie: &AiTrie, separator: char, marker: char) -> Result<Vec<Field>> {
    if msg.is_empty() {
        return Err(Error::message("GS1-128 message is empty"));
    }
    if msg.starts_with('(') {
        parse_bracketed(msg, trie, marker)
    } else {
        parse_raw(msg, trie, separator, marker)
    }
}

/// Code 128 message for the fields: a leading FNC1, and an FNC1 after each
/// variable length field but the last.
pub fn to_code128(fields: &[Field]) -> String {
    let mut out = String::from(FNC1);
    for (i, field) in fields.iter().enumerate() {
        out.push_str(&field.ai);
        out.push_str(&field.data);
        if i + 1 < fields.len() && !field.is_predefined_length() {
            out.push(FNC1);
        }
    }
    out
}

/// `(01)09501101530003(10)ABC`
pub fn human_readable(fields: &[Field]) -> String {
    fields.iter().map(|f| format!("({}){}", f.ai, f.data)).collect()
}

/// GS1-128 generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Gs1128 {
    config: Gs1Config,
}

impl Gs1128 {
    pub fn new(config: Gs1Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Gs1Config {
        &self.config
    }

    pub fn parse(&self, msg: &str) -> Result<Vec<Field>> {
        parse(msg, ai::standard(), self.config.group_separator, self.config.check_digit_marker)
    }

    /// Symbol values from the start code to the stop code, and the
    /// human-readable text.
    fn encode(&self, msg: &str) -> Result<(Vec<u8>, String)> {
        let fields = self.parse(msg)?;
        let values = finish(encoder::encode(&to_code128(&fields))?);
        debug!("GS1-128: {} fields in {} symbols", fields.len(), values.len());
        Ok((values, human_readable(&fields)))
    }

    pub fn calc_dimensions(&self, msg: &str) -> Result<BarcodeDimension> {
        let (values, _) = self.encode(msg)?;
        let width = symbol_modules(values.len()) as f64 * self.config.common.module_width;
        Ok(params::linear_dimensions(&self.config, width))
    }

    pub fn events(&self, msg: &str) -> Result<impl Iterator<Item = Event>> {
        let (values, text) = self.encode(msg)?;
        let hr = params::format_human_readable(&text, self.config.common.pattern.as_deref());
        Ok(logic::barcode(msg.to_owned(), hr, symbol_events(&values)))
    }

    pub fn generate_barcode<H: ClassicLogicHandler + ?Sized>(&self, handler: &mut H, msg: &str) -> Result<()> {
        logic::emit(handler, self.events(msg)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code128::encoder::{FNC1_VALUE, START_C};

    fn gs1() -> Gs1128 {
        Gs1128::new(Gs1Config::default()).unwrap()
    }

    #[test]
    fn test_bracketed_with_marker() {
        let fields = gs1().parse("(01)0950110153000#(10)ABC").unwrap();
        assert_eq!(fields, [
            Field { ai: "01".into(), data: "09501101530003".into() },
            Field { ai: "10".into(), data: "ABC".into() },
        ]);
        assert_eq!(human_readable(&fields), "(01)09501101530003(10)ABC");
        assert_eq!(to_code128(&fields), "\u{f1}010950110153000310ABC");
    }

    #[test]
    fn test_raw_form() {
        let fields = gs1().parse("10ABC\u{f1}0109501101530003").unwrap();
        assert_eq!(fields[0], Field { ai: "10".into(), data: "ABC".into() });
        assert_eq!(fields[1].ai, "01");
        // FNC1 after the variable length lot number only
        assert_eq!(to_code128(&fields), "\u{f1}10ABC\u{f1}0109501101530003");

        let fields = gs1().parse(concat!("0109501101530003", "3103000123", "21XYZ\u{f1}", "17250631")).unwrap();
        let ais: Vec<&str> = fields.iter().map(|f| f.ai.as_str()).collect();
        assert_eq!(ais, ["01", "3103", "21", "17"]);
    }

    #[test]
    fn test_custom_separator() {
        let gs1 = Gs1128::new(Gs1Config::default().with_group_separator('|').unwrap()).unwrap();
        let fields = gs1.parse("10ABC|11250101").unwrap();
        assert_eq!(fields[1], Field { ai: "11".into(), data: "250101".into() });
        assert!(Gs1Config::default().with_group_separator('#').is_err());
    }

    #[test]
    fn test_validation() {
        let gs1 = gs1();
        assert!(gs1.parse("(01)09501101530004").is_err());
        assert!(gs1.parse("(01)0950110153000").is_err());
        assert!(gs1.parse("(17)251301").is_err());
        assert!(gs1.parse("(17)250100").is_ok());
        assert!(gs1.parse("(10)AB#C").is_err());
        assert!(gs1.parse("(05)123").is_err());
        assert!(gs1.parse("(01").is_err());
        assert!(gs1.parse("").is_err());
        assert!(gs1.parse("(10)ABCDEFGHIJKLMNOPQRSTU").is_err());
    }

    #[test]
    fn test_symbol() {
        let gs1 = gs1();
        let (values, hr) = gs1.encode("(01)09501101530003").unwrap();
        assert_eq!(values[..3], [START_C, FNC1_VALUE, 1]);
        assert_eq!(hr, "(01)09501101530003");
        let events: Vec<Event> = gs1.events("(01)09501101530003").unwrap().collect();
        assert_eq!(events[0], Event::StartBarcode {
            message: "(01)09501101530003".into(),
            human_readable: "(01)09501101530003".into(),
        });
        assert!(gs1.calc_dimensions("(01)09501101530003").unwrap().width() > 0.0);
    }
}
