//! Event streams rendered as text, e.g.
//! `<BC><SBG:start-char:StartB>B2W1B1W2B1W4</SBG>...</BC>`.

use std::fmt::Write;

use symbology::{BarGroup, ClassicLogicHandler, Generator, Symbology, TwoDimLogicHandler};

#[derive(Default)]
struct Fixture(String);

impl ClassicLogicHandler for Fixture {
    fn start_barcode(&mut self, _message: &str, _human_readable: &str) {
        self.0.push_str("<BC>");
    }

    fn start_bar_group(&mut self, group: BarGroup, label: Option<&str>) {
        match label {
            Some(label) => write!(self.0, "<SBG:{}:{label}>", group.name()),
            None => write!(self.0, "<SBG:{}>", group.name()),
        }
        .unwrap();
    }

    fn add_bar(&mut self, black: bool, width: u8) {
        write!(self.0, "{}{width}", if black { 'B' } else { 'W' }).unwrap();
    }

    fn end_bar_group(&mut self) {
        self.0.push_str("</SBG>");
    }

    fn end_barcode(&mut self) {
        self.0.push_str("</BC>");
    }
}

impl TwoDimLogicHandler for Fixture {
    fn start_row(&mut self) {
        self.0.push_str("<R>");
    }

    fn end_row(&mut self) {
        self.0.push_str("</R>");
    }
}

fn render(symbology: Symbology, msg: &str) -> String {
    let mut fixture = Fixture::default();
    Generator::from_symbology(symbology).unwrap().generate_barcode(&mut fixture, msg).unwrap();
    fixture.0
}

#[test]
fn code128_digits_in_code_set_b() {
    let expected = concat!(
        "<BC>",
        "<SBG:start-char:StartB>B2W1B1W2B1W4</SBG>",
        "<SBG:msg-char:idx17>B1W2B3W2B2W1</SBG>",
        "<SBG:msg-char:idx18>B2W2B3W2B1W1</SBG>",
        "<SBG:msg-char:idx19>B2W2B1W1B3W2</SBG>",
        "<SBG:msg-char:idx8>B1W3B2W2B1W2</SBG>",
        "<SBG:stop-char>B2W3B3W1B1W1B2</SBG>",
        "</BC>",
    );
    assert_eq!(render(Symbology::Code128, "123"), expected);
}

#[test]
fn code39_single_character() {
    let expected = concat!(
        "<BC>",
        "<SBG:start-char:*>B1W2B1W1B2W1B2W1B1</SBG>W3",
        "<SBG:msg-char:A>B2W1B1W1B1W2B1W1B2</SBG>W3",
        "<SBG:stop-char:*>B1W2B1W1B2W1B2W1B1</SBG>",
        "</BC>",
    );
    assert_eq!(render(Symbology::Code39, "A"), expected);
}

#[test]
fn datamatrix_rows() {
    let text = render(Symbology::DataMatrix, "123456");
    assert!(text.starts_with("<BC><R>B1"));
    assert!(text.ends_with("</R></BC>"));
    assert_eq!(text.matches("<R>").count(), 10);
    assert!(!text.contains("<SBG"));
}

#[test]
fn rejected_message_renders_nothing() {
    let mut fixture = Fixture::default();
    let generator = Generator::from_symbology(Symbology::Interleaved2Of5).unwrap();
    assert!(generator.generate_barcode(&mut fixture, "123").is_err());
    assert!(fixture.0.is_empty());
}
