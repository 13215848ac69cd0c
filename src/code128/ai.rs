//! GS1 Application Identifiers.
//!
//! Known AIs live in a digit trie so that the raw form of a message
//! (`0109501101530003` + `10ABC`) can be split by longest match.

use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Numeric,
    /// GS1 AI encodable character set 82.
    Alphanumeric,
}

const CSET_82: &[u8] = b"!\"%&'()*+,-./0123456789:;<=>?ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

impl Charset {
    pub fn accepts(&self, c: char) -> bool {
        match self {
            Self::Numeric => c.is_ascii_digit(),
            Self::Alphanumeric => c.is_ascii() && CSET_82.contains(&(c as u8)),
        }
    }
}

/// Format of the data following an AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiSpec {
    /// AI digits, without the decimal point digit of the `310n` families.
    pub ai: &'static str,
    pub min: u8,
    pub max: u8,
    pub charset: Charset,
    /// The last data digit is a mod-10 check digit.
    pub check_digit: bool,
    /// The data is a YYMMDD date.
    pub date: bool,
    /// One more digit, the decimal point position, completes the AI.
    pub decimal: bool,
}

impl AiSpec {
    const fn numeric(ai: &'static str, min: u8, max: u8) -> Self {
        Self { ai, min, max, charset: Charset::Numeric, check_digit: false, date: false, decimal: false }
    }

    const fn alpha(ai: &'static str, max: u8) -> Self {
        Self { ai, min: 1, max, charset: Charset::Alphanumeric, check_digit: false, date: false, decimal: false }
    }

    const fn cd(mut self) -> Self {
        self.check_digit = true;
        self
    }

    const fn date(mut self) -> Self {
        self.date = true;
        self
    }

    const fn dec(mut self) -> Self {
        self.decimal = true;
        self
    }

    pub const fn is_fixed(&self) -> bool {
        self.min == self.max
    }
}

const fn n(ai: &'static str, len: u8) -> AiSpec {
    AiSpec::numeric(ai, len, len)
}

const fn nv(ai: &'static str, max: u8) -> AiSpec {
    AiSpec::numeric(ai, 1, max)
}

const fn x(ai: &'static str, max: u8) -> AiSpec {
    AiSpec::alpha(ai, max)
}

#[rustfmt::skip]
static TABLE: &[AiSpec] = &[
    n("00", 18).cd(), n("01", 14).cd(), n("02", 14).cd(),
    x("10", 20), n("11", 6).date(), n("12", 6).date(), n("13", 6).date(),
    n("15", 6).date(), n("16", 6).date(), n("17", 6).date(),
    n("20", 2), x("21", 20), x("22", 20),
    x("240", 30), x("241", 30), nv("242", 6), x("243", 20),
    x("250", 30), x("251", 30), AiSpec::alpha("253", 30), x("254", 20),
    nv("30", 8),
    n("310", 6).dec(), n("311", 6).dec(), n("312", 6).dec(), n("313", 6).dec(), n("314", 6).dec(),
    n("315", 6).dec(), n("316", 6).dec(),
    n("320", 6).dec(), n("321", 6).dec(), n("322", 6).dec(), n("323", 6).dec(), n("324", 6).dec(),
    n("325", 6).dec(), n("326", 6).dec(), n("327", 6).dec(), n("328", 6).dec(), n("329", 6).dec(),
    n("330", 6).dec(), n("331", 6).dec(), n("332", 6).dec(), n("333", 6).dec(), n("334", 6).dec(),
    n("335", 6).dec(), n("336", 6).dec(), n("337", 6).dec(),
    n("340", 6).dec(), n("341", 6).dec(), n("342", 6).dec(), n("343", 6).dec(), n("344", 6).dec(),
    n("345", 6).dec(), n("346", 6).dec(), n("347", 6).dec(), n("348", 6).dec(), n("349", 6).dec(),
    n("350", 6).dec(), n("351", 6).dec(), n("352", 6).dec(), n("353", 6).dec(), n("354", 6).dec(),
    n("355", 6).dec(), n("356", 6).dec(), n("357", 6).dec(),
    n("360", 6).dec(), n("361", 6).dec(), n("362", 6).dec(), n("363", 6).dec(), n("364", 6).dec(),
    n("365", 6).dec(), n("366", 6).dec(), n("367", 6).dec(), n("368", 6).dec(), n("369", 6).dec(),
    nv("37", 8),
    nv("390", 15).dec(), nv("391", 18).dec(), nv("392", 15).dec(), nv("393", 18).dec(),
    n("394", 4).dec(), n("395", 6).dec(),
    x("400", 30), x("401", 30), n("402", 17).cd(), x("403", 30),
    n("410", 13).cd(), n("411", 13).cd(), n("412", 13).cd(), n("413", 13).cd(),
    n("414", 13).cd(), n("415", 13).cd(), n("416", 13).cd(), n("417", 13).cd(),
    x("420", 20), x("421", 12), n("422", 3), nv("423", 15), n("424", 3), nv("425", 15), n("426", 3),
    n("7001", 13), x("7002", 30), n("7003", 10), nv("7004", 4), x("7005", 12), n("7006", 6).date(),
    AiSpec::numeric("7007", 6, 12), x("7008", 3), x("7009", 10), x("7010", 2),
    n("8001", 14), x("8002", 20), x("8003", 30), x("8004", 30), n("8005", 6), n("8006", 18),
    x("8007", 34), AiSpec::numeric("8008", 8, 12), x("8010", 30), nv("8011", 12), x("8012", 20),
    x("8013", 25), n("8017", 18).cd(), n("8018", 18).cd(), nv("8019", 10), x("8020", 25),
    x("8200", 70),
    x("90", 30), x("91", 90), x("92", 90), x("93", 90), x("94", 90), x("95", 90), x("96", 90),
    x("97", 90), x("98", 90), x("99", 90),
];

/// AI prefixes whose data length is fixed by the standard: no FNC1 needs to
/// follow their data.
const PREDEFINED_LENGTH: [&str; 22] = [
    "00", "01", "02", "03", "04", "11", "12", "13", "14", "15", "16", "17", "18", "19", "20",
    "31", "32", "33", "34", "35", "36", "41",
];

pub fn is_predefined_length(ai: &str) -> bool {
    PREDEFINED_LENGTH.iter().any(|prefix| ai.starts_with(prefix))
}

#[derive(Debug, Default)]
struct Node {
    spec: Option<AiSpec>,
    children: [Option<Box<Node>>; 10],
}

/// Digit trie over the known AIs.
#[derive(Debug, Default)]
pub struct AiTrie {
    root: Node,
}

impl AiTrie {
    pub fn new(specs: &[AiSpec]) -> Self {
        let mut trie = Self::default();
        for spec in specs {
            let mut node = &mut trie.root;
            for digit in spec.ai.bytes().map(|b| (b - b'0') as usize) {
                node = &mut **node.children[digit].get_or_insert_with(Default::default);
            }
            node.spec = Some(*spec);
        }
        trie
    }

    /// Longest AI at the start of `s`: the full AI (decimal digit included)
    /// and its format.
    pub fn longest_match<'s>(&self, s: &'s str) -> Option<(&'s str, AiSpec)> {
        let mut node = &self.root;
        let mut found = None;
        for (i, b) in s.bytes().enumerate() {
            if !b.is_ascii_digit() {
                break;
            }
            match node.children[(b - b'0') as usize].as_deref() {
                Some(child) => node = child,
                None => break,
            }
            if let Some(spec) = node.spec {
                let len = i + 1 + usize::from(spec.decimal);
                if s.as_bytes().get(len - 1).is_some_and(u8::is_ascii_digit) {
                    found = Some((&s[..len], spec));
                }
            }
        }
        found
    }

    /// Format of exactly `ai`.
    pub fn get(&self, ai: &str) -> Option<AiSpec> {
        self.longest_match(ai).filter(|(matched, _)| matched.len() == ai.len()).map(|(_, spec)| spec)
    }
}

/// Trie of the standard AIs.
pub fn standard() -> &'static AiTrie {
    static TRIE: OnceLock<AiTrie> = OnceLock::new();
    TRIE.get_or_init(|| AiTrie::new(TABLE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ais_are_digits() {
        assert!(TABLE.iter().all(|s| s.ai.bytes().all(|b| b.is_ascii_digit()) && s.min <= s.max));
    }

    #[test]
    fn test_longest_match() {
        let trie = standard();
        let (ai, spec) = trie.longest_match("0109501101530003").unwrap();
        assert_eq!((ai, spec.max, spec.check_digit), ("01", 14, true));
        let (ai, spec) = trie.longest_match("3103000123").unwrap();
        assert_eq!((ai, spec.ai, spec.max), ("3103", "310", 6));
        assert_eq!(trie.longest_match("7003123").unwrap().0, "7003");
        assert_eq!(trie.longest_match("240ABC").unwrap().0, "240");
        assert!(trie.longest_match("05").is_none());
        assert!(trie.longest_match("310").is_none());
    }

    #[test]
    fn test_get() {
        let trie = standard();
        assert!(trie.get("10").is_some());
        assert!(trie.get("3102").is_some());
        assert!(trie.get("310").is_none());
        assert!(trie.get("101").is_none());
    }

    #[test]
    fn test_predefined_length() {
        assert!(is_predefined_length("01"));
        assert!(is_predefined_length("3103"));
        assert!(!is_predefined_length("10"));
        assert!(!is_predefined_length("7003"));
    }

    #[test]
    fn test_charset() {
        assert!(Charset::Alphanumeric.accepts('a'));
        assert!(!Charset::Alphanumeric.accepts('#'));
        assert!(!Charset::Numeric.accepts('a'));
    }
}
