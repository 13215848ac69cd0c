use proptest::prelude::*;
use symbology::{
    checksum,
    datamatrix::{SizeConstraints, SymbolTable},
    linear::{
        code39,
        upcean::{compact_to_upce, expand_upce},
    },
    logic::is_well_nested,
    pdf417::generate_error_correction,
    Generator, Symbology,
};

proptest! {
    #[test]
    fn upce_compaction_round_trip(ns in 0u8..2, digits in "[0-9]{6}") {
        let upca = expand_upce(&format!("{ns}{digits}")).unwrap();
        let compact = compact_to_upce(&upca).unwrap();
        prop_assert_eq!(expand_upce(&compact).unwrap(), upca.clone());

        let with_check = format!("{upca}{}", checksum::mod10_char(&upca));
        let compact = compact_to_upce(&with_check).unwrap();
        prop_assert_eq!(compact.len(), 8);
        prop_assert_eq!(expand_upce(&compact).unwrap(), with_check);
    }

    #[test]
    fn mod10_check_digit_validates(digits in "[0-9]{1,17}") {
        let full = format!("{digits}{}", checksum::mod10_char(&digits));
        prop_assert!(checksum::validate_mod10(&full));
    }

    #[test]
    fn code39_check_character_validates(msg in "[0-9A-Z. $/+%-]{1,20}") {
        let full = format!("{msg}{}", code39::checksum_char(&msg).unwrap());
        prop_assert!(code39::validate_checksum(&full));
    }

    #[test]
    fn quiet_zone_never_shrinks(msg in "[ -~]{1,30}") {
        for sym in [Symbology::Code128, Symbology::Pdf417, Symbology::DataMatrix] {
            let dim = Generator::from_symbology(sym).unwrap().calc_dimensions(&msg).unwrap();
            prop_assert!(dim.width_plus_quiet() >= dim.width());
            prop_assert!(dim.height_plus_quiet() >= dim.height());
        }
    }

    #[test]
    fn events_are_well_nested(msg in "[ -~]{1,30}", digits in "[0-9]{2,20}") {
        for sym in [Symbology::Code128, Symbology::Pdf417, Symbology::DataMatrix] {
            let events = Generator::from_symbology(sym).unwrap().events(&msg).unwrap();
            prop_assert!(is_well_nested(&events));
        }
        let even = &digits[..digits.len() / 2 * 2];
        let events = Generator::from_symbology(Symbology::Interleaved2Of5).unwrap().events(even).unwrap();
        prop_assert!(is_well_nested(&events));
    }

    #[test]
    fn pdf417_ecc_count(data in prop::collection::vec(0u16..929, 1..100), level in 0u8..=8) {
        let ecc = generate_error_correction(&data, level).unwrap();
        prop_assert_eq!(ecc.len(), 1 << (level + 1));
        prop_assert!(ecc.iter().all(|&cw| cw <= 928));
    }
}

#[test]
fn datamatrix_lookup_is_monotonic() {
    let table = SymbolTable::standard();
    let any = SizeConstraints::default();
    let mut previous = 0;
    for n in 1..=1558 {
        let capacity = table.lookup(n, &any).unwrap().data_capacity;
        assert!(capacity >= n && capacity >= previous, "{n} codewords");
        previous = capacity;
    }
}
