use symbology::{
    code128::Gs1Config,
    datamatrix::{DataMatrixConfig, SymbolShapeHint},
    linear::{code39::Code39Config, postal::PostalConfig},
    pdf417::Pdf417Config,
    ChecksumMode, HumanReadablePlacement,
};

#[test]
fn round_trip() {
    let code39 = Code39Config::default().with_checksum(ChecksumMode::Add).with_extended_charset(true);
    let text = toml::to_string(&code39).unwrap();
    assert!(text.contains("checksum = \"add\""));
    assert_eq!(toml::from_str::<Code39Config>(&text).unwrap(), code39);

    let pdf417 = Pdf417Config::default().with_columns(2, 6).unwrap().with_error_correction(4).unwrap();
    let text = toml::to_string(&pdf417).unwrap();
    assert_eq!(toml::from_str::<Pdf417Config>(&text).unwrap(), pdf417);

    let gs1 = Gs1Config::default().with_group_separator('|').unwrap();
    assert_eq!(toml::from_str::<Gs1Config>(&toml::to_string(&gs1).unwrap()).unwrap(), gs1);

    let postal = PostalConfig::royal_mail();
    assert_eq!(toml::from_str::<PostalConfig>(&toml::to_string(&postal).unwrap()).unwrap(), postal);
}

#[test]
fn partial_documents_use_defaults() {
    let config: DataMatrixConfig = toml::from_str(
        r#"
        min_size = [16, 16]

        [common]
        module_width = 0.5
        human_readable = "top"
        "#,
    )
    .unwrap();
    assert_eq!(config.min_size, Some((16, 16)));
    assert_eq!(config.shape, SymbolShapeHint::ForceNone);
    assert_eq!(config.common.module_width, 0.5);
    assert_eq!(config.common.human_readable, HumanReadablePlacement::Top);
    // fields missing from the table come from CommonParams::default
    assert_eq!(config.common.bar_height, 15.0);
}
