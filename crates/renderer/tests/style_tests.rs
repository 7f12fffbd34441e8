//! Tests for JSON style documents.

use overlay_common::{Rgba, TileError};
use renderer::classify::LowerBound;
use renderer::style::{AlphaPolicy, StyleConfig};
use std::io::Write;

const TOKYO_STYLE: &str = r##"{
    "version": "1.0",
    "tables": {
        "tokyo": {
            "name": "Tokyo",
            "description": "detailed",
            "alpha": { "configurable": { "default": 180 } },
            "bands": [
                { "min": 5.0, "color": "#DF73FF", "label": "5m-" },
                { "min": 3.0, "color": "#0070FF" },
                { "min": 0.0, "exclusive": true, "color": "#FFFFCC" }
            ]
        },
        "opaque": {
            "alpha": { "fixed": 255 },
            "bands": [
                { "min": 1.0, "color": "FF0000" }
            ]
        }
    }
}"##;

#[test]
fn test_parse_style_document() {
    let config = StyleConfig::from_json(TOKYO_STYLE).unwrap();
    assert_eq!(config.version, "1.0");

    let profile = config.profile("tokyo").unwrap();
    assert_eq!(profile.name, "Tokyo");
    assert_eq!(profile.description.as_deref(), Some("detailed"));
    assert_eq!(profile.alpha, AlphaPolicy::Configurable { default: 180 });

    let bands = profile.table.bands();
    assert_eq!(bands.len(), 3);
    assert_eq!(bands[0].lower, LowerBound::AtLeast(5.0));
    assert_eq!(bands[0].label.as_deref(), Some("5m-"));
    assert_eq!(bands[2].lower, LowerBound::Above(0.0));
}

#[test]
fn test_style_profiles_classify() {
    let config = StyleConfig::from_json(TOKYO_STYLE).unwrap();
    let profiles = config.profiles().unwrap();

    let tokyo = &profiles["tokyo"];
    assert_eq!(tokyo.classify(4.0, None), Rgba::new(0, 112, 255, 180));
    assert_eq!(tokyo.classify(1.0, None), Rgba::new(255, 255, 204, 180));
    assert_eq!(tokyo.classify(0.0, None), Rgba::TRANSPARENT);

    let opaque = &profiles["opaque"];
    assert_eq!(opaque.name, "opaque");
    assert_eq!(opaque.classify(2.0, Some(1)), Rgba::new(255, 0, 0, 255));
    // No band below 1.0
    assert_eq!(opaque.classify(0.5, None), Rgba::TRANSPARENT);
}

#[test]
fn test_alpha_defaults_to_configurable() {
    let json = r##"{ "tables": { "t": { "bands": [ { "min": 0.0, "exclusive": true, "color": "#000000" } ] } } }"##;
    let config = StyleConfig::from_json(json).unwrap();
    assert_eq!(config.version, "1.0");
    let profile = config.profile("t").unwrap();
    assert_eq!(profile.alpha, AlphaPolicy::Configurable { default: 204 });
}

#[test]
fn test_invalid_color_is_config_error() {
    let json = r##"{ "tables": { "t": { "bands": [ { "min": 1.0, "color": "#XYZXYZ" } ] } } }"##;
    let config = StyleConfig::from_json(json).unwrap();
    let err = config.profile("t").unwrap_err();
    assert!(matches!(err, TileError::Config(ref msg) if msg.contains("#XYZXYZ")), "{:?}", err);
}

#[test]
fn test_ascending_bands_rejected() {
    let json = r##"{ "tables": { "t": { "bands": [
        { "min": 0.5, "color": "#000000" },
        { "min": 1.0, "color": "#FFFFFF" }
    ] } } }"##;
    let config = StyleConfig::from_json(json).unwrap();
    assert!(matches!(config.profile("t"), Err(TileError::Config(_))));
    assert!(config.profiles().is_err());
}

#[test]
fn test_missing_table() {
    let config = StyleConfig::from_json(TOKYO_STYLE).unwrap();
    assert!(matches!(config.profile("nope"), Err(TileError::Config(_))));
}

#[test]
fn test_malformed_json() {
    assert!(matches!(StyleConfig::from_json("{ not json"), Err(TileError::Config(_))));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(TOKYO_STYLE.as_bytes()).unwrap();

    let config = StyleConfig::from_file(file.path()).unwrap();
    assert_eq!(config.tables.len(), 2);

    let missing = StyleConfig::from_file(file.path().with_extension("missing"));
    assert!(matches!(missing, Err(TileError::Config(_))));
}
