use super::*;

#[test]
fn parses_px_and_pt_sizes_with_quoted_family() {
    let f = FontSpec::parse("64px \"Roboto\"").unwrap();
    assert_eq!(f.size_px, 64.0);
    assert_eq!(f.families, vec!["Roboto".to_owned()]);

    let f = FontSpec::parse("26pt \"Roboto\"").unwrap();
    assert!((f.size_px - 26.0 * 4.0 / 3.0).abs() < 1e-9);
}

#[test]
fn skips_style_and_weight_keywords() {
    let f = FontSpec::parse("italic bold 20px/1.5 'Open Sans', Arial, sans-serif").unwrap();
    assert_eq!(f.size_px, 20.0);
    assert_eq!(f.families, vec!["Open Sans", "Arial", "sans-serif"]);
    assert_eq!(f.primary_family(), "Open Sans");

    let f = FontSpec::parse("700 12px Inconsolata").unwrap();
    assert_eq!(f.size_px, 12.0);
}

#[test]
fn rejects_missing_size_or_family() {
    assert!(FontSpec::parse("Roboto").is_err());
    assert!(FontSpec::parse("bold").is_err());
    assert!(FontSpec::parse("12px").is_err());
    assert!(FontSpec::parse("0px Roboto").is_err());
}

#[test]
fn deserializes_from_json_string() {
    let f: FontSpec = serde_json::from_value(serde_json::json!("84px \"Roboto\"")).unwrap();
    assert_eq!(f, FontSpec::new(84.0, "Roboto"));
    assert_eq!(FontSpec::default().to_string(), "10px \"sans-serif\"");
}

#[test]
fn registry_resolves_case_insensitively_and_falls_back() {
    let mut reg = FontRegistry::new();
    assert!(reg.resolve(&FontSpec::default()).is_none());

    reg.register_bytes("Roboto", vec![1, 2, 3]).unwrap();
    reg.register_bytes("Inconsolata", vec![4, 5]).unwrap();

    let hit = reg.resolve(&FontSpec::new(12.0, "inconsolata")).unwrap();
    assert_eq!(hit.index, 1);
    assert!(!hit.fell_back);

    let miss = reg.resolve(&FontSpec::new(12.0, "Comic Sans")).unwrap();
    assert_eq!(miss.index, 0);
    assert_eq!(miss.font.family, "Roboto");
    assert!(miss.fell_back);
}

#[test]
fn registry_replaces_existing_family_and_rejects_empty() {
    let mut reg = FontRegistry::new();
    reg.register_bytes("Roboto", vec![1]).unwrap();
    reg.register_bytes("ROBOTO", vec![9, 9]).unwrap();
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.fonts()[0].data.as_slice(), &[9, 9]);

    assert!(reg.register_bytes("Empty", Vec::new()).is_err());
    assert!(reg.register_bytes("  ", vec![1]).is_err());
    assert!(reg.register_file("does/not/exist.ttf", "Nope").is_err());
}

#[test]
fn default_font_fills_only_an_empty_registry() {
    let mut reg = FontRegistry::new();
    reg.ensure_default_font().unwrap();
    assert_eq!(reg.len(), 1);
    let hit = reg.resolve(&FontSpec::default()).unwrap();
    assert_eq!(hit.font.family, DEFAULT_FONT_FAMILY);
    assert!(!hit.fell_back);
    assert_eq!(&hit.font.data[..4], &[0, 1, 0, 0]);

    let mut reg = FontRegistry::new();
    reg.register_bytes("Roboto", vec![1, 2, 3]).unwrap();
    reg.ensure_default_font().unwrap();
    assert_eq!(reg.len(), 1);
}
