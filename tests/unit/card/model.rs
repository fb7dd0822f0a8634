use super::*;

#[test]
fn position_parses_numbers_and_center() {
    let p: Position = serde_json::from_str("120.5").unwrap();
    assert_eq!(p, Position::Absolute(120.5));
    let p: Position = serde_json::from_str("\"center\"").unwrap();
    assert_eq!(p, Position::Centered);
    let p: Position = serde_json::from_str("\" Center \"").unwrap();
    assert_eq!(p, Position::Centered);
    assert!(serde_json::from_str::<Position>("\"left\"").is_err());
}

#[test]
fn position_serializes_back_to_its_json_shape() {
    assert_eq!(serde_json::to_string(&Position::Centered).unwrap(), "\"center\"");
    assert_eq!(serde_json::to_string(&Position::Absolute(3.0)).unwrap(), "3.0");
}

#[test]
fn position_resolves_against_extent() {
    assert_eq!(Position::Centered.resolve(669.0), 334.5);
    assert_eq!(Position::Absolute(12.0).resolve(669.0), 12.0);
    assert!(Position::Centered.is_centered());
}

#[test]
fn gradient_stop_accepts_stop_and_offset_keys() {
    let a: GradientStop = serde_json::from_str(r##"{"stop":0.5,"color":"#ff0000"}"##).unwrap();
    let b: GradientStop = serde_json::from_str(r##"{"offset":0.5,"color":"red"}"##).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.offset, 0.5);
}

#[test]
fn text_block_defaults() {
    let t: TextBlock = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
    assert_eq!(t.color, Color::BLACK);
    assert_eq!(t.max_width, 700.0);
    assert_eq!(t.line_height, 20.0);
    assert_eq!(t.font, FontSpec::default());
    assert_eq!(t.x, Position::Absolute(0.0));
}

#[test]
fn text_block_reads_camel_case_fields() {
    let t: TextBlock = serde_json::from_str(
        r#"{"text":"hi","font":"26pt \"Roboto\"","x":"center","y":300,"maxWidth":900,"lineHeight":70,"color":"white"}"#,
    )
    .unwrap();
    assert_eq!(t.font.primary_family(), "Roboto");
    assert_eq!(t.x, Position::Centered);
    assert_eq!(t.y, Position::Absolute(300.0));
    assert_eq!(t.max_width, 900.0);
    assert_eq!(t.line_height, 70.0);
    assert_eq!(t.color, Color::from_rgb8(255, 255, 255));
}

#[test]
fn edge_geometry_defaults_to_compat() {
    assert_eq!(EdgeGeometry::default(), EdgeGeometry::Compat);
    let g: EdgeGeometry = serde_json::from_str("\"corrected\"").unwrap();
    assert_eq!(g, EdgeGeometry::Corrected);
}

#[test]
fn validate_rejects_negative_border_width() {
    let mut req = RenderRequest::default();
    req.borders.right = Some(BorderSpec {
        width: -1.0,
        ..BorderSpec::default()
    });
    let err = req.validate().unwrap_err();
    assert!(err.to_string().contains("borderRight"), "{err}");
}

#[test]
fn validate_rejects_bad_rounded_radius() {
    let req = RenderRequest {
        rounded_border: Some(RoundedBorderSpec {
            radius: f64::NAN,
            ..RoundedBorderSpec::default()
        }),
        ..RenderRequest::default()
    };
    assert!(matches!(req.validate(), Err(CardError::Validation(_))));
}

#[test]
fn validate_rejects_bad_text_metrics() {
    let mut t = TextBlock::new("x", FontSpec::new(12.0, "Roboto"));
    t.max_width = f64::INFINITY;
    let req = RenderRequest {
        texts: vec![t],
        ..RenderRequest::default()
    };
    let err = req.validate().unwrap_err();
    assert!(err.to_string().contains("texts[0].maxWidth"), "{err}");
}

#[test]
fn template_debug_is_compact() {
    let t = TemplateImage::Unresolved(PathBuf::from("a/b.png"));
    assert_eq!(format!("{t:?}"), "Unresolved(a/b.png)");
}
