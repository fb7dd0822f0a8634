use super::*;
use crate::encode::sink::InMemorySink;
use crate::render::recording::RecordingSurface;

fn options(json: &str) -> CardOptions {
    CardOptions::from_json_str(json).unwrap()
}

fn write_png(path: &Path, w: u32, h: u32, rgba: [u8; 4]) {
    image::RgbaImage::from_pixel(w, h, image::Rgba(rgba))
        .save(path)
        .unwrap();
}

#[test]
fn asset_paths_resolve_against_the_root() {
    let root = Path::new("/cards");
    assert_eq!(
        resolve_asset_path(root, Path::new("fonts/a.ttf")),
        PathBuf::from("/cards/fonts/a.ttf")
    );
    assert_eq!(
        resolve_asset_path(root, Path::new("/abs/a.ttf")),
        PathBuf::from("/abs/a.ttf")
    );
}

#[test]
fn renders_background_and_template() {
    let dir = tempfile::tempdir().unwrap();
    write_png(&dir.path().join("tpl.png"), 4, 4, [0, 0, 255, 255]);
    let opts = options(
        r#"{"width":16,"height":8,"backgroundColor":"red","templateImage":"tpl.png"}"#,
    );

    let frame = render_card(&opts, dir.path()).unwrap();
    assert_eq!((frame.width, frame.height), (16, 8));
    assert_eq!(frame.pixel(10, 6), Some([255, 0, 0, 255]));
    let tpl = frame.pixel(1, 1).unwrap();
    assert!(tpl[2] > 240 && tpl[0] < 15, "{tpl:?}");
}

#[test]
fn missing_template_file_fails_before_drawing() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(r#"{"templateImage":"nope.png"}"#);
    let err = render_card(&opts, dir.path()).unwrap_err();
    assert!(err.to_string().contains("nope.png"), "{err}");
}

#[test]
fn missing_font_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(r#"{"fonts":[{"file":"fonts/missing.ttf","family":"Roboto"}]}"#);
    let err = render_card(&opts, dir.path()).unwrap_err();
    assert!(err.to_string().contains("missing.ttf"), "{err}");
}

#[test]
fn make_card_with_sink_encodes_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(r##"{"width":8,"height":8,"backgroundColor":"#00ff00","output":"out/card.PNG"}"##);
    let mut sink = InMemorySink::new();

    let outcome = make_card_with_sink(&opts, dir.path(), &mut sink).unwrap();
    assert_eq!(outcome.format, OutputFormat::Png);
    assert_eq!(outcome.path, PathBuf::from("out/card.PNG"));
    assert!(!outcome.compressed);

    let cards = sink.cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].bytes.len(), outcome.bytes);
    assert_eq!(&cards[0].bytes[..4], b"\x89PNG");
}

#[test]
fn make_card_writes_a_jpeg_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("cards/card.jpeg");
    let opts = CardOptions {
        width: Some(32),
        height: Some(16),
        output: Some(out.clone()),
        ..CardOptions::default()
    };

    let outcome = make_card(&opts, dir.path()).unwrap();
    assert_eq!(outcome.format, OutputFormat::Jpeg);
    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(bytes.len(), outcome.bytes);
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[test]
fn rendering_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(
        r##"{"width":64,"height":32,"backgroundColor":"white",
            "borderTop":{"width":6,"gradient":[{"stop":0,"color":"red"},{"stop":50,"color":"orange"}]},
            "roundedBorder":{"width":2,"radius":8,"color":"black"}}"##,
    );
    let a = render_card(&opts, dir.path()).unwrap();
    let b = render_card(&opts, dir.path()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn layout_card_matches_draw_placement() {
    let opts = options(
        r#"{"texts":[
            {"text":"aaaa bbbb","font":"10px Roboto","x":"center","y":"center","maxWidth":25},
            {"text":"   "},
            {"text":"left","font":"10px Roboto","x":12,"y":40}
        ]}"#,
    );
    let req = opts.to_request(None).unwrap();

    let mut s = RecordingSurface::new();
    let blocks = layout_card(&mut s, &req).unwrap();
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0].layout.lines.len(), 2);
    assert_eq!(blocks[0].layout.lines[0].x, 640.0);
    assert!(blocks[1].layout.lines.is_empty());
    assert_eq!(blocks[2].index, 2);
    assert_eq!(blocks[2].layout.lines[0].x, 12.0);

    let mut drawn = RecordingSurface::new();
    draw(&mut drawn, &req).unwrap();
    let drawn_ys: Vec<f64> = drawn.texts().iter().map(|t| t.y).collect();
    let laid_ys: Vec<f64> = blocks
        .iter()
        .flat_map(|b| b.layout.lines.iter().map(|l| l.y))
        .collect();
    assert_eq!(drawn_ys, laid_ys);
}

#[test]
fn block_layout_serializes_flat() {
    let opts = options(r#"{"texts":[{"text":"hi","font":"10px Roboto","x":1,"y":2}]}"#);
    let req = opts.to_request(None).unwrap();
    let blocks = layout_card(&mut RecordingSurface::new(), &req).unwrap();
    let json = serde_json::to_value(&blocks).unwrap();
    assert_eq!(json[0]["index"], 0);
    assert_eq!(json[0]["lines"][0]["text"], "hi");
    assert!(json[0]["pitch"].is_number());
}
