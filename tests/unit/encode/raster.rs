use super::*;

fn frame(w: u32, h: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied: true,
    }
}

#[test]
fn format_follows_the_extension() {
    assert_eq!(OutputFormat::from_path(Path::new("a/card.png")), OutputFormat::Png);
    assert_eq!(OutputFormat::from_path(Path::new("card.PNG")), OutputFormat::Png);
    assert_eq!(OutputFormat::from_path(Path::new("card.jpeg")), OutputFormat::Jpeg);
    assert_eq!(OutputFormat::from_path(Path::new("card.webp")), OutputFormat::Jpeg);
    assert_eq!(OutputFormat::from_path(Path::new("card")), OutputFormat::Jpeg);
    assert_eq!(OutputFormat::from_path(Path::new("png")), OutputFormat::Jpeg);
}

#[test]
fn png_round_trips_through_the_decoder() {
    let f = frame(3, 2, [128, 0, 0, 128]);
    let bytes = encode_frame(&f, OutputFormat::Png).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

    let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (3, 2));
    // unpremultiplied on the way out
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 128]);
}

#[test]
fn jpeg_is_opaque_and_close_to_the_source() {
    let f = frame(16, 16, [200, 100, 50, 255]);
    let bytes = encode_frame(&f, OutputFormat::Jpeg).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

    let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
    let [r, g, b] = decoded.get_pixel(8, 8).0;
    assert!(r.abs_diff(200) <= 3 && g.abs_diff(100) <= 3 && b.abs_diff(50) <= 3);
}

#[test]
fn jpeg_flattens_transparency_over_black() {
    let f = frame(8, 8, [0, 0, 0, 0]);
    let bytes = encode_frame(&f, OutputFormat::Jpeg).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert!(decoded.get_pixel(4, 4).0.iter().all(|&c| c <= 2));
}

#[test]
fn straight_alpha_frames_are_premultiplied_for_jpeg() {
    assert_eq!(flatten_to_rgb8(&[255, 128, 0, 128], false), vec![128, 64, 0]);
    assert_eq!(flatten_to_rgb8(&[128, 64, 0, 128], true), vec![128, 64, 0]);
}

#[test]
fn short_frames_are_rejected() {
    let mut f = frame(2, 2, [0, 0, 0, 255]);
    f.data.pop();
    assert!(matches!(
        encode_frame(&f, OutputFormat::Png),
        Err(CardError::EncodingOrIo(_))
    ));
}

#[test]
fn encoded_card_records_path_and_format() {
    let card = EncodedCard::encode(&frame(2, 2, [0, 0, 0, 255]), "out/x.png").unwrap();
    assert_eq!(card.format, OutputFormat::Png);
    assert_eq!(card.path, PathBuf::from("out/x.png"));
    assert_eq!((card.width, card.height), (2, 2));
    assert_eq!(OutputFormat::Jpeg.mime(), "image/jpeg");
}
