use std::io::Cursor;

use super::*;

fn encode_png(w: u32, h: u32, rgba: Vec<u8>) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = encode_png(1, 1, vec![100u8, 50u8, 200u8, 128u8]);

    let prepared = decode_image(&buf).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"definitely not an image").is_err());
}

#[test]
fn load_image_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("template.png");
    std::fs::write(&path, encode_png(2, 3, vec![255u8; 2 * 3 * 4])).unwrap();

    let img = load_image(&path).unwrap();
    assert_eq!((img.width, img.height), (2, 3));
    assert!(load_image(dir.path().join("missing.png")).is_err());
}

#[test]
fn unpremultiply_inverts_premultiply_for_opaque_and_clear() {
    let mut px = vec![10u8, 20, 30, 255, 0, 0, 0, 0];
    let orig = px.clone();
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, orig);

    let mut half = vec![200u8, 100, 0, 128];
    premultiply_rgba8_in_place(&mut half);
    unpremultiply_rgba8_in_place(&mut half);
    assert!((half[0] as i16 - 200).abs() <= 1);
    assert!((half[1] as i16 - 100).abs() <= 1);
    assert_eq!(half[3], 128);
}
