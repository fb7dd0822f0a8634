use super::*;

#[test]
fn canvas_defaults_to_card_size() {
    let c = Canvas::default();
    assert_eq!((c.width, c.height), (1280, 669));

    let c = Canvas::from_options(None, Some(400)).unwrap();
    assert_eq!((c.width, c.height), (1280, 400));
}

#[test]
fn canvas_rejects_zero_and_oversized() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert!(Canvas::new(70_000, 10).is_err());
}

#[test]
fn canvas_center_is_half_extent() {
    let c = Canvas::default();
    assert_eq!(c.center(), Point::new(640.0, 334.5));
    assert_eq!(c.rect(), Rect::new(0.0, 0.0, 1280.0, 669.0));
}

#[test]
fn premultiply_rounds_to_nearest() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
    assert_eq!(Rgba8Premul::transparent().to_array(), [0, 0, 0, 0]);
}
